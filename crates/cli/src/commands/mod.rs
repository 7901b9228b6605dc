//! CLI subcommands.

pub mod check;
pub mod seed;

use std::path::PathBuf;

use sneako_mockserver::store::StoreError;
use thiserror::Error;

/// Errors raised by the data directory commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The data directory does not exist.
    #[error("data directory {} does not exist", .0.display())]
    MissingDataDir(PathBuf),

    /// A fixtures file could not be read.
    #[error("failed to read fixtures {}: {source}", path.display())]
    ReadFixtures {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A fixtures file is not a map of resource names to record lists.
    #[error("invalid fixtures {}: {reason}", path.display())]
    InvalidFixtures { path: PathBuf, reason: String },

    /// Opening or writing a collection failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
