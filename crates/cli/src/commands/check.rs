//! Check a data directory.

use std::path::{Path, PathBuf};

use sneako_core::DOMAIN_RESOURCES;
use sneako_mockserver::store::{IdStrategy, ResourceStore};
use tracing::{info, warn};

use super::CommandError;

/// What a check found.
#[derive(Debug)]
pub struct CheckReport {
    /// The directory checked.
    pub dir: PathBuf,
    /// Record count of every collection, sorted by name.
    pub counts: Vec<(String, usize)>,
    /// Domain collections with no file.
    pub missing: Vec<&'static str>,
}

impl CheckReport {
    /// Log the report.
    pub fn log(&self) {
        info!("Data directory: {}", self.dir.display());
        for (resource, count) in &self.counts {
            info!("  {resource}: {count} records");
        }
        for resource in &self.missing {
            warn!("  {resource}: missing");
        }
    }
}

/// Load every collection in `data_dir` without modifying anything.
///
/// # Errors
///
/// Returns `CommandError::MissingDataDir` if the directory does not exist,
/// and `CommandError::Store` if any file is unreadable or not a valid
/// collection (corrupt JSON, records without ids, duplicate ids).
pub fn run(data_dir: &Path) -> Result<CheckReport, CommandError> {
    if !data_dir.is_dir() {
        return Err(CommandError::MissingDataDir(data_dir.to_path_buf()));
    }

    let store = ResourceStore::open(data_dir, IdStrategy::default().allocator(), &[])?;
    let counts = store
        .resources()
        .map(|name| (name.to_string(), store.load(name.as_str()).len()))
        .collect();
    let missing = DOMAIN_RESOURCES
        .into_iter()
        .filter(|name| !store.contains(name))
        .collect();

    Ok(CheckReport {
        dir: data_dir.to_path_buf(),
        counts,
        missing,
    })
}
