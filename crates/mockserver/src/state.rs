//! Application state shared across handlers.

use std::sync::Arc;

use sneako_core::DOMAIN_RESOURCES;

use crate::config::MockServerConfig;
use crate::routes::listing::{DefaultRouter, ListingRouter};
use crate::store::{ResourceStore, StoreError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. It owns the resource store for
/// the lifetime of the process; there is no other copy of the data.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: MockServerConfig,
    store: ResourceStore,
    fallback: Box<dyn DefaultRouter>,
}

impl AppState {
    /// Open the configured data directory and build the application state.
    ///
    /// The four domain collections are created if their files are missing.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the data directory cannot be read or created,
    /// or holds a file that is not a valid collection.
    pub fn new(config: MockServerConfig) -> Result<Self, StoreError> {
        let store = ResourceStore::open(
            &config.data_dir,
            config.id_strategy.allocator(),
            &DOMAIN_RESOURCES,
        )?;
        Ok(Self::with_store(config, store, Box::new(ListingRouter)))
    }

    /// Build the application state around an already opened store.
    #[must_use]
    pub fn with_store(
        config: MockServerConfig,
        store: ResourceStore,
        fallback: Box<dyn DefaultRouter>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                fallback,
            }),
        }
    }

    /// Get a reference to the mock server configuration.
    #[must_use]
    pub fn config(&self) -> &MockServerConfig {
        &self.inner.config
    }

    /// Get a reference to the resource store.
    #[must_use]
    pub fn store(&self) -> &ResourceStore {
        &self.inner.store
    }

    /// Get the router that answers requests no other stage claims.
    #[must_use]
    pub fn fallback(&self) -> &dyn DefaultRouter {
        self.inner.fallback.as_ref()
    }
}
