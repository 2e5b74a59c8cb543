//! Storage setup and initialization

use anyhow::Result;
use std::sync::Arc;
use tubely_core::{Config, StorageBackend};
use tubely_storage::{create_local_storage, create_storage, LocalStorage, Storage};

/// The configured backend, plus the concrete local backend when the API must
/// serve objects itself.
pub struct StorageSetup {
    pub storage: Arc<dyn Storage>,
    pub local: Option<Arc<LocalStorage>>,
}

impl StorageSetup {
    pub fn local(local: LocalStorage) -> Self {
        let local = Arc::new(local);
        Self {
            storage: local.clone(),
            local: Some(local),
        }
    }

    pub fn remote(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            local: None,
        }
    }
}

pub async fn setup_storage(config: &Config) -> Result<StorageSetup> {
    tracing::info!("Initializing storage...");

    let setup = match config.storage_backend() {
        Some(StorageBackend::Local) => StorageSetup::local(create_local_storage(config).await?),
        _ => StorageSetup::remote(create_storage(config).await?),
    };

    tracing::info!(
        backend = %setup.storage.backend_type(),
        bucket = %setup.storage.bucket(),
        "Storage initialized"
    );
    Ok(setup)
}
