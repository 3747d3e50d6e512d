//! File-backed backend.

use std::path::Path;

use tracing::debug;

use oai_core::config::BackendConfig;
use oai_core::{Result, StoreBackend};

use crate::store::FileStore;

/// A [`Backend`](oai_core::Backend) serving records from a [`FileStore`].
pub type FileBackend = StoreBackend<FileStore>;

/// Open a backend over the store at `root`.
///
/// When the configuration carries no token secret, the secret persisted in
/// the store is used, so resumption tokens survive process restarts.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the secret cannot be
/// read or created.
pub async fn open(root: impl AsRef<Path>, mut config: BackendConfig) -> Result<FileBackend> {
    let store = FileStore::new(root);

    if config.token_secret.is_none() {
        config.token_secret = Some(store.load_or_create_secret()?);
        debug!(root = %store.root().display(), "Using persisted token secret");
    }

    StoreBackend::open(store, config).await
}
