use std::{fmt::Debug, sync::Arc};

use anyhow::{Context, Ok, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{cache::UserInfoCache, credentials::StoredCredentials};

/// Durable storage for exported credentials, provided by the host.
#[async_trait]
pub trait CredentialStore: Debug + Send + Sync {
    /// Load previously saved credentials, if any.
    async fn load(&self) -> Result<Option<StoredCredentials>>;

    /// Replace the saved credentials.
    async fn save(&self, credentials: StoredCredentials) -> Result<()>;

    /// Forget the saved credentials.
    async fn clear(&self) -> Result<()>;
}

/// A local in-memory store. Not for production use!
///
/// # Warning
/// Nothing survives the process, this store should only be used for test
/// purposes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    store: Arc<Mutex<Option<StoredCredentials>>>,
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn load(&self) -> Result<Option<StoredCredentials>> {
        Ok(self.store.try_lock()?.clone())
    }

    async fn save(&self, credentials: StoredCredentials) -> Result<()> {
        *self.store.try_lock()? = Some(credentials);

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.store.try_lock()?.take();

        Ok(())
    }
}

impl UserInfoCache {
    /// Import whatever `store` holds.
    ///
    /// Returns `false` if the store had nothing saved.
    pub async fn restore_from(&self, store: &dyn CredentialStore) -> Result<bool> {
        let Some(credentials) = store
            .load()
            .await
            .context("unable to load stored credentials")?
        else {
            return Ok(false);
        };

        self.import(&credentials)
            .context("unable to import stored credentials")?;
        Ok(true)
    }

    /// Save the exported credentials to `store` if anything changed since the
    /// last check.
    ///
    /// This consumes the [`changed`](UserInfoCache::changed) flag, so it
    /// should be the only consumer of it. Returns whether a save happened.
    pub async fn persist_if_changed(&self, store: &dyn CredentialStore) -> Result<bool> {
        if !self.changed() {
            return Ok(false);
        }

        debug!("persisting changed user info");
        store
            .save(self.export())
            .await
            .context("unable to save credentials")?;
        Ok(true)
    }
}
