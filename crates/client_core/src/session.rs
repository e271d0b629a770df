//! Client-side session context: the durable values shared by both
//! controllers. Created once at startup, cleared by an explicit logout.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use shared::protocol::TokenPair;
use tracing::info;
use uuid::Uuid;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const DEVICE_ID_KEY: &str = "device_id";

/// Durable string-keyed storage seam. Production uses the SQLite-backed
/// store; tests inject an in-memory fake.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn put(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl SessionStore for storage::Storage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_value(key).await
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.delete_value(key).await
    }
}

#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn store_tokens(&self, tokens: &TokenPair) -> Result<()> {
        self.store
            .put(ACCESS_TOKEN_KEY, &tokens.access_token)
            .await?;
        self.store
            .put(REFRESH_TOKEN_KEY, &tokens.refresh_token)
            .await?;
        info!("session: token pair persisted");
        Ok(())
    }

    pub async fn access_token(&self) -> Result<Option<String>> {
        self.store.get(ACCESS_TOKEN_KEY).await
    }

    pub async fn refresh_token(&self) -> Result<Option<String>> {
        self.store.get(REFRESH_TOKEN_KEY).await
    }

    /// Stable per-installation identifier. Generated and persisted on first
    /// use; every later call returns the stored value.
    pub async fn device_id(&self) -> Result<String> {
        if let Some(existing) = self.store.get(DEVICE_ID_KEY).await? {
            return Ok(existing);
        }

        let generated = Uuid::new_v4().to_string();
        self.store.put(DEVICE_ID_KEY, &generated).await?;
        info!(device_id = %generated, "session: generated device identifier");
        Ok(generated)
    }

    /// Removes every session value, including the device identifier.
    pub async fn clear(&self) -> Result<()> {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, DEVICE_ID_KEY] {
            self.store.remove(key).await?;
        }
        info!("session: cleared");
        Ok(())
    }
}
