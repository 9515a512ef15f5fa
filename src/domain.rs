use crate::errors::{StorageError, TrendingError};
use crate::models::PutReceipt;
use async_trait::async_trait;

/// Trait defining operations against the object store (bucket).
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    // Send+Sync+'static required for Arc<dyn>
    /// Writes `data` under `key`, overwriting any existing object.
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<PutReceipt, StorageError>;

    /// Reads the full object content at `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;
}

/// Trait defining operations against the trending-content API.
#[async_trait]
pub trait TrendingSource: Send + Sync + 'static {
    /// Returns the original-resolution URLs of currently trending GIFs,
    /// at most `limit` of them, in the API's ranking order.
    async fn trending_gif_urls(&self, limit: u32) -> Result<Vec<String>, TrendingError>;

    /// Downloads the full binary content at `url`.
    async fn download(&self, url: &str) -> Result<Vec<u8>, TrendingError>;
}
