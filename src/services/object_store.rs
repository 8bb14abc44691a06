use std::time::Duration;

use crate::error::StorageError;

/// Durable keyed binary storage for photo variants.
///
/// Implementations never retry; failures are reported to the caller as-is.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `data` under `key`, overwriting any existing object.
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError>;

    /// Removes `key`. Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Time-limited GET URL reachable from outside the storage network.
    async fn presigned_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError>;

    /// Direct URL for buckets with a public-read policy.
    fn public_url(&self, key: &str) -> String;
}
