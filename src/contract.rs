//! # contract: the object-store interface the publisher writes through
//!
//! [`RemoteStore`] is the only way the pipeline touches the bucket. It has
//! three operations (put, list, delete) and is implemented by the
//! S3-compatible client in [`crate::store`] and by the `mockall` mock used
//! in tests.
//!
//! Errors are boxed trait objects; the publisher decides per step whether a
//! failure aborts the run or is only logged.

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Flat key/value object storage, addressed by `/`-separated keys.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Writes `body` under `key`, replacing any existing object.
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError>;

    /// Lists every key starting with `prefix`.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Deletes the object under `key`.
    async fn delete_object(&self, key: &str) -> Result<(), StoreError>;
}
