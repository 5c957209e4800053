//! R2Store: the production [`RemoteStore`], an S3-compatible bucket
//! (Cloudflare R2 by default).
//!
//! Bridges the [`RemoteStore`] contract to the `object_store` crate. Construct
//! it from a [`RemoteConfig`], usually obtained through
//! [`crate::load_config::load_remote_config`].
//!
//! Keys are passed through verbatim: a key written by `put_object` is listed
//! and deleted under exactly the same string.

use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use std::sync::Arc;

use crate::config::RemoteConfig;
use crate::contract::{RemoteStore, StoreError};

pub struct R2Store {
    client: Arc<dyn ObjectStore>,
    bucket_name: String,
}

/// Parses `key` as an object path without re-encoding it.
fn object_path(key: &str) -> Result<ObjectPath, StoreError> {
    ObjectPath::parse(key).map_err(|e| {
        tracing::error!(error = ?e, key, "Key is not a valid object path");
        Box::new(e) as StoreError
    })
}

impl R2Store {
    pub fn new(config: &RemoteConfig) -> Result<Self, StoreError> {
        let client = AmazonS3Builder::new()
            .with_region(&config.region)
            .with_bucket_name(&config.bucket_name)
            .with_endpoint(&config.endpoint)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(&config.secret_access_key)
            .build()
            .map_err(|e| {
                tracing::error!(error = ?e, bucket = %config.bucket_name, "Failed to construct object store client");
                e
            })?;
        tracing::info!(
            bucket = %config.bucket_name,
            endpoint = %config.endpoint,
            region = %config.region,
            "Initialised R2Store"
        );
        Ok(R2Store {
            client: Arc::new(client),
            bucket_name: config.bucket_name.clone(),
        })
    }

    /// Wraps an already configured object store, e.g. `InMemory` in tests.
    pub fn from_object_store(client: Arc<dyn ObjectStore>, bucket_name: impl Into<String>) -> Self {
        R2Store {
            client,
            bucket_name: bucket_name.into(),
        }
    }
}

#[async_trait]
impl RemoteStore for R2Store {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let size = body.len();
        let location = object_path(key)?;
        let options = PutOptions {
            attributes: Attributes::from_iter([(Attribute::ContentType, content_type.to_string())]),
            ..Default::default()
        };
        match self
            .client
            .put_opts(&location, PutPayload::from(body), options)
            .await
        {
            Ok(result) => {
                tracing::info!(
                    bucket = %self.bucket_name,
                    key,
                    size,
                    e_tag = result.e_tag.as_deref().unwrap_or(""),
                    "Uploaded object"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = ?e, bucket = %self.bucket_name, key, "Failed to upload object");
                Err(Box::new(e))
            }
        }
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let prefix_path = object_path(prefix)?;
        let listed = self
            .client
            .list(Some(&prefix_path))
            .try_collect::<Vec<_>>()
            .await;
        match listed {
            Ok(objects) => {
                tracing::info!(bucket = %self.bucket_name, prefix, count = objects.len(), "Listed objects");
                Ok(objects.into_iter().map(|o| o.location.to_string()).collect())
            }
            Err(e) => {
                tracing::error!(error = ?e, bucket = %self.bucket_name, prefix, "Failed to list objects");
                Err(Box::new(e))
            }
        }
    }

    async fn delete_object(&self, key: &str) -> Result<(), StoreError> {
        let location = object_path(key)?;
        match self.client.delete(&location).await {
            Ok(()) => {
                tracing::info!(bucket = %self.bucket_name, key, "Deleted object");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = ?e, bucket = %self.bucket_name, key, "Failed to delete object");
                Err(Box::new(e))
            }
        }
    }
}
