use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use std::sync::Arc;
use tracing::debug;

use super::{AudioStore, StoreError};
use crate::config::ServerConfig;

/// [`AudioStore`] backed by any `object_store` implementation.
///
/// Production uses S3 (see [`build_s3_store`]); tests plug in
/// `object_store::memory::InMemory`.
pub struct ObjectStoreAudioStore {
    bucket: String,
    store: Arc<dyn ObjectStore>,
}

impl ObjectStoreAudioStore {
    pub fn new(bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            bucket: bucket.into(),
            store,
        }
    }

    fn object_path(key: &str) -> Result<ObjectPath, StoreError> {
        ObjectPath::parse(key).map_err(|e| StoreError(format!("Invalid object key {key}: {e}")))
    }
}

#[async_trait]
impl AudioStore for ObjectStoreAudioStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(&self, key: &str, audio: Bytes, content_type: &str) -> Result<(), StoreError> {
        let path = Self::object_path(key)?;

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        debug!(
            "Uploading {} bytes to bucket={} key={}",
            audio.len(),
            self.bucket,
            key
        );

        self.store
            .put_opts(&path, PutPayload::from(audio), options)
            .await
            .map_err(|e| StoreError(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = Self::object_path(key)?;
        self.store
            .delete(&path)
            .await
            .map_err(|e| StoreError(e.to_string()))
    }
}

/// Build the S3 client for the temp bucket from server configuration.
///
/// Region and static credentials are taken from config when present,
/// otherwise the usual `AWS_*` environment variables apply.
pub fn build_s3_store(config: &ServerConfig) -> Result<ObjectStoreAudioStore, StoreError> {
    let mut builder = AmazonS3Builder::from_env()
        .with_bucket_name(&config.temp_bucket)
        .with_region(&config.aws_region);

    if let Some(endpoint) = &config.s3_endpoint {
        builder = builder
            .with_endpoint(endpoint)
            .with_allow_http(endpoint.starts_with("http://"));
    }

    if let Some((access_key, secret_key)) = config.static_credentials() {
        builder = builder
            .with_access_key_id(access_key)
            .with_secret_access_key(secret_key);
        if let Some(token) = &config.aws_session_token {
            builder = builder.with_token(token);
        }
    }

    let store = builder
        .build()
        .map_err(|e| StoreError(format!("Failed to build S3 client: {e}")))?;

    Ok(ObjectStoreAudioStore::new(
        config.temp_bucket.clone(),
        Arc::new(store),
    ))
}
