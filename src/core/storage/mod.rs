//! Temporary audio storage.
//!
//! The orchestrator only needs two operations against the temp bucket: put the
//! decoded clip and delete it again. [`AudioStore`] is that seam; the production
//! implementation is [`ObjectStoreAudioStore`] over the `object_store` crate.
//!
//! [`TempObject`] ties the lifetime of an uploaded clip to one request: it is
//! created by a successful upload and consumed by [`TempObject::release`], which
//! never fails the request. Dropping it unreleased schedules the delete instead.

mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::transcription::TempObjectRef;

pub use s3::{ObjectStoreAudioStore, build_s3_store};

/// Error raised by an [`AudioStore`] implementation.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(pub String);

#[async_trait]
pub trait AudioStore: Send + Sync {
    /// Bucket that [`TempObjectRef`]s produced by this store point into.
    fn bucket(&self) -> &str;

    async fn put(&self, key: &str, audio: Bytes, content_type: &str) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// An uploaded clip that must be removed before the response goes out.
///
/// If the owning future is dropped before [`TempObject::release`] finishes
/// (client disconnect, outer timeout), `Drop` schedules the delete on the
/// current tokio runtime instead.
#[must_use = "a TempObject must be released"]
pub struct TempObject {
    store: Arc<dyn AudioStore>,
    object: TempObjectRef,
    released: bool,
}

impl TempObject {
    /// Upload `audio` and take ownership of the resulting object.
    pub async fn upload(
        store: Arc<dyn AudioStore>,
        object: TempObjectRef,
        audio: Bytes,
        content_type: &str,
    ) -> Result<Self, StoreError> {
        store.put(&object.key, audio, content_type).await?;
        Ok(Self {
            store,
            object,
            released: false,
        })
    }

    pub fn object(&self) -> &TempObjectRef {
        &self.object
    }

    /// Best-effort delete. Failures are logged and dropped; the bucket
    /// lifecycle policy removes anything left behind.
    pub async fn release(mut self) {
        delete_temp_object(self.store.as_ref(), &self.object).await;
        self.released = true;
    }
}

impl Drop for TempObject {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let store = self.store.clone();
        let object = self.object.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("Temp object {} abandoned, scheduling delete", object.uri());
                handle.spawn(async move {
                    delete_temp_object(store.as_ref(), &object).await;
                });
            }
            Err(_) => warn!(
                "Temp object {} abandoned outside a runtime (lifecycle will handle)",
                object.uri()
            ),
        }
    }
}

async fn delete_temp_object(store: &dyn AudioStore, object: &TempObjectRef) {
    match store.delete(&object.key).await {
        Ok(()) => debug!("Deleted temp object {}", object.uri()),
        Err(e) => warn!(
            "Failed to delete temp file {} (lifecycle will handle): {}",
            object.uri(),
            e
        ),
    }
}
