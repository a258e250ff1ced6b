use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::document::TranscriptDocument;
use crate::errors::{Dependency, ProxyError, ProxyResult};

/// Retrieves and parses the transcript document of a completed job.
#[async_trait]
pub trait ResultFetcher: Send + Sync {
    /// Fetch the document at `uri`.
    ///
    /// Transport and HTTP status failures are `Dependency` errors; a body
    /// that is not a transcript document is a `ResultParse` error.
    async fn fetch(&self, uri: &str) -> ProxyResult<TranscriptDocument>;
}

/// Plain HTTP GET against the (pre-signed) result URI.
#[derive(Clone)]
pub struct HttpResultFetcher {
    client: reqwest::Client,
}

impl HttpResultFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: Duration) -> ProxyResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ProxyError::dependency(
                    Dependency::ResultFetch,
                    format!("Failed to build HTTP client: {e}"),
                )
            })?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl ResultFetcher for HttpResultFetcher {
    async fn fetch(&self, uri: &str) -> ProxyResult<TranscriptDocument> {
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| ProxyError::dependency(Dependency::ResultFetch, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::dependency(
                Dependency::ResultFetch,
                format!("result document request returned {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProxyError::dependency(Dependency::ResultFetch, e.to_string()))?;

        debug!("Fetched transcript document ({} bytes)", body.len());

        TranscriptDocument::parse(&body)
    }
}
