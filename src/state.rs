use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::ServerConfig;
use crate::core::jobs::{AwsTranscribeJobs, build_transcribe_client};
use crate::core::orchestrator::{TranscribeService, TranscribeSettings};
use crate::core::result::HttpResultFetcher;
use crate::core::storage::build_s3_store;
use crate::errors::{Dependency, ProxyError, ProxyResult};

/// Shared application state.
///
/// Every collaborator client is created once here and reused by all requests.
pub struct AppState {
    pub config: ServerConfig,
    pub service: Arc<TranscribeService>,
}

impl AppState {
    /// Build the production collaborators from configuration.
    pub async fn new(config: ServerConfig) -> ProxyResult<Arc<Self>> {
        let store = build_s3_store(&config)
            .map_err(|e| ProxyError::dependency(Dependency::ObjectStore, e.to_string()))?;
        let jobs = AwsTranscribeJobs::new(build_transcribe_client(&config).await);
        let fetcher = HttpResultFetcher::with_timeout(Duration::from_secs(
            config.result_fetch_timeout_seconds,
        ))?;

        info!(
            "Transcribe proxy using bucket {} in {}",
            config.temp_bucket, config.aws_region
        );

        let service = TranscribeService::new(
            Arc::new(store),
            Arc::new(jobs),
            Arc::new(fetcher),
            TranscribeSettings::from(&config),
        );

        Ok(Self::with_service(config, service))
    }

    /// Wrap an already assembled service, e.g. one built on test fakes.
    pub fn with_service(config: ServerConfig, service: TranscribeService) -> Arc<Self> {
        Arc::new(Self {
            config,
            service: Arc::new(service),
        })
    }
}
