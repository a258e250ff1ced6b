//! End-to-end handling of one transcription request.
//!
//! upload → start job → poll → fetch result → delete temp object.
//! Once the upload has succeeded the temp object is released exactly once,
//! whatever the outcome of the job. If the request future is dropped first,
//! the temp object schedules its own delete.

use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::core::jobs::{StartJob, TranscriptionJobs};
use crate::core::poll::{JobPoller, PollPolicy, Sleeper, TokioSleeper};
use crate::core::result::ResultFetcher;
use crate::core::storage::{AudioStore, TempObject};
use crate::core::transcription::{
    JobHandle, TempObjectRef, TranscribeResponse, TranscriptionRequest,
    TranscriptionResult, generate_job_name,
};
use crate::errors::{Dependency, ProxyError, ProxyResult};

/// Naming and media settings applied to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscribeSettings {
    pub job_name_prefix: String,
    pub temp_prefix: String,
    pub media_format: String,
    pub audio_content_type: String,
    pub default_language_code: String,
}

impl Default for TranscribeSettings {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for TranscribeSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            job_name_prefix: config.job_name_prefix.clone(),
            temp_prefix: config.temp_prefix.clone(),
            media_format: config.media_format.clone(),
            audio_content_type: config.audio_content_type.clone(),
            default_language_code: config.default_language_code.clone(),
        }
    }
}

/// Stateless between requests; shared behind an `Arc` by all handlers.
pub struct TranscribeService {
    store: Arc<dyn AudioStore>,
    jobs: Arc<dyn TranscriptionJobs>,
    fetcher: Arc<dyn ResultFetcher>,
    sleeper: Arc<dyn Sleeper>,
    policy: PollPolicy,
    settings: TranscribeSettings,
}

impl TranscribeService {
    pub fn new(
        store: Arc<dyn AudioStore>,
        jobs: Arc<dyn TranscriptionJobs>,
        fetcher: Arc<dyn ResultFetcher>,
        settings: TranscribeSettings,
    ) -> Self {
        Self {
            store,
            jobs,
            fetcher,
            sleeper: Arc::new(TokioSleeper),
            policy: PollPolicy::default(),
            settings,
        }
    }

    /// Replace the wall-clock sleeper, e.g. with a recording fake.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn settings(&self) -> &TranscribeSettings {
        &self.settings
    }

    pub async fn transcribe(&self, request: TranscriptionRequest) -> ProxyResult<TranscribeResponse> {
        info!(
            "Transcription request for session {} ({})",
            request.session_id, request.language_code
        );
        debug!("Decoded audio size: {} bytes", request.audio_data.len());

        let job_name = generate_job_name(&self.settings.job_name_prefix, &request.session_id);
        let object = TempObjectRef::for_job(
            self.store.bucket(),
            &self.settings.temp_prefix,
            &job_name,
            &self.settings.media_format,
        );

        let temp = TempObject::upload(
            self.store.clone(),
            object,
            Bytes::from(request.audio_data),
            &self.settings.audio_content_type,
        )
        .await
        .map_err(|e| {
            error!("Failed to upload audio for job {}: {}", job_name, e);
            ProxyError::dependency(Dependency::ObjectStore, e.to_string())
        })?;
        info!("Uploaded audio to {}", temp.object().uri());

        let handle = JobHandle {
            job_name,
            media_uri: temp.object().uri(),
        };
        let outcome = self.run_job(&handle, &request.language_code).await;

        temp.release().await;

        match outcome {
            Ok(result) => {
                debug!("Transcript for job {}: {}", handle.job_name, result.transcript);
                info!(
                    "Transcription job {} completed (confidence {:.3})",
                    handle.job_name, result.confidence
                );
                Ok(TranscribeResponse {
                    transcript: result.transcript,
                    job_name: handle.job_name,
                    confidence: result.confidence,
                })
            }
            Err(e) => {
                error!("Transcription job {} failed: {}", handle.job_name, e);
                Err(e)
            }
        }
    }

    async fn run_job(
        &self,
        handle: &JobHandle,
        language_code: &str,
    ) -> ProxyResult<TranscriptionResult> {
        let start = StartJob {
            job_name: handle.job_name.clone(),
            media_uri: handle.media_uri.clone(),
            media_format: self.settings.media_format.clone(),
            language_code: language_code.to_string(),
        };

        self.jobs
            .start(&start)
            .await
            .map_err(|e| ProxyError::dependency(Dependency::JobService, e.to_string()))?;

        JobPoller::new(
            self.jobs.as_ref(),
            self.fetcher.as_ref(),
            self.sleeper.as_ref(),
            self.policy,
        )
        .wait_for_result(&handle.job_name)
        .await
    }
}
