use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_transcribe::Client as TranscribeClient;
use aws_sdk_transcribe::error::DisplayErrorContext;
use aws_sdk_transcribe::types::{LanguageCode, Media, MediaFormat, TranscriptionJobStatus};
use tracing::{debug, info};

use super::{JobRecord, JobServiceError, JobStatus, StartJob, TranscriptionJobs};
use crate::config::ServerConfig;

/// Amazon Transcribe batch jobs.
#[derive(Clone)]
pub struct AwsTranscribeJobs {
    client: TranscribeClient,
}

impl AwsTranscribeJobs {
    pub fn new(client: TranscribeClient) -> Self {
        Self { client }
    }

    /// Map the service vocabulary onto the three states the poll loop knows.
    /// `QUEUED`, `IN_PROGRESS` and anything unrecognised keep polling.
    fn map_status(status: Option<&TranscriptionJobStatus>) -> JobStatus {
        match status {
            Some(TranscriptionJobStatus::Completed) => JobStatus::Completed,
            Some(TranscriptionJobStatus::Failed) => JobStatus::Failed,
            _ => JobStatus::InProgress,
        }
    }
}

/// Build the Transcribe client once per process.
///
/// Uses explicit credentials when both key id and secret are configured,
/// otherwise the default provider chain (env vars, profile, IAM role).
pub async fn build_transcribe_client(config: &ServerConfig) -> TranscribeClient {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()));

    if let Some((access_key, secret_key)) = config.static_credentials() {
        let credentials = Credentials::new(
            access_key,
            secret_key,
            config.aws_session_token.clone(),
            None, // Expiration
            "transcribe-proxy",
        );
        loader = loader.credentials_provider(credentials);
    }

    TranscribeClient::new(&loader.load().await)
}

#[async_trait]
impl TranscriptionJobs for AwsTranscribeJobs {
    async fn start(&self, job: &StartJob) -> Result<(), JobServiceError> {
        self.client
            .start_transcription_job()
            .transcription_job_name(job.job_name.as_str())
            .media(Media::builder().media_file_uri(job.media_uri.as_str()).build())
            .media_format(MediaFormat::from(job.media_format.as_str()))
            .language_code(LanguageCode::from(job.language_code.as_str()))
            .send()
            .await
            .map_err(|e| JobServiceError(DisplayErrorContext(&e).to_string()))?;

        info!(
            "Started transcription job {} for {} ({})",
            job.job_name, job.media_uri, job.language_code
        );
        Ok(())
    }

    async fn status(&self, job_name: &str) -> Result<JobRecord, JobServiceError> {
        let output = self
            .client
            .get_transcription_job()
            .transcription_job_name(job_name)
            .send()
            .await
            .map_err(|e| JobServiceError(DisplayErrorContext(&e).to_string()))?;

        let job = output
            .transcription_job()
            .ok_or_else(|| JobServiceError(format!("No job record returned for {job_name}")))?;

        let raw_status = job.transcription_job_status();
        debug!("Job {} raw status: {:?}", job_name, raw_status);

        Ok(JobRecord {
            status: Self::map_status(raw_status),
            result_uri: job
                .transcript()
                .and_then(|t| t.transcript_file_uri())
                .map(str::to_string),
            failure_reason: job.failure_reason().map(str::to_string),
        })
    }
}
