//! Batch transcription job service.
//!
//! [`TranscriptionJobs`] is the two-call contract the poll loop relies on:
//! start a job for an uploaded media URI, then read its status. The
//! production implementation talks to Amazon Transcribe ([`AwsTranscribeJobs`]).

mod aws;

use async_trait::async_trait;

pub use aws::{AwsTranscribeJobs, build_transcribe_client};

/// Parameters of a job submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartJob {
    pub job_name: String,
    pub media_uri: String,
    pub media_format: String,
    pub language_code: String,
}

/// Job status as seen by the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Queued or running.
    InProgress,
    Completed,
    Failed,
}

/// One status read of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub status: JobStatus,
    /// Where the transcript document can be fetched, once completed.
    pub result_uri: Option<String>,
    /// Service-reported failure reason, once failed.
    pub failure_reason: Option<String>,
}

impl JobRecord {
    pub fn in_progress() -> Self {
        Self {
            status: JobStatus::InProgress,
            result_uri: None,
            failure_reason: None,
        }
    }

    pub fn completed(result_uri: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Completed,
            result_uri: Some(result_uri.into()),
            failure_reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            result_uri: None,
            failure_reason: Some(reason.into()),
        }
    }
}

/// Error raised by a [`TranscriptionJobs`] implementation.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct JobServiceError(pub String);

#[async_trait]
pub trait TranscriptionJobs: Send + Sync {
    async fn start(&self, job: &StartJob) -> Result<(), JobServiceError>;

    async fn status(&self, job_name: &str) -> Result<JobRecord, JobServiceError>;
}
