//! Job status poll loop.
//!
//! ```text
//! Submitted ──first check──▶ Polling ──┬─ COMPLETED ──▶ Completed
//!                              ▲   │   ├─ FAILED ─────▶ Failed
//!                              └───┘   └─ budget spent ▶ TimedOut
//!                           (sleep one interval)
//! ```
//!
//! A single `waited` counter bounds the loop, so a request never blocks on
//! polling for longer than the policy's maximum wait.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use crate::core::jobs::{JobStatus, TranscriptionJobs};
use crate::core::result::ResultFetcher;
use crate::core::transcription::TranscriptionResult;
use crate::errors::{Dependency, ProxyError, ProxyResult};

/// Maximum total time spent waiting on a job.
pub const MAX_WAIT: Duration = Duration::from_secs(90);

/// Pause between two status checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Fixed polling budget: 90 seconds in 3 second steps, at most 30 checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    max_wait: Duration,
    interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_wait: MAX_WAIT,
            interval: POLL_INTERVAL,
        }
    }
}

impl PollPolicy {
    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_checks(&self) -> u32 {
        self.max_wait.as_millis().div_ceil(self.interval.as_millis()) as u32
    }
}

/// Source of the pause between status checks.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleeping on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Submitted,
    Polling,
    Completed,
    Failed,
    TimedOut,
}

/// Drives one submitted job to a terminal state.
pub struct JobPoller<'a> {
    jobs: &'a dyn TranscriptionJobs,
    fetcher: &'a dyn ResultFetcher,
    sleeper: &'a dyn Sleeper,
    policy: PollPolicy,
    state: PollState,
}

impl<'a> JobPoller<'a> {
    pub fn new(
        jobs: &'a dyn TranscriptionJobs,
        fetcher: &'a dyn ResultFetcher,
        sleeper: &'a dyn Sleeper,
        policy: PollPolicy,
    ) -> Self {
        Self {
            jobs,
            fetcher,
            sleeper,
            policy,
            state: PollState::Submitted,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    fn advance(&mut self, job_name: &str, next: PollState) {
        if self.state != next {
            debug!("Job {} poll state {:?} -> {:?}", job_name, self.state, next);
            self.state = next;
        }
    }

    /// Poll until the job completes, fails, or the budget runs out.
    ///
    /// On completion the result document is fetched and reduced to a
    /// transcript plus average confidence.
    pub async fn wait_for_result(&mut self, job_name: &str) -> ProxyResult<TranscriptionResult> {
        let mut waited = Duration::ZERO;
        let max_checks = self.policy.max_checks();
        let mut checks = 0u32;

        while waited < self.policy.max_wait {
            self.advance(job_name, PollState::Polling);
            checks += 1;

            let record = self
                .jobs
                .status(job_name)
                .await
                .map_err(|e| ProxyError::dependency(Dependency::JobService, e.to_string()))?;

            debug!(
                "Job {} status: {:?} (check {}/{}, waited {}s)",
                job_name,
                record.status,
                checks,
                max_checks,
                waited.as_secs()
            );

            match record.status {
                JobStatus::Completed => {
                    self.advance(job_name, PollState::Completed);
                    let result_uri = record.result_uri.ok_or_else(|| {
                        ProxyError::ResultParse(format!(
                            "job {job_name} completed without a transcript file URI"
                        ))
                    })?;
                    return self.fetch_result(&result_uri).await;
                }
                JobStatus::Failed => {
                    self.advance(job_name, PollState::Failed);
                    return Err(ProxyError::JobFailed {
                        reason: record
                            .failure_reason
                            .unwrap_or_else(|| "no failure reason reported".to_string()),
                    });
                }
                JobStatus::InProgress => {
                    self.sleeper.sleep(self.policy.interval).await;
                    waited += self.policy.interval;
                }
            }
        }

        self.advance(job_name, PollState::TimedOut);
        info!(
            "Job {} did not finish within {}s ({} checks)",
            job_name,
            self.policy.max_wait.as_secs(),
            checks
        );
        Err(ProxyError::Timeout {
            max_wait_secs: self.policy.max_wait.as_secs(),
        })
    }

    async fn fetch_result(&self, result_uri: &str) -> ProxyResult<TranscriptionResult> {
        let document = self.fetcher.fetch(result_uri).await?;
        let transcript = document.transcript()?.to_string();
        let confidence = document.average_confidence();

        Ok(TranscriptionResult {
            transcript,
            confidence,
        })
    }
}
