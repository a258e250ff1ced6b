//! Test doubles for the transcription collaborators
//!
//! - In-memory object store (`object_store::memory::InMemory`)
//! - Scripted job service that replays a fixed status sequence
//! - Instant sleeper that records requested pauses
//! - Result documents served by a `wiremock` server

#![allow(dead_code)]

use async_trait::async_trait;
use object_store::memory::InMemory;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use transcribe_proxy::config::ServerConfig;
use transcribe_proxy::core::jobs::{JobRecord, JobServiceError, StartJob, TranscriptionJobs};
use transcribe_proxy::core::orchestrator::{TranscribeService, TranscribeSettings};
use transcribe_proxy::core::poll::Sleeper;
use transcribe_proxy::core::result::HttpResultFetcher;
use transcribe_proxy::core::storage::ObjectStoreAudioStore;
use transcribe_proxy::state::AppState;

pub const TEMP_BUCKET: &str = "opic-temp-audio";

/// Replays `statuses` in order, then reports in-progress forever.
pub struct ScriptedJobs {
    statuses: Mutex<VecDeque<JobRecord>>,
    started: Mutex<Vec<StartJob>>,
    checks: Mutex<u32>,
}

impl ScriptedJobs {
    pub fn new(statuses: Vec<JobRecord>) -> Arc<Self> {
        Arc::new(Self {
            statuses: Mutex::new(statuses.into()),
            started: Mutex::new(Vec::new()),
            checks: Mutex::new(0),
        })
    }

    pub fn started(&self) -> Vec<StartJob> {
        self.started.lock().unwrap().clone()
    }

    pub fn checks(&self) -> u32 {
        *self.checks.lock().unwrap()
    }
}

#[async_trait]
impl TranscriptionJobs for ScriptedJobs {
    async fn start(&self, job: &StartJob) -> Result<(), JobServiceError> {
        self.started.lock().unwrap().push(job.clone());
        Ok(())
    }

    async fn status(&self, _job_name: &str) -> Result<JobRecord, JobServiceError> {
        *self.checks.lock().unwrap() += 1;
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(JobRecord::in_progress))
    }
}

#[derive(Default)]
pub struct RecordingSleeper {
    total: Mutex<Duration>,
}

impl RecordingSleeper {
    pub fn total(&self) -> Duration {
        *self.total.lock().unwrap()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        *self.total.lock().unwrap() += duration;
    }
}

pub struct TestHarness {
    pub state: Arc<AppState>,
    /// Backing store of the temp bucket, for inspecting uploaded objects.
    pub memory: Arc<InMemory>,
    pub jobs: Arc<ScriptedJobs>,
    pub sleeper: Arc<RecordingSleeper>,
}

pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.host = "127.0.0.1".to_string();
    config.temp_bucket = TEMP_BUCKET.to_string();
    config
}

pub fn harness(statuses: Vec<JobRecord>) -> TestHarness {
    harness_with_config(test_config(), statuses)
}

pub fn harness_with_config(config: ServerConfig, statuses: Vec<JobRecord>) -> TestHarness {
    build_harness(config, statuses, true)
}

/// Harness whose service sleeps on the tokio clock instead of the recorder.
pub fn harness_with_tokio_clock(statuses: Vec<JobRecord>) -> TestHarness {
    build_harness(test_config(), statuses, false)
}

fn build_harness(
    config: ServerConfig,
    statuses: Vec<JobRecord>,
    record_sleeps: bool,
) -> TestHarness {
    let memory = Arc::new(InMemory::new());
    let store = Arc::new(ObjectStoreAudioStore::new(TEMP_BUCKET, memory.clone()));
    let jobs = ScriptedJobs::new(statuses);
    let sleeper = Arc::new(RecordingSleeper::default());
    let fetcher = HttpResultFetcher::with_timeout(Duration::from_secs(5)).unwrap();

    let mut service = TranscribeService::new(
        store,
        jobs.clone(),
        Arc::new(fetcher),
        TranscribeSettings::from(&config),
    );
    if record_sleeps {
        service = service.with_sleeper(sleeper.clone());
    }

    TestHarness {
        state: AppState::with_service(config, service),
        memory,
        jobs,
        sleeper,
    }
}

pub fn transcript_document(transcript: &str, confidences: &[&str]) -> String {
    let items: Vec<serde_json::Value> = confidences
        .iter()
        .map(|c| {
            serde_json::json!({
                "type": "pronunciation",
                "alternatives": [{"confidence": c, "content": "w"}]
            })
        })
        .collect();

    serde_json::json!({
        "jobName": "job",
        "results": {
            "transcripts": [{"transcript": transcript}],
            "items": items
        },
        "status": "COMPLETED"
    })
    .to_string()
}
