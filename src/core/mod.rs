pub mod jobs;
pub mod orchestrator;
pub mod poll;
pub mod result;
pub mod storage;
pub mod transcription;

// Re-export commonly used types for convenience
pub use jobs::{AwsTranscribeJobs, JobRecord, JobStatus, StartJob, TranscriptionJobs};
pub use orchestrator::{TranscribeService, TranscribeSettings};
pub use poll::{JobPoller, PollPolicy, PollState, Sleeper, TokioSleeper};
pub use result::{HttpResultFetcher, ResultFetcher, TranscriptDocument};
pub use storage::{AudioStore, ObjectStoreAudioStore, TempObject};
pub use transcription::{
    TranscribeBody, TranscribeResponse, TranscriptionRequest, TranscriptionResult,
};
