//! Request-scoped data model for a single transcription call.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ProxyError, ProxyResult};

/// Language used when the caller does not send `language_code`.
pub const DEFAULT_LANGUAGE_CODE: &str = "en-US";

/// Length of the random part of every job name.
pub const JOB_SUFFIX_LEN: usize = 8;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Inbound JSON body of `POST /transcribe`.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscribeBody {
    pub audio_data: String,
    pub session_id: String,
    #[serde(default)]
    pub language_code: Option<String>,
}

/// A decoded transcription request.
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub audio_data: Vec<u8>,
    pub session_id: String,
    pub language_code: String,
}

impl TranscriptionRequest {
    /// Decode the base64 payload and validate the session id.
    ///
    /// `default_language` is used when the body carries no `language_code`.
    pub fn from_body(body: TranscribeBody, default_language: &str) -> ProxyResult<Self> {
        if !is_valid_session_id(&body.session_id) {
            return Err(ProxyError::Input(format!(
                "session_id must be non-empty and contain only letters, digits, '.', '_' or '-': {:?}",
                body.session_id
            )));
        }

        let audio_data = STANDARD
            .decode(body.audio_data.trim())
            .map_err(|e| ProxyError::Input(format!("audio_data is not valid base64: {e}")))?;

        let language_code = body
            .language_code
            .filter(|code| !code.trim().is_empty())
            .unwrap_or_else(|| default_language.to_string());

        Ok(Self {
            audio_data,
            session_id: body.session_id,
            language_code,
        })
    }
}

/// Session ids end up inside job names, which only accept `[0-9a-zA-Z._-]`.
pub fn is_valid_session_id(session_id: &str) -> bool {
    !session_id.is_empty()
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Build `<prefix>-<session_id>-<suffix>` with an 8 character random suffix.
pub fn generate_job_name(prefix: &str, session_id: &str) -> String {
    format!("{}-{}-{}", prefix, session_id, random_suffix())
}

// Low 48 bits of a v4 UUID carry no version/variant bits.
fn random_suffix() -> String {
    let mut value = Uuid::new_v4().as_u128() & 0xFFFF_FFFF_FFFF;
    let base = SUFFIX_ALPHABET.len() as u128;
    let mut suffix = [0u8; JOB_SUFFIX_LEN];
    for slot in suffix.iter_mut().rev() {
        *slot = SUFFIX_ALPHABET[(value % base) as usize];
        value /= base;
    }
    suffix.iter().map(|&b| b as char).collect()
}

/// Location of the temporary audio object in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempObjectRef {
    pub bucket: String,
    pub key: String,
}

impl TempObjectRef {
    /// Object key layout: `{prefix}/{job_name}.{format}`.
    pub fn for_job(bucket: &str, prefix: &str, job_name: &str, media_format: &str) -> Self {
        let prefix = prefix.trim().trim_matches('/');
        let key = if prefix.is_empty() {
            format!("{}.{}", job_name, media_format)
        } else {
            format!("{}/{}.{}", prefix, job_name, media_format)
        };

        Self {
            bucket: bucket.to_string(),
            key,
        }
    }

    pub fn uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}

/// A submitted job and the media it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_name: String,
    pub media_uri: String,
}

/// Transcript text plus the averaged word confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionResult {
    pub transcript: String,
    pub confidence: f64,
}

/// Success body of `POST /transcribe`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscribeResponse {
    pub transcript: String,
    pub job_name: String,
    pub confidence: f64,
}
