//! HTTP request handlers
//!
//! - `api` - Health check endpoint
//! - `transcribe` - Batch transcription of a base64 audio clip

pub mod api;
pub mod transcribe;
