//! Configuration module for the transcribe proxy
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Applying YAML overrides on top of the environment
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use transcribe_proxy::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable base
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

mod env;
mod merge;
mod validation;
mod yaml;

pub use yaml::YamlConfig;

/// Default request body limit (10 MiB); base64 inflates audio by a third.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Default timeout for fetching a transcript document.
pub const DEFAULT_RESULT_FETCH_TIMEOUT_SECONDS: u64 = 30;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse YAML config: {0}")]
    Parse(String),

    #[error("Invalid value for {name}: {message}")]
    InvalidValue { name: &'static str, message: String },

    #[error("Missing required configuration: {0}")]
    Missing(&'static str),
}

/// Server configuration
///
/// Contains everything needed to run the proxy:
/// - Server settings (host, port, body limit)
/// - Temporary audio storage (bucket, prefix, optional S3-compatible endpoint)
/// - AWS region and optional static credentials
/// - Transcription job naming and media settings
/// - CORS origins
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,

    // Temporary storage
    /// Bucket that holds uploaded clips while a job runs
    pub temp_bucket: String,
    /// Key prefix for uploaded clips: `{temp_prefix}/{job_name}.{media_format}`
    pub temp_prefix: String,
    /// Custom S3-compatible endpoint (e.g. MinIO, LocalStack)
    pub s3_endpoint: Option<String>,

    // AWS settings
    /// AWS region (e.g., "us-east-1", "ap-northeast-2")
    pub aws_region: String,
    /// AWS access key ID; the default credential chain is used when unset
    pub aws_access_key_id: Option<String>,
    /// AWS secret access key
    pub aws_secret_access_key: Option<String>,
    /// Optional session token for temporary credentials
    pub aws_session_token: Option<String>,

    // Transcription settings
    pub job_name_prefix: String,
    /// Media format passed to the job service (e.g. "webm", "wav")
    pub media_format: String,
    /// Content type stored with the uploaded clip
    pub audio_content_type: String,
    /// Language used when a request carries no language code
    pub default_language_code: String,
    pub result_fetch_timeout_seconds: u64,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    pub cors_allowed_origins: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            temp_bucket: String::new(),
            temp_prefix: "temp".to_string(),
            s3_endpoint: None,
            aws_region: "us-east-1".to_string(),
            aws_access_key_id: None,
            aws_secret_access_key: None,
            aws_session_token: None,
            job_name_prefix: "opic".to_string(),
            media_format: "webm".to_string(),
            audio_content_type: "audio/webm".to_string(),
            default_language_code: crate::core::transcription::DEFAULT_LANGUAGE_CODE.to_string(),
            result_fetch_timeout_seconds: DEFAULT_RESULT_FETCH_TIMEOUT_SECONDS,
            cors_allowed_origins: "*".to_string(),
        }
    }
}

/// Zeroize secret fields when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.aws_access_key_id {
            key.zeroize();
        }
        if let Some(ref mut secret) = self.aws_secret_access_key {
            secret.zeroize();
        }
        if let Some(ref mut token) = self.aws_session_token {
            token.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables only.
    ///
    /// The .env file is loaded in main.rs before this is called, so its values
    /// are visible here as environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = merge::merge_config(None)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// After loading and merging, performs validation on the final configuration.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Static AWS key id and secret, when both are configured
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.aws_access_key_id, &self.aws_secret_access_key) {
            (Some(key_id), Some(secret)) => Some((key_id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}
