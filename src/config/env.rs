//! Environment variable loading.

use std::env;
use std::str::FromStr;

use super::{ConfigError, ServerConfig};

/// Read a variable, treating unset and blank the same.
pub(super) fn env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parse<T>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(name)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                name,
                message: format!("{raw:?}: {e}"),
            })
        })
        .transpose()
}

/// Build a configuration from defaults overlaid with environment variables.
pub(super) fn load_from_env() -> Result<ServerConfig, ConfigError> {
    let mut config = ServerConfig::default();

    if let Some(host) = env_string("HOST") {
        config.host = host;
    }
    if let Some(port) = env_parse("PORT")? {
        config.port = port;
    }
    if let Some(limit) = env_parse("MAX_BODY_BYTES")? {
        config.max_body_bytes = limit;
    }

    if let Some(bucket) = env_string("TEMP_BUCKET") {
        config.temp_bucket = bucket;
    }
    if let Some(prefix) = env_string("TEMP_PREFIX") {
        config.temp_prefix = prefix;
    }
    config.s3_endpoint = env_string("S3_ENDPOINT");

    if let Some(region) = env_string("AWS_REGION") {
        config.aws_region = region;
    }
    config.aws_access_key_id = env_string("AWS_ACCESS_KEY_ID");
    config.aws_secret_access_key = env_string("AWS_SECRET_ACCESS_KEY");
    config.aws_session_token = env_string("AWS_SESSION_TOKEN");

    if let Some(prefix) = env_string("JOB_NAME_PREFIX") {
        config.job_name_prefix = prefix;
    }
    if let Some(format) = env_string("MEDIA_FORMAT") {
        config.media_format = format;
    }
    if let Some(content_type) = env_string("AUDIO_CONTENT_TYPE") {
        config.audio_content_type = content_type;
    }
    if let Some(language) = env_string("DEFAULT_LANGUAGE_CODE") {
        config.default_language_code = language;
    }
    if let Some(timeout) = env_parse("RESULT_FETCH_TIMEOUT_SECONDS")? {
        config.result_fetch_timeout_seconds = timeout;
    }

    if let Some(origins) = env_string("CORS_ALLOWED_ORIGINS") {
        config.cors_allowed_origins = origins;
    }

    Ok(config)
}
