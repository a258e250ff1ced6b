//! Configuration validation logic.

use http::HeaderValue;

use super::{ConfigError, ServerConfig};
use crate::core::transcription::is_valid_session_id;

/// Validate a fully merged configuration.
pub(super) fn validate(config: &ServerConfig) -> Result<(), ConfigError> {
    validate_storage(config)?;
    validate_job_naming(config)?;
    validate_limits(config)?;
    validate_credentials(config)?;
    validate_cors(config)?;
    Ok(())
}

fn validate_storage(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.temp_bucket.trim().is_empty() {
        return Err(ConfigError::Missing("TEMP_BUCKET"));
    }

    if let Some(endpoint) = &config.s3_endpoint {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                name: "s3_endpoint",
                message: format!("{endpoint:?} must start with http:// or https://"),
            });
        }
    }

    Ok(())
}

// Job names accept only [0-9a-zA-Z._-]; the prefix is part of every name.
fn validate_job_naming(config: &ServerConfig) -> Result<(), ConfigError> {
    if !is_valid_session_id(&config.job_name_prefix) {
        return Err(ConfigError::InvalidValue {
            name: "job_name_prefix",
            message: format!(
                "{:?} must be non-empty and contain only letters, digits, '.', '_' or '-'",
                config.job_name_prefix
            ),
        });
    }

    if config.media_format.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            name: "media_format",
            message: "must not be empty".to_string(),
        });
    }

    if config.default_language_code.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            name: "default_language_code",
            message: "must not be empty".to_string(),
        });
    }

    Ok(())
}

fn validate_limits(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.max_body_bytes == 0 {
        return Err(ConfigError::InvalidValue {
            name: "max_body_bytes",
            message: "must be greater than 0".to_string(),
        });
    }

    if config.result_fetch_timeout_seconds == 0 {
        return Err(ConfigError::InvalidValue {
            name: "result_fetch_timeout_seconds",
            message: "must be greater than 0".to_string(),
        });
    }

    Ok(())
}

fn validate_credentials(config: &ServerConfig) -> Result<(), ConfigError> {
    match (&config.aws_access_key_id, &config.aws_secret_access_key) {
        (Some(_), None) | (None, Some(_)) => Err(ConfigError::InvalidValue {
            name: "aws credentials",
            message: "access key id and secret access key must be set together".to_string(),
        }),
        _ => Ok(()),
    }
}

// `*` or a comma-separated list of http(s) origins usable as header values.
fn validate_cors(config: &ServerConfig) -> Result<(), ConfigError> {
    let origins = config.cors_allowed_origins.trim();
    if origins == "*" {
        return Ok(());
    }

    let invalid = |message: String| ConfigError::InvalidValue {
        name: "cors_allowed_origins",
        message,
    };

    let mut count = 0;
    for origin in origins.split(',').map(str::trim).filter(|o| !o.is_empty()) {
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            return Err(invalid(format!(
                "{origin:?} must start with http:// or https://"
            )));
        }
        if HeaderValue::from_str(origin).is_err() {
            return Err(invalid(format!("{origin:?} is not a valid header value")));
        }
        count += 1;
    }

    if count == 0 {
        return Err(invalid("must be \"*\" or list at least one origin".to_string()));
    }

    Ok(())
}
