//! Merging YAML overrides on top of the environment configuration.

use super::env::load_from_env;
use super::yaml::YamlConfig;
use super::{ConfigError, ServerConfig};

/// Environment values (with defaults) form the base; every value present in
/// the YAML file replaces the corresponding base value.
pub(super) fn merge_config(yaml: Option<YamlConfig>) -> Result<ServerConfig, ConfigError> {
    let mut config = load_from_env()?;

    if let Some(yaml) = yaml {
        apply_yaml(&mut config, yaml);
    }

    Ok(config)
}

fn apply_yaml(config: &mut ServerConfig, yaml: YamlConfig) {
    if let Some(server) = yaml.server {
        if let Some(host) = server.host {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
        if let Some(limit) = server.max_body_bytes {
            config.max_body_bytes = limit;
        }
    }

    if let Some(storage) = yaml.storage {
        if let Some(bucket) = storage.temp_bucket {
            config.temp_bucket = bucket;
        }
        if let Some(prefix) = storage.temp_prefix {
            config.temp_prefix = prefix;
        }
        if storage.s3_endpoint.is_some() {
            config.s3_endpoint = storage.s3_endpoint;
        }
    }

    if let Some(aws) = yaml.aws {
        if let Some(region) = aws.region {
            config.aws_region = region;
        }
        if aws.access_key_id.is_some() {
            config.aws_access_key_id = aws.access_key_id;
        }
        if aws.secret_access_key.is_some() {
            config.aws_secret_access_key = aws.secret_access_key;
        }
        if aws.session_token.is_some() {
            config.aws_session_token = aws.session_token;
        }
    }

    if let Some(transcription) = yaml.transcription {
        if let Some(prefix) = transcription.job_name_prefix {
            config.job_name_prefix = prefix;
        }
        if let Some(format) = transcription.media_format {
            config.media_format = format;
        }
        if let Some(content_type) = transcription.audio_content_type {
            config.audio_content_type = content_type;
        }
        if let Some(language) = transcription.default_language_code {
            config.default_language_code = language;
        }
        if let Some(timeout) = transcription.result_fetch_timeout_seconds {
            config.result_fetch_timeout_seconds = timeout;
        }
    }

    if let Some(origins) = yaml.security.and_then(|s| s.cors_allowed_origins) {
        config.cors_allowed_origins = origins;
    }
}
