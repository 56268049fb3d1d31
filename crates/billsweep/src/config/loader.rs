use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;
use crate::secrets::has_secret_source;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let email = config.email.trim();
    match email.rfind('@') {
        Some(at) if at > 0 && at + 1 < email.len() => {}
        _ => {
            return Err(ConfigError::Validation {
                message: format!("'{}' is not an email address", config.email),
            });
        }
    }

    if config.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "IMAP host cannot be empty".to_string(),
        });
    }

    if !config.use_tls {
        return Err(ConfigError::Validation {
            message: "TLS is required for IMAP connections".to_string(),
        });
    }

    if config.batch_size == 0 {
        return Err(ConfigError::Validation {
            message: "batchSize must be at least 1".to_string(),
        });
    }

    if config.fetch_timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "fetchTimeoutSecs must be at least 1".to_string(),
        });
    }

    if config.inbox.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "inbox folder name cannot be empty".to_string(),
        });
    }

    if config.keywords.iter().all(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation {
            message: "at least one subject keyword is required".to_string(),
        });
    }

    let auth = &config.auth;
    if !has_secret_source(
        auth.password_insecure.as_deref(),
        auth.password_file.as_deref(),
        auth.password_env_var.as_deref(),
    ) {
        return Err(ConfigError::Validation {
            message: "auth needs one of passwordInsecure, passwordFile or passwordEnvVar"
                .to_string(),
        });
    }

    Ok(())
}
