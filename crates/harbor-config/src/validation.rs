// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and plausible bind addresses.

use crate::diagnostic::ConfigError;
use crate::model::{HarborConfig, StorageBackend};

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects all validation errors instead of failing fast.
pub fn validate_config(config: &HarborConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.data_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.data_dir must not be empty".to_string(),
        });
    }

    if config.storage.backend == StorageBackend::Mongo {
        let url = config.storage.mongodb_url.trim();
        if !url.starts_with("mongodb://") && !url.starts_with("mongodb+srv://") {
            errors.push(ConfigError::Validation {
                message: format!(
                    "storage.mongodb_url must start with mongodb:// or mongodb+srv://, got `{url}`"
                ),
            });
        }
        if config.storage.mongodb_database.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "storage.mongodb_database must not be empty".to_string(),
            });
        }
    }

    if let Some(secret) = &config.gateway.jwt_secret {
        if secret.len() < 16 {
            errors.push(ConfigError::Validation {
                message: "gateway.jwt_secret must be at least 16 bytes".to_string(),
            });
        }
    }

    if config.gateway.token_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "gateway.token_ttl_secs must be positive".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = HarborConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_data_dir_fails_validation() {
        let mut config = HarborConfig::default();
        config.storage.data_dir = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("data_dir"))
        ));
    }

    #[test]
    fn mongo_backend_requires_mongodb_url_scheme() {
        let mut config = HarborConfig::default();
        config.storage.backend = StorageBackend::Mongo;
        config.storage.mongodb_url = "http://wrong".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("mongodb_url"))
        ));
    }

    #[test]
    fn short_jwt_secret_fails_validation() {
        let mut config = HarborConfig::default();
        config.gateway.jwt_secret = Some("short".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("jwt_secret"))
        ));
    }

    #[test]
    fn sqlite_backend_ignores_mongo_settings() {
        let mut config = HarborConfig::default();
        config.storage.mongodb_url = "not-a-url".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
