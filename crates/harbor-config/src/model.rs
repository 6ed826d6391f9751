// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Harbor account service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Harbor configuration.
///
/// Loaded from `harbor.toml` with `HARBOR_*` environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HarborConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Persistence backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "harbor".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which persistence backend the database facade selects for entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Embedded relational files, one per logical entity.
    #[default]
    Sqlite,
    /// Networked document store with a shared connection.
    Mongo,
}

/// Persistence backend configuration.
///
/// Read once at database-facade construction; the backend choice is fixed
/// per entity at first access.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Backend selector flag.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory holding the per-entity relational files, relative to the
    /// process working directory unless absolute.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Connection string for the document backend.
    #[serde(default = "default_mongodb_url")]
    pub mongodb_url: String,

    /// Logical database name on the document backend.
    #[serde(default = "default_mongodb_database")]
    pub mongodb_database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
            mongodb_url: default_mongodb_url(),
            mongodb_database: default_mongodb_database(),
        }
    }
}

fn default_data_dir() -> String {
    "databases".to_string()
}

fn default_mongodb_url() -> String {
    "mongodb://127.0.0.1:27017".to_string()
}

fn default_mongodb_database() -> String {
    "harbor".to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Secret used to sign and verify session tokens. The gateway refuses
    /// to start without one.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Session token lifetime in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,

    /// When set, only this authenticated user may register new accounts.
    #[serde(default)]
    pub admin_username: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            jwt_secret: None,
            token_ttl_secs: default_token_ttl_secs(),
            admin_username: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_token_ttl_secs() -> u64 {
    7 * 24 * 3600
}
