// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order: compiled defaults, then `~/.config/harbor/harbor.toml`,
//! then `./harbor.toml`, then `HARBOR_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::HarborConfig;

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<HarborConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HarborConfig::default()))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("harbor/harbor.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("harbor.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from an inline TOML string only (no file lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<HarborConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HarborConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HarborConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HarborConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `HARBOR_STORAGE_DATA_DIR` must map to
/// `storage.data_dir`, not `storage.data.dir`.
fn env_provider() -> Env {
    Env::prefixed("HARBOR_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("service_", "service.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}
