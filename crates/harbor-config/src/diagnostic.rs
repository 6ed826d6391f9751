// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config error diagnostics rendered through miette.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error suitable for diagnostic rendering.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A TOML/env deserialization failure reported by Figment.
    #[error("configuration error: {message}")]
    #[diagnostic(
        code(harbor::config::parse),
        help("check harbor.toml and HARBOR_* environment variables")
    )]
    Parse {
        /// Figment's description of the failure, including the offending key.
        message: String,
    },

    /// A semantic validation failure for a parsed value.
    #[error("validation error: {message}")]
    #[diagnostic(code(harbor::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },
}

/// Convert a Figment error (which may aggregate several failures) into one
/// [`ConfigError`] per underlying failure.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| ConfigError::Parse {
            message: e.to_string(),
        })
        .collect()
}

/// Render collected config errors to stderr as miette reports.
pub fn render_errors(errors: Vec<ConfigError>) {
    for error in errors {
        let report = miette::Report::new(error);
        eprintln!("{report:?}");
    }
}
