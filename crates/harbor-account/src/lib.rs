// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account domain layer.
//!
//! Registration, authentication, and lookup over the `user_info` entity.
//! Persistence errors never cross this boundary untranslated: callers see
//! [`AccountError`] only.

pub mod error;
pub mod hash;
pub mod manager;
pub mod model;

pub use error::AccountError;
pub use manager::AccountManager;
pub use model::{CreateAccountParams, UserRecord};
