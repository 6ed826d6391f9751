// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declared schemas for Harbor's logical entities.
//!
//! Schemas are fixed at process start; the facade registers them at
//! construction.

use harbor_core::{Column, TableSchema};

/// Entity name for user accounts.
pub const USER_INFO: &str = "user_info";

/// Schema of the `user_info` entity.
pub fn user_info_schema() -> TableSchema {
    TableSchema::new(
        USER_INFO,
        [
            ("id", Column::string().primary_key()),
            ("name", Column::string()),
            ("email", Column::string().nullable()),
            ("username", Column::string()),
            ("password", Column::string()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_info_schema_shape() {
        let schema = user_info_schema();
        assert_eq!(schema.entity(), "user_info");
        assert_eq!(schema.primary_key().unwrap().0, "id");
        assert!(schema.column("email").unwrap().nullable);
        assert!(!schema.column("username").unwrap().nullable);
        assert_eq!(schema.columns().count(), 5);
    }
}
