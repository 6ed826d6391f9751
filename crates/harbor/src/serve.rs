// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `serve` subcommand: wire storage, accounts, and the gateway, then
//! run until ctrl-c and drain the database on the way out.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use harbor_account::AccountManager;
use harbor_config::HarborConfig;
use harbor_db::Database;
use harbor_gateway::{GatewayState, TokenSigner};

#[derive(Debug, Error)]
pub enum ServeError {
    /// Tokens cannot be signed without a secret; refuse to start.
    #[error("gateway.jwt_secret must be configured to serve")]
    MissingJwtSecret,

    #[error(transparent)]
    Gateway(#[from] harbor_gateway::GatewayError),
}

pub async fn run(config: HarborConfig) -> Result<(), ServeError> {
    let secret = config
        .gateway
        .jwt_secret
        .clone()
        .ok_or(ServeError::MissingJwtSecret)?;

    let db = Arc::new(Database::new(config.storage.clone()));
    let state = GatewayState {
        accounts: Arc::new(AccountManager::new(db.clone(), &secret)),
        signer: Arc::new(TokenSigner::new(&secret, config.gateway.token_ttl_secs)),
        admin_username: config.gateway.admin_username.clone(),
    };

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    };
    harbor_gateway::serve(&config.gateway, state, shutdown).await?;

    if let Err(err) = db.shutdown().await {
        tracing::warn!(error = %err, "database shutdown reported an error");
    }
    info!("harbor stopped");
    Ok(())
}
