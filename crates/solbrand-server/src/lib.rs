//!
//! SolBrand Server - HTTP API server for the SolBrand platform
//!
//! This module exports all the components of the SolBrand server.

// External dependencies
use std::sync::Arc;

use solbrand_core::{ActivityRepository, TokenLedger, WorkflowRepository};
use solbrand_ledger::{InMemoryTokenLedger, RpcTokenLedger};
use solbrand_state_file::FileStateProvider;
use solbrand_state_inmemory::InMemoryStateProvider;

/// API module
pub mod api;

/// Configuration module
pub mod config;

/// Error module
pub mod error;

/// Server module
pub mod server;

// Re-export key types
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::SolBrandServer;

/// Run function
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    // Initialize logging
    init_logging(&config);

    // Create dependencies
    let ledger = create_token_ledger(&config)?;
    let (workflow_repo, activity_repo) = create_state_store(&config)?;

    // Create server
    let server = SolBrandServer::new(config, ledger, workflow_repo, activity_repo);

    // Run server
    server.run().await
}

/// Initialize logging
fn init_logging(config: &ServerConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    // Create filter based on config
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // Initialize subscriber
    fmt().with_env_filter(filter).with_target(true).init();
}

/// Create the token ledger backend selected by the configured URL
pub fn create_token_ledger(config: &ServerConfig) -> ServerResult<Arc<dyn TokenLedger>> {
    let authority = config
        .authority
        .clone()
        .unwrap_or_else(|| "unknown".to_string());

    if let Some(network) = config.ledger_url.strip_prefix("memory://") {
        // Use the in-memory ledger for development and testing
        let network = if network.is_empty() {
            config.network.as_str()
        } else {
            network
        };
        tracing::info!("Using in-memory token ledger on network {}", network);
        let ledger = InMemoryTokenLedger::new(&config.mint_address, authority, network);
        Ok(Arc::new(ledger))
    } else if config.ledger_url.starts_with("http://") || config.ledger_url.starts_with("https://")
    {
        tracing::info!("Using JSON-RPC token ledger at {}", config.ledger_url);
        tracing::info!(
            "Authority keypair at {} is not loaded; credits are disabled over RPC",
            config.keypair_path
        );
        let ledger = RpcTokenLedger::new(
            &config.ledger_url,
            &config.mint_address,
            authority,
            &config.network,
        );
        Ok(Arc::new(ledger))
    } else {
        Err(ServerError::ConfigError(format!(
            "Unsupported ledger URL: {}",
            config.ledger_url
        )))
    }
}

/// Create the workflow state store selected by the configured URL
pub fn create_state_store(
    config: &ServerConfig,
) -> ServerResult<(Arc<dyn WorkflowRepository>, Arc<dyn ActivityRepository>)> {
    if config.state_url.starts_with("memory://") {
        // Use in-memory state for development and testing
        tracing::info!("Using in-memory state store");
        let provider = InMemoryStateProvider::new();
        Ok(provider.create_repositories())
    } else if let Some(state_dir) = config.state_url.strip_prefix("file://") {
        if state_dir.is_empty() {
            return Err(ServerError::ConfigError(
                "file:// state URL needs a directory path".to_string(),
            ));
        }
        tracing::info!("Using file state store at {}", state_dir);
        let provider = FileStateProvider::new(state_dir);
        Ok(provider.create_repositories())
    } else {
        Err(ServerError::ConfigError(format!(
            "Unsupported state URL: {}",
            config.state_url
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_token_ledger_memory_scheme() {
        let config = ServerConfig {
            ledger_url: "memory://testnet".to_string(),
            authority: Some("authority-1".to_string()),
            ..ServerConfig::default()
        };
        let ledger = create_token_ledger(&config).unwrap();
        let info = ledger.info();
        assert_eq!(info.network, "testnet");
        assert_eq!(info.authority, "authority-1");
        assert!(info.debit_ready);
        assert!(info.credit_ready);
    }

    #[test]
    fn test_create_token_ledger_memory_scheme_falls_back_to_network() {
        let config = ServerConfig {
            ledger_url: "memory://".to_string(),
            ..ServerConfig::default()
        };
        let ledger = create_token_ledger(&config).unwrap();
        assert_eq!(ledger.info().network, "devnet");
    }

    #[test]
    fn test_create_token_ledger_rpc_scheme_cannot_credit() {
        let config = ServerConfig {
            ledger_url: "https://api.devnet.solana.com".to_string(),
            ..ServerConfig::default()
        };
        let ledger = create_token_ledger(&config).unwrap();
        let info = ledger.info();
        assert!(info.debit_ready);
        assert!(!info.credit_ready);
    }

    #[test]
    fn test_create_token_ledger_rejects_unknown_scheme() {
        let config = ServerConfig {
            ledger_url: "redis://localhost".to_string(),
            ..ServerConfig::default()
        };
        let err = create_token_ledger(&config).err().unwrap();
        assert!(matches!(err, ServerError::ConfigError(_)));
    }

    #[test]
    fn test_create_state_store_schemes() {
        let config = ServerConfig::default();
        assert!(create_state_store(&config).is_ok());

        let config = ServerConfig {
            state_url: "file://".to_string(),
            ..ServerConfig::default()
        };
        assert!(create_state_store(&config).is_err());

        let config = ServerConfig {
            state_url: "postgres://localhost".to_string(),
            ..ServerConfig::default()
        };
        assert!(create_state_store(&config).is_err());
    }
}
