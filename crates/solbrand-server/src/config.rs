//! Configuration for the SolBrand server
//!
//! This module contains the configuration types and loading functionality.

use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

use crate::error::{ServerError, ServerResult};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Mint address of the SOLB token
    #[serde(default = "default_mint_address")]
    pub mint_address: String,

    /// Identity of the mint authority, reported on status surfaces
    #[serde(default)]
    pub authority: Option<String>,

    /// Where the authority keypair lives on disk. The server never loads
    /// key material; RPC ledger backends refuse credits without a signer.
    #[serde(default = "default_keypair_path")]
    pub keypair_path: String,

    /// URL of the token ledger backend
    #[serde(default = "default_ledger_url")]
    pub ledger_url: String,

    /// URL of the workflow state store
    #[serde(default = "default_state_url")]
    pub state_url: String,

    /// Whole tokens issued per native currency unit
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: u64,

    /// Network label, feeds explorer links
    #[serde(default = "default_network")]
    pub network: String,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    3000
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_mint_address() -> String {
    "ENboCZvfVz8Rmp2LCixNpvcUZD2eLDci2x4Yjpj2v5HM".to_string()
}

fn default_keypair_path() -> String {
    "~/.config/solana/id.json".to_string()
}

fn default_ledger_url() -> String {
    "memory://devnet".to_string()
}

fn default_state_url() -> String {
    "memory://".to_string()
}

fn default_exchange_rate() -> u64 {
    1000 // 1 SOL buys 1000 SOLB
}

fn default_network() -> String {
    "devnet".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn load() -> ServerResult<Self> {
        // Start with defaults
        let mut config = Self::default();

        // Override from environment variables
        if let Ok(port) = env::var("SOLBRAND_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.port = port;
            } else {
                warn!("Invalid SOLBRAND_PORT value: {}", port);
            }
        }

        if let Ok(bind_address) = env::var("SOLBRAND_BIND_ADDRESS") {
            config.bind_address = bind_address;
        }

        if let Ok(mint_address) = env::var("SOLBRAND_MINT_ADDRESS") {
            config.mint_address = mint_address;
        }

        if let Ok(authority) = env::var("SOLBRAND_AUTHORITY") {
            config.authority = Some(authority);
        }

        if let Ok(keypair_path) = env::var("SOLANA_KEYPAIR_PATH") {
            config.keypair_path = keypair_path;
        }

        if let Ok(ledger_url) = env::var("SOLBRAND_LEDGER_URL") {
            config.ledger_url = ledger_url;
        }

        if let Ok(state_url) = env::var("SOLBRAND_STATE_URL") {
            config.state_url = state_url;
        }

        if let Ok(exchange_rate) = env::var("SOLBRAND_EXCHANGE_RATE") {
            if let Ok(rate) = exchange_rate.parse::<u64>() {
                config.exchange_rate = rate;
            } else {
                warn!("Invalid SOLBRAND_EXCHANGE_RATE value: {}", exchange_rate);
            }
        }

        if let Ok(network) = env::var("SOLBRAND_NETWORK") {
            config.network = network;
        }

        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.log_level = log_level;
        }

        // Validate required fields
        if config.mint_address.is_empty() {
            return Err(ServerError::ConfigError(
                "Mint address is required".to_string(),
            ));
        }

        if config.exchange_rate == 0 {
            return Err(ServerError::ConfigError(
                "Exchange rate must be at least 1".to_string(),
            ));
        }

        // Add warnings for missing optional fields
        if config.authority.is_none() {
            warn!("No SOLBRAND_AUTHORITY provided - status surfaces will report an unknown authority");
        }

        info!("Loaded server configuration");
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            mint_address: default_mint_address(),
            authority: None,
            keypair_path: default_keypair_path(),
            ledger_url: default_ledger_url(),
            state_url: default_state_url(),
            exchange_rate: default_exchange_rate(),
            network: default_network(),
            log_level: default_log_level(),
        }
    }
}
