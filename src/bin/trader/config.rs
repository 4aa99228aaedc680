//! Configuration for the trader CLI.
//!
//! Configuration comes from two sources:
//! - Environment variables (via .env file or shell): connection details, keys
//! - CLI arguments: which asset to browse and which listing to trade

use alloy::primitives::Address;
use clap::Parser;
use points_market_sdk::types::ListingId;

/// Environment configuration (connection details, credentials).
#[derive(Debug, serde::Deserialize)]
pub struct EnvConfig {
    /// Chain ID (e.g., 84532 for Base Sepolia)
    pub chain_id: u64,

    /// Marketplace contract address
    pub marketplace_address: String,

    /// Private key for signing transactions
    pub private_key: String,

    /// Block number when the marketplace was deployed
    pub deployed_at_block: u64,

    /// RPC URL for the node
    pub node_rpc_url: String,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Parse the marketplace address.
    pub fn marketplace_address(&self) -> Result<Address, alloy::primitives::hex::FromHexError> {
        self.marketplace_address.parse()
    }
}

/// CLI arguments.
#[derive(Debug, Parser)]
#[command(name = "trader")]
#[command(about = "Listing browser and trade runner for the points marketplace")]
pub struct CliConfig {
    /// Point token contract address to browse
    #[arg(long)]
    pub point: String,

    /// Listing ID to trade against; only lists the book when omitted
    #[arg(long)]
    pub listing_id: Option<ListingId>,

    /// Number of listings fetched per multicall batch
    #[arg(long, default_value = "500")]
    pub listings_per_batch: usize,

    /// Keep following marketplace events and refetch the book on activity
    #[arg(long)]
    pub watch: bool,
}

impl CliConfig {
    /// Parse and validate the point asset address.
    pub fn point_address(&self) -> Result<Address, ConfigError> {
        self.point
            .parse()
            .map_err(|_| ConfigError::InvalidPointAddress(self.point.clone()))
    }

    /// Validate batch sizing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listings_per_batch == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid point asset address: {0}")]
    InvalidPointAddress(String),

    #[error("listings_per_batch cannot be zero")]
    ZeroBatchSize,
}
