//! Error types for the trader CLI.

use points_market_sdk::{error::MarketError, trade::TradeError, types::ListingId};

use crate::config::ConfigError;

/// Main error type for the trader CLI.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Environment configuration error: {0}")]
    EnvConfig(#[from] envy::Error),

    #[error("Alloy signer error: {0}")]
    AlloySigner(#[from] alloy::signers::local::LocalSignerError),

    #[error("Market error: {0}")]
    Market(#[from] MarketError),

    #[error("Trade error: {0}")]
    Trade(#[from] TradeError),

    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(#[from] url::ParseError),

    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] alloy::primitives::hex::FromHexError),

    #[error("Listing {0} not found in the fetched book")]
    ListingNotFound(ListingId),
}

pub type Result<T> = std::result::Result<T, Error>;
