//! Points marketplace SDK.
//!
//! # Overview
//!
//! Client-side building blocks for a peer-to-peer marketplace trading
//! company loyalty points against the chain's payment currency.
//!
//! Use [`book::BookBuilder`] to fetch a block-consistent snapshot of a
//! point asset's listings and [`book::ListingBook::partition`] to split
//! them into live/completed/owned views relative to the connected wallet.
//!
//! Use [`trade::Trader`] with a [`gateway::RpcGateway`] to execute a trade
//! against a listing; the sell path tops up the marketplace allowance
//! before the trade transaction goes out.
//!
//! Use [`stream::raw`] to follow marketplace events and refetch books when
//! listings change.
//!
//! See `./tests` for examples.
//!
//! # Testing
//!
//! [`testing`] provides a scripted [`testing::MockGateway`] standing in
//! for the chain behind the [`gateway::PointsGateway`] seam, plus builders
//! for listings under test.

pub mod abi;
pub mod book;
pub mod error;
pub mod gateway;
pub mod num;
pub mod session;
pub mod stream;
pub mod testing;
pub mod trade;
pub mod types;

use alloy::primitives::{Address, address};

/// Chain the marketplace is operating on.
#[derive(Clone, Debug)]
pub struct Chain {
    chain_id: u64,
    marketplace: Address,
    deployed_at_block: u64,
}

impl Chain {
    /// Base Sepolia deployment.
    pub fn base_sepolia() -> Self {
        Self {
            chain_id: 84532,
            marketplace: address!("0x5d3c5e1a2b8fb3d2d129f1902cf1e16e2a2f6fd4"),
            deployed_at_block: 8_471_220,
        }
    }

    pub fn custom(chain_id: u64, marketplace: Address, deployed_at_block: u64) -> Self {
        Self {
            chain_id,
            marketplace,
            deployed_at_block,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Marketplace contract address.
    pub fn marketplace(&self) -> Address {
        self.marketplace
    }

    pub fn deployed_at_block(&self) -> u64 {
        self.deployed_at_block
    }
}
