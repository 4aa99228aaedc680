//! Chain gateway: the seam between the trade orchestrator and the wallet
//! provider/contract instances.
//!
//! [`Trader`](crate::trade::Trader) only ever talks to [`PointsGateway`];
//! [`RpcGateway`] is the production implementation backed by an alloy
//! [`Provider`] with a signing wallet attached, while tests substitute
//! [`crate::testing::MockGateway`].

use alloy::{
    primitives::{Address, TxHash, U256},
    providers::Provider,
};
use tracing::debug;

use crate::{
    Chain,
    abi::{market::Marketplace, points::MonetPoints},
    error::{MarketError, RevertReason},
    types::ListingId,
};

/// Chain-side primitives consumed by the trade flow. The spender of every
/// allowance operation is the marketplace contract itself.
#[allow(async_fn_in_trait)]
pub trait PointsGateway {
    /// Marketplace contract address (listing registry and allowance
    /// spender).
    fn marketplace(&self) -> Address;

    /// Reads the decimal precision of a point token.
    async fn point_decimals(&self, asset: Address) -> Result<u8, MarketError>;

    /// Reads the live allowance `owner` has granted the marketplace for
    /// `asset`. Always a fresh chain read, never cached.
    async fn allowance(&self, asset: Address, owner: Address) -> Result<U256, MarketError>;

    /// Grants the marketplace an additional `added` units of `asset` on
    /// top of the current allowance and waits for confirmation.
    async fn increase_allowance(&self, asset: Address, added: U256) -> Result<TxHash, MarketError>;

    /// Submits the trade transaction for a listing and waits for
    /// confirmation. `value` is attached payment currency, present only
    /// when the executing actor is buying points.
    async fn trade(
        &self,
        id: ListingId,
        amount: U256,
        value: Option<U256>,
    ) -> Result<TxHash, MarketError>;
}

/// [`PointsGateway`] backed by an RPC provider with a signing wallet.
#[derive(Clone, Debug)]
pub struct RpcGateway<P> {
    market: Marketplace::MarketplaceInstance<P>,
    provider: P,
}

impl<P: Provider + Clone> RpcGateway<P> {
    pub fn new(chain: &Chain, provider: P) -> Self {
        Self {
            market: Marketplace::new(chain.marketplace(), provider.clone()),
            provider,
        }
    }
}

impl<P: Provider + Clone> PointsGateway for RpcGateway<P> {
    fn marketplace(&self) -> Address {
        *self.market.address()
    }

    async fn point_decimals(&self, asset: Address) -> Result<u8, MarketError> {
        MonetPoints::new(asset, self.provider.clone())
            .decimals()
            .call()
            .await
            .map_err(MarketError::from)
    }

    async fn allowance(&self, asset: Address, owner: Address) -> Result<U256, MarketError> {
        MonetPoints::new(asset, self.provider.clone())
            .allowance(owner, self.marketplace())
            .call()
            .await
            .map_err(MarketError::from)
    }

    async fn increase_allowance(&self, asset: Address, added: U256) -> Result<TxHash, MarketError> {
        let receipt = MonetPoints::new(asset, self.provider.clone())
            .increaseAllowance(self.marketplace(), added)
            .send()
            .await
            .map_err(MarketError::from)?
            .get_receipt()
            .await
            .map_err(MarketError::from)?;
        debug!(%asset, %added, tx_hash = %receipt.transaction_hash, "allowance increased");
        if !receipt.status() {
            return Err(MarketError::Reverted(Box::new(RevertReason::Unknown)));
        }
        Ok(receipt.transaction_hash)
    }

    async fn trade(
        &self,
        id: ListingId,
        amount: U256,
        value: Option<U256>,
    ) -> Result<TxHash, MarketError> {
        let mut call = self.market.trade(U256::from(id), amount);
        if let Some(value) = value {
            call = call.value(value);
        }
        let receipt = call
            .send()
            .await
            .map_err(MarketError::from)?
            .get_receipt()
            .await
            .map_err(MarketError::from)?;
        debug!(listing_id = %id, %amount, tx_hash = %receipt.transaction_hash, "trade submitted");
        if !receipt.status() {
            return Err(MarketError::Reverted(Box::new(RevertReason::Unknown)));
        }
        Ok(receipt.transaction_hash)
    }
}
