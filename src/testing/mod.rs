//! Test utilities: a scripted chain gateway and listing builders.
//!
//! [`MockGateway`] stands in for [`crate::gateway::RpcGateway`] behind the
//! [`PointsGateway`] seam: chain reads come from scripted values,
//! transactions are recorded instead of sent, and any step can be forced
//! to fail. [`ListingBuilder`] produces [`AssetListing`] instances with
//! controlled values for trade-flow tests.

use std::{collections::HashMap, sync::Mutex};

use alloy::primitives::{Address, TxHash, U256};
use fastnum::UD256;

use crate::{
    error::{MarketError, RevertReason},
    gateway::PointsGateway,
    types::{AssetListing, ListingId, ListingStatus, TradeDirection},
};

/// Gateway step forced to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Failure {
    DecimalsRead,
    AllowanceRead,
    Approval,
    Trade,
}

/// Recorded allowance-increase transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApprovalCall {
    pub asset: Address,
    /// Added allowance, scaled to the asset's smallest unit.
    pub added: U256,
}

/// Recorded trade transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TradeCall {
    pub id: ListingId,
    /// Trade amount, scaled to the asset's smallest unit.
    pub amount: U256,
    /// Attached payment, scaled by 18 decimals.
    pub value: Option<U256>,
}

/// Scripted in-memory [`PointsGateway`].
#[derive(Debug, Default)]
pub struct MockGateway {
    marketplace: Address,
    decimals: HashMap<Address, u8>,
    // Allowances keep additive semantics: a recorded approval stacks on
    // top of the scripted value, keyed by (asset, owner)
    allowances: Mutex<HashMap<(Address, Address), U256>>,
    failure: Option<Failure>,
    approvals: Mutex<Vec<ApprovalCall>>,
    trades: Mutex<Vec<TradeCall>>,
}

impl MockGateway {
    pub fn new(marketplace: Address) -> Self {
        Self {
            marketplace,
            ..Self::default()
        }
    }

    /// Scripts the decimal precision of a point asset.
    pub fn with_decimals(mut self, asset: Address, decimals: u8) -> Self {
        self.decimals.insert(asset, decimals);
        self
    }

    /// Scripts the current allowance `owner` granted the marketplace for
    /// `asset`, in the asset's smallest unit.
    pub fn with_allowance(self, asset: Address, owner: Address, allowance: U256) -> Self {
        self.allowances
            .lock()
            .unwrap()
            .insert((asset, owner), allowance);
        self
    }

    /// Forces the given step to fail.
    pub fn with_failure(mut self, failure: Failure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Approval transactions recorded so far, in submission order.
    pub fn approvals(&self) -> Vec<ApprovalCall> {
        self.approvals.lock().unwrap().clone()
    }

    /// Trade transactions recorded so far, in submission order.
    pub fn trades(&self) -> Vec<TradeCall> {
        self.trades.lock().unwrap().clone()
    }

    fn fails_at(&self, step: Failure) -> bool {
        self.failure == Some(step)
    }
}

impl PointsGateway for MockGateway {
    fn marketplace(&self) -> Address {
        self.marketplace
    }

    async fn point_decimals(&self, asset: Address) -> Result<u8, MarketError> {
        if self.fails_at(Failure::DecimalsRead) {
            return Err(MarketError::Transport("injected decimals failure".to_string()));
        }
        self.decimals
            .get(&asset)
            .copied()
            .ok_or_else(|| MarketError::Fatal(format!("unknown asset: {asset}")))
    }

    async fn allowance(&self, asset: Address, owner: Address) -> Result<U256, MarketError> {
        if self.fails_at(Failure::AllowanceRead) {
            return Err(MarketError::Transport("injected allowance failure".to_string()));
        }
        Ok(self
            .allowances
            .lock()
            .unwrap()
            .get(&(asset, owner))
            .copied()
            .unwrap_or_default())
    }

    async fn increase_allowance(&self, asset: Address, added: U256) -> Result<TxHash, MarketError> {
        if self.fails_at(Failure::Approval) {
            return Err(MarketError::Reverted(Box::new(RevertReason::Unknown)));
        }
        self.approvals
            .lock()
            .unwrap()
            .push(ApprovalCall { asset, added });
        for ((granted_asset, _), allowance) in self.allowances.lock().unwrap().iter_mut() {
            if *granted_asset == asset {
                *allowance += added;
            }
        }
        Ok(TxHash::with_last_byte(1))
    }

    async fn trade(
        &self,
        id: ListingId,
        amount: U256,
        value: Option<U256>,
    ) -> Result<TxHash, MarketError> {
        if self.fails_at(Failure::Trade) {
            return Err(MarketError::Reverted(Box::new(RevertReason::Unknown)));
        }
        self.trades.lock().unwrap().push(TradeCall { id, amount, value });
        Ok(TxHash::with_last_byte(2))
    }
}

/// Builder for [`AssetListing`] instances with controlled values.
///
/// # Example
///
/// ```ignore
/// use points_market_sdk::{testing::ListingBuilder, types::TradeDirection};
/// use fastnum::udec256;
///
/// let listing = ListingBuilder::new()
///     .id(1)
///     .amount(udec256!(100))
///     .total_price(udec256!(50))
///     .direction(TradeDirection::CounterpartySells)
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct ListingBuilder {
    id: ListingId,
    asset: Address,
    amount: UD256,
    total_price: UD256,
    price_per_point: Option<UD256>,
    owner: Address,
    direction: TradeDirection,
    status: ListingStatus,
}

impl Default for ListingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingBuilder {
    pub fn new() -> Self {
        Self {
            id: 1,
            asset: Address::with_last_byte(0xaa),
            amount: UD256::ONE,
            total_price: UD256::ONE,
            price_per_point: None,
            owner: Address::with_last_byte(0xab),
            direction: TradeDirection::CounterpartyBuys,
            status: ListingStatus::Live,
        }
    }

    pub fn id(mut self, id: ListingId) -> Self {
        self.id = id;
        self
    }

    pub fn asset(mut self, asset: Address) -> Self {
        self.asset = asset;
        self
    }

    /// Point amount, in decimal form.
    pub fn amount(mut self, amount: UD256) -> Self {
        self.amount = amount;
        self
    }

    /// Total price in the payment currency, in decimal form.
    pub fn total_price(mut self, total_price: UD256) -> Self {
        self.total_price = total_price;
        self
    }

    /// Price of one point; derived from amount and total price when not
    /// set explicitly.
    pub fn price_per_point(mut self, price_per_point: UD256) -> Self {
        self.price_per_point = Some(price_per_point);
        self
    }

    pub fn owner(mut self, owner: Address) -> Self {
        self.owner = owner;
        self
    }

    pub fn direction(mut self, direction: TradeDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn status(mut self, status: ListingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> AssetListing {
        let price_per_point = self.price_per_point.unwrap_or_else(|| {
            if self.amount.is_zero() {
                UD256::ZERO
            } else {
                self.total_price / self.amount
            }
        });
        AssetListing::new(
            self.id,
            self.asset,
            self.amount,
            self.total_price,
            price_per_point,
            self.owner,
            self.direction,
            self.status,
        )
    }
}

/// Scales a whole-number amount into an asset's smallest unit.
pub fn scale(amount: u64, decimals: u8) -> U256 {
    U256::from(amount) * U256::from(10).pow(U256::from(decimals))
}
