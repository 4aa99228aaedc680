//! Trade execution against marketplace listings.
//!
//! One [`Trader::execute`] call is one trade attempt:
//!
//! ```text
//! Idle -> ReadingDecimals -> ReadingAllowance -> [Approving ->] Executing   (actor sells)
//!                         \-> Executing                                     (actor buys)
//! ```
//!
//! Every attempt issues 0 or 1 approval transaction followed by at most
//! 1 trade transaction; the approval (if any) is confirmed strictly
//! before the trade is submitted. Failures are terminal for the attempt,
//! there is no retry and no rollback of anything already confirmed on
//! chain.

use std::sync::atomic::{AtomicBool, Ordering};

use alloy::primitives::TxHash;
use fastnum::UD256;
use tracing::{error, info};

use crate::{
    error::MarketError,
    gateway::PointsGateway,
    num,
    session::WalletSession,
    types::{AssetListing, ListingId, ListingStatus, TradeDirection},
};

/// Read phase a trade attempt failed in. Failures of the two transaction
/// phases carry their own [`TradeError`] variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TradePhase {
    ReadingDecimals,
    ReadingAllowance,
}

#[derive(Debug, thiserror::Error)]
pub enum TradeError {
    #[error("no wallet connected")]
    NoWallet,

    #[error("invalid listing: {0}")]
    InvalidListing(&'static str),

    #[error("listing {0} is not live: {1:?}")]
    NotLive(ListingId, ListingStatus),

    #[error("another trade attempt is in flight")]
    AttemptInFlight,

    #[error("chain read failed while {0:?}: {1}")]
    ChainRead(TradePhase, #[source] MarketError),

    #[error("approval transaction failed: {0}")]
    Approval(#[source] MarketError),

    #[error("trade transaction failed: {0}")]
    Trade(#[source] MarketError),
}

/// Outcome of a confirmed trade.
#[derive(Clone, derive_more::Debug)]
pub struct TradeReceipt {
    /// Hash of the confirmed trade transaction.
    pub tx_hash: TxHash,
    /// Allowance delta granted before the trade, in points, if the sell
    /// path had a shortfall.
    #[debug("{approved:?}")]
    pub approved: Option<UD256>,
}

type SuccessHook = Box<dyn Fn(&TradeReceipt) + Send + Sync>;
type ErrorHook = Box<dyn Fn(&TradeError) + Send + Sync>;

/// Optional caller callbacks invoked on attempt completion, the SDK
/// equivalent of the UI's success/error toasts.
#[derive(Default)]
pub struct TradeHooks {
    on_success: Option<SuccessHook>,
    on_error: Option<ErrorHook>,
}

impl TradeHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, hook: impl Fn(&TradeReceipt) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl Fn(&TradeError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }
}

/// Executes trades against listings through a [`PointsGateway`].
pub struct Trader<G> {
    gateway: G,
    in_flight: AtomicBool,
}

impl<G: PointsGateway> Trader<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Runs one trade attempt for `listing` on behalf of `session`.
    ///
    /// Rejects re-entrant submission while another attempt is in flight
    /// (the counterpart of the UI disabling the trade button). On
    /// completion invokes the matching hook and emits a notification.
    pub async fn execute(
        &self,
        session: &WalletSession,
        listing: &AssetListing,
        hooks: &TradeHooks,
    ) -> Result<TradeReceipt, TradeError> {
        if self.in_flight.swap(true, Ordering::Acquire) {
            return Err(TradeError::AttemptInFlight);
        }
        let result = self.attempt(session, listing).await;
        self.in_flight.store(false, Ordering::Release);

        match &result {
            Ok(receipt) => {
                info!(
                    listing_id = %listing.id(),
                    tx_hash = %receipt.tx_hash,
                    "trade executed successfully"
                );
                if let Some(hook) = &hooks.on_success {
                    hook(receipt);
                }
            }
            Err(err) => {
                error!(listing_id = %listing.id(), %err, "trade attempt failed");
                if let Some(hook) = &hooks.on_error {
                    hook(err);
                }
            }
        }
        result
    }

    async fn attempt(
        &self,
        session: &WalletSession,
        listing: &AssetListing,
    ) -> Result<TradeReceipt, TradeError> {
        if listing.amount().is_zero() {
            return Err(TradeError::InvalidListing("zero amount"));
        }
        if !listing.status().is_live() {
            return Err(TradeError::NotLive(listing.id(), listing.status()));
        }

        let decimals = self
            .gateway
            .point_decimals(listing.asset())
            .await
            .map_err(|e| TradeError::ChainRead(TradePhase::ReadingDecimals, e))?;
        let point_converter = num::Converter::new(decimals);

        // A BUY-type listing means the owner acquires points, so the actor
        // executing against it sells and must have granted the marketplace
        // an allowance covering the full amount.
        let mut approved = None;
        if listing.direction().actor_is_selling() {
            let owner = session.address().ok_or(TradeError::NoWallet)?;
            let allowance: UD256 = self
                .gateway
                .allowance(listing.asset(), owner)
                .await
                .map(|raw| point_converter.from_unsigned(raw))
                .map_err(|e| TradeError::ChainRead(TradePhase::ReadingAllowance, e))?;

            if allowance < listing.amount() {
                // Only the shortfall is granted; increaseAllowance stacks
                // it on top of what is already there.
                let delta = listing.amount() - allowance;
                info!(
                    listing_id = %listing.id(),
                    %allowance,
                    %delta,
                    "allowance short of listing amount, requesting approval"
                );
                self.gateway
                    .increase_allowance(listing.asset(), point_converter.to_unsigned(delta))
                    .await
                    .map_err(TradeError::Approval)?;
                approved = Some(delta);
            }
        }

        // The actor pays the listing's total price only when buying
        let value = match listing.direction() {
            TradeDirection::CounterpartyBuys => {
                Some(num::price_converter().to_unsigned(listing.total_price()))
            }
            TradeDirection::CounterpartySells => None,
        };

        let tx_hash = self
            .gateway
            .trade(
                listing.id(),
                point_converter.to_unsigned(listing.amount()),
                value,
            )
            .await
            .map_err(TradeError::Trade)?;

        Ok(TradeReceipt { tx_hash, approved })
    }
}
