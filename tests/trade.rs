use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use alloy::primitives::{Address, TxHash, U256};
use fastnum::udec256;
use points_market_sdk::{
    error::MarketError,
    gateway::PointsGateway,
    session::WalletSession,
    testing::{Failure, ListingBuilder, MockGateway, scale},
    trade::{TradeError, TradeHooks, Trader},
    types::{ListingId, ListingStatus, TradeDirection},
};
use tokio::sync::Notify;

const MARKETPLACE: Address = Address::with_last_byte(0x11);
const ASSET: Address = Address::with_last_byte(0xaa);
const WALLET: Address = Address::with_last_byte(0xcd);

const POINT_DECIMALS: u8 = 6;

fn gateway() -> MockGateway {
    MockGateway::new(MARKETPLACE).with_decimals(ASSET, POINT_DECIMALS)
}

fn sell_listing() -> ListingBuilder {
    // BUY-type listing: the owner acquires points, the executing actor sells
    ListingBuilder::new()
        .id(1)
        .asset(ASSET)
        .amount(udec256!(100))
        .total_price(udec256!(50))
        .direction(TradeDirection::CounterpartySells)
}

fn buy_listing() -> ListingBuilder {
    // SELL-type listing: the owner disposes of points, the executing actor
    // buys and pays the total price
    ListingBuilder::new()
        .id(2)
        .asset(ASSET)
        .amount(udec256!(100))
        .total_price(udec256!(50))
        .direction(TradeDirection::CounterpartyBuys)
}

/// The buy path attaches the listing's total price (18-decimal scaled) and
/// never touches allowances.
#[tokio::test]
async fn test_buy_path_attaches_total_price() {
    let trader = Trader::new(gateway());
    let session = WalletSession::connected(WALLET);

    let receipt = trader
        .execute(&session, &buy_listing().build(), &TradeHooks::new())
        .await
        .unwrap();

    assert_eq!(receipt.approved, None);
    assert!(trader.gateway().approvals().is_empty());

    let trades = trader.gateway().trades();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].id, 2);
    assert_eq!(trades[0].amount, scale(100, POINT_DECIMALS));
    assert_eq!(trades[0].value, Some(scale(50, 18)));
}

/// The sell path attaches no value.
#[tokio::test]
async fn test_sell_path_attaches_no_value() {
    let trader = Trader::new(gateway().with_allowance(ASSET, WALLET, scale(100, POINT_DECIMALS)));
    let session = WalletSession::connected(WALLET);

    trader
        .execute(&session, &sell_listing().build(), &TradeHooks::new())
        .await
        .unwrap();

    let trades = trader.gateway().trades();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].value, None);
}

/// A sufficient allowance means no approval transaction at all.
#[tokio::test]
async fn test_sell_path_with_sufficient_allowance_skips_approval() {
    let trader = Trader::new(gateway().with_allowance(ASSET, WALLET, scale(150, POINT_DECIMALS)));
    let session = WalletSession::connected(WALLET);

    let receipt = trader
        .execute(&session, &sell_listing().build(), &TradeHooks::new())
        .await
        .unwrap();

    assert_eq!(receipt.approved, None);
    assert!(trader.gateway().approvals().is_empty());
    assert_eq!(trader.gateway().trades().len(), 1);
}

/// A shortfall triggers exactly one approval for the delta, confirmed
/// before the single trade transaction. allowance 40 vs amount 100 -> 60.
#[tokio::test]
async fn test_sell_path_approves_exactly_the_shortfall() {
    let trader = Trader::new(gateway().with_allowance(ASSET, WALLET, scale(40, POINT_DECIMALS)));
    let session = WalletSession::connected(WALLET);

    let receipt = trader
        .execute(&session, &sell_listing().build(), &TradeHooks::new())
        .await
        .unwrap();

    assert_eq!(receipt.approved, Some(udec256!(60)));

    let approvals = trader.gateway().approvals();
    assert_eq!(approvals.len(), 1);
    assert_eq!(approvals[0].asset, ASSET);
    assert_eq!(approvals[0].added, scale(60, POINT_DECIMALS));

    let trades = trader.gateway().trades();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].amount, scale(100, POINT_DECIMALS));
}

/// A failed approval terminates the attempt; the trade is never sent.
#[tokio::test]
async fn test_failed_approval_never_trades() {
    let trader = Trader::new(
        gateway()
            .with_allowance(ASSET, WALLET, scale(40, POINT_DECIMALS))
            .with_failure(Failure::Approval),
    );
    let session = WalletSession::connected(WALLET);

    let err = trader
        .execute(&session, &sell_listing().build(), &TradeHooks::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::Approval(_)));
    assert!(trader.gateway().trades().is_empty());
}

/// A sell-path attempt without a wallet fails before any allowance read:
/// the injected allowance failure is never reached.
#[tokio::test]
async fn test_sell_path_without_wallet_fails_before_allowance_read() {
    let trader = Trader::new(gateway().with_failure(Failure::AllowanceRead));
    let session = WalletSession::disconnected();

    let err = trader
        .execute(&session, &sell_listing().build(), &TradeHooks::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::NoWallet));
    assert!(trader.gateway().trades().is_empty());
}

/// The decimals read is fatal to the attempt when it fails.
#[tokio::test]
async fn test_decimals_read_failure_is_fatal() {
    let trader = Trader::new(gateway().with_failure(Failure::DecimalsRead));
    let session = WalletSession::connected(WALLET);

    let err = trader
        .execute(&session, &buy_listing().build(), &TradeHooks::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::ChainRead(_, _)));
    assert!(trader.gateway().trades().is_empty());
}

/// A rejected trade transaction surfaces as TradeError::Trade; there is
/// no automatic retry.
#[tokio::test]
async fn test_trade_rejection_is_terminal() {
    let trader = Trader::new(gateway().with_failure(Failure::Trade));
    let session = WalletSession::connected(WALLET);

    let err = trader
        .execute(&session, &buy_listing().build(), &TradeHooks::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::Trade(_)));
    assert!(trader.gateway().trades().is_empty());
}

/// Non-live listings are rejected before any chain interaction.
#[tokio::test]
async fn test_non_live_listing_is_rejected() {
    let trader = Trader::new(gateway().with_failure(Failure::DecimalsRead));
    let session = WalletSession::connected(WALLET);

    let listing = buy_listing().status(ListingStatus::Bought).build();
    let err = trader
        .execute(&session, &listing, &TradeHooks::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::NotLive(2, ListingStatus::Bought)));
}

/// Zero-amount listings are invalid input.
#[tokio::test]
async fn test_zero_amount_listing_is_rejected() {
    let trader = Trader::new(gateway());
    let session = WalletSession::connected(WALLET);

    let listing = buy_listing().amount(udec256!(0)).build();
    let err = trader
        .execute(&session, &listing, &TradeHooks::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::InvalidListing(_)));
}

/// Fractional amounts scale exactly to the asset's smallest unit.
#[tokio::test]
async fn test_fractional_amount_scales_exactly() {
    let trader = Trader::new(gateway());
    let session = WalletSession::connected(WALLET);

    let listing = buy_listing().amount(udec256!(0.0001)).build();
    trader
        .execute(&session, &listing, &TradeHooks::new())
        .await
        .unwrap();

    // 0.0001 points with 6 decimals -> 100 base units
    assert_eq!(trader.gateway().trades()[0].amount, U256::from(100u8));
}

/// Gateway whose decimals read blocks until released, holding one trade
/// attempt in flight.
struct StallingGateway {
    inner: MockGateway,
    started: Arc<Notify>,
    release: Arc<Notify>,
}

impl PointsGateway for StallingGateway {
    fn marketplace(&self) -> Address {
        self.inner.marketplace()
    }

    async fn point_decimals(&self, asset: Address) -> Result<u8, MarketError> {
        self.started.notify_one();
        self.release.notified().await;
        self.inner.point_decimals(asset).await
    }

    async fn allowance(&self, asset: Address, owner: Address) -> Result<U256, MarketError> {
        self.inner.allowance(asset, owner).await
    }

    async fn increase_allowance(&self, asset: Address, added: U256) -> Result<TxHash, MarketError> {
        self.inner.increase_allowance(asset, added).await
    }

    async fn trade(
        &self,
        id: ListingId,
        amount: U256,
        value: Option<U256>,
    ) -> Result<TxHash, MarketError> {
        self.inner.trade(id, amount, value).await
    }
}

/// A second submission while an attempt is in flight is rejected without
/// touching the chain; the stalled attempt still completes.
#[tokio::test]
async fn test_reentrant_submission_is_rejected() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let trader = Arc::new(Trader::new(StallingGateway {
        inner: gateway(),
        started: started.clone(),
        release: release.clone(),
    }));
    let session = WalletSession::connected(WALLET);

    let first = tokio::spawn({
        let trader = trader.clone();
        let session = session.clone();
        async move {
            trader
                .execute(&session, &buy_listing().build(), &TradeHooks::new())
                .await
        }
    });
    started.notified().await;

    let err = trader
        .execute(&session, &buy_listing().build(), &TradeHooks::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TradeError::AttemptInFlight));
    assert!(trader.gateway().inner.trades().is_empty());

    release.notify_one();
    first.await.unwrap().unwrap();
    assert_eq!(trader.gateway().inner.trades().len(), 1);
}

/// Success and error hooks fire on the matching outcomes.
#[tokio::test]
async fn test_hooks_fire_on_completion() {
    let successes = Arc::new(AtomicUsize::new(0));
    let errors = Arc::new(AtomicUsize::new(0));
    let hooks = TradeHooks::new()
        .on_success({
            let successes = successes.clone();
            move |_receipt| {
                successes.fetch_add(1, Ordering::SeqCst);
            }
        })
        .on_error({
            let errors = errors.clone();
            move |_err| {
                errors.fetch_add(1, Ordering::SeqCst);
            }
        });

    let session = WalletSession::connected(WALLET);

    let trader = Trader::new(gateway());
    trader
        .execute(&session, &buy_listing().build(), &hooks)
        .await
        .unwrap();
    assert_eq!(successes.load(Ordering::SeqCst), 1);
    assert_eq!(errors.load(Ordering::SeqCst), 0);

    let trader = Trader::new(gateway().with_failure(Failure::Trade));
    let _ = trader
        .execute(&session, &buy_listing().build(), &hooks)
        .await;
    assert_eq!(successes.load(Ordering::SeqCst), 1);
    assert_eq!(errors.load(Ordering::SeqCst), 1);
}
