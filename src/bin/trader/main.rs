//! Trader CLI for the points marketplace.
//!
//! Fetches the listing book for a point asset, prints it partitioned
//! relative to the signing wallet, and optionally executes a trade
//! against one listing. With `--watch` it keeps following marketplace
//! events and refetches the book whenever listings change.

mod config;
mod error;

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::{DynProvider, ProviderBuilder},
    rpc::client::RpcClient,
    signers::local::PrivateKeySigner,
};
use clap::Parser;
use futures::StreamExt;
use points_market_sdk::{
    Chain,
    book::{BookBuilder, BookView, ListingBook},
    gateway::RpcGateway,
    session::WalletSession,
    stream,
    trade::{TradeHooks, Trader},
    types::StateInstant,
};
use std::process::exit;
use tracing::{error, info};
use url::Url;

use config::{CliConfig, EnvConfig};
use error::{Error, Result};

#[tokio::main]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    // Parse environment configuration
    let env_config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to parse environment configuration: {}", e);
            exit(1);
        }
    };

    // Parse CLI arguments
    let cli_config = CliConfig::parse();
    if let Err(e) = cli_config.validate() {
        eprintln!("Invalid configuration: {}", e);
        exit(1);
    }

    // Set up logging
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run(env_config, cli_config).await {
        error!(%e, "Trader CLI failed");
        exit(1);
    }
}

async fn run(env_config: EnvConfig, cli_config: CliConfig) -> Result<()> {
    let point = cli_config.point_address()?;
    let marketplace: Address = env_config.marketplace_address()?;
    let private_key: PrivateKeySigner = env_config.private_key.parse()?;
    let node_url = Url::parse(&env_config.node_rpc_url)?;

    let wallet_address = private_key.address();
    let wallet = EthereumWallet::new(private_key);
    let session = WalletSession::connected(wallet_address);

    info!(
        %wallet_address,
        %point,
        %marketplace,
        "Initializing trader"
    );

    let rpc_client = RpcClient::new_http(node_url);
    let provider = DynProvider::new(
        ProviderBuilder::new()
            .wallet(wallet)
            .connect_client(rpc_client),
    );

    let chain = Chain::custom(env_config.chain_id, marketplace, env_config.deployed_at_block);

    let mut book = fetch_book(&chain, provider.clone(), point, &cli_config).await?;
    print_book(&book, &session);

    if let Some(listing_id) = cli_config.listing_id {
        let listing = book
            .listing(listing_id)
            .ok_or(Error::ListingNotFound(listing_id))?;

        let trader = Trader::new(RpcGateway::new(&chain, provider.clone()));
        let hooks = TradeHooks::new();
        let receipt = trader.execute(&session, listing, &hooks).await?;
        info!(
            %listing_id,
            tx_hash = %receipt.tx_hash,
            approved = ?receipt.approved,
            "Trade confirmed"
        );

        // Refetch instead of trusting any stale view of the book
        book = fetch_book(&chain, provider.clone(), point, &cli_config).await?;
        print_book(&book, &session);
    }

    if !cli_config.watch {
        return Ok(());
    }

    info!("Watching marketplace events (Ctrl+C to stop)");
    let mut events = Box::pin(stream::raw(
        &chain,
        provider.clone(),
        StateInstant::new(book.instant().block_number() + 1, 0),
        tokio::time::sleep,
    ));
    while let Some(result) = events.next().await {
        let block = result?;
        if block.events().is_empty() {
            continue;
        }
        info!(
            block = block.instant().block_number(),
            count = block.events().len(),
            "Marketplace activity, refetching book"
        );
        book = fetch_book(&chain, provider.clone(), point, &cli_config).await?;
        print_book(&book, &session);
    }

    Ok(())
}

async fn fetch_book(
    chain: &Chain,
    provider: DynProvider,
    point: Address,
    cli_config: &CliConfig,
) -> Result<ListingBook> {
    let book = BookBuilder::new(chain, provider)
        .with_listings_per_batch(cli_config.listings_per_batch)
        .build(point)
        .await?;
    Ok(book)
}

fn print_book(book: &ListingBook, session: &WalletSession) {
    let BookView {
        live,
        completed,
        owned,
    } = book.partition(session.address());

    info!(
        asset = %book.asset(),
        name = book.name(),
        symbol = book.symbol(),
        decimals = book.decimals(),
        block = book.instant().block_number(),
        "Fetched listing book"
    );

    for listing in &live {
        info!(
            id = %listing.id(),
            amount = %listing.amount(),
            total_price = %listing.total_price(),
            price_per_point = %listing.price_per_point(),
            direction = ?listing.direction(),
            owner = %listing.owner(),
            "live listing"
        );
    }
    for listing in &completed {
        info!(id = %listing.id(), amount = %listing.amount(), "completed listing");
    }
    for listing in &owned {
        info!(
            id = %listing.id(),
            amount = %listing.amount(),
            status = ?listing.status(),
            "own listing"
        );
    }
}
