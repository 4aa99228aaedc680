//! Listing book: formatting, partitioning and snapshot fetch.
//!
//! [`BookBuilder`] captures a block-consistent snapshot of every listing
//! the marketplace holds for one point asset. The resulting
//! [`ListingBook`] partitions listings relative to the connected wallet
//! the way the marketplace UI presents them. There is no implicit cache:
//! refreshing after a mutation means running the builder again.

use std::ops::RangeInclusive;

use alloy::{
    eips::BlockId,
    primitives::{Address, U256},
    providers::Provider,
};
use itertools::Itertools;

use crate::{
    Chain,
    abi::{market::Marketplace, points::MonetPoints},
    error::MarketError,
    num,
    types::{AssetListing, ListingId, ListingParseError, ListingStatus, StateInstant},
};

/// Default number of listings to fetch via a single multicall.
const DEFAULT_LISTINGS_PER_BATCH: usize = 500;

/// Projects raw on-chain listings into decimal form.
///
/// Pure and non-mutating; `point_converter` carries the asset's decimal
/// precision, prices always use the fixed 18-decimal scale.
pub fn format_listings(
    raw: &[Marketplace::Listing],
    point_converter: num::Converter,
) -> Result<Vec<AssetListing>, ListingParseError> {
    raw.iter()
        .map(|listing| AssetListing::from_raw(listing, point_converter))
        .collect()
}

/// Block-consistent snapshot of one point asset's listings.
#[derive(Clone, Debug)]
pub struct ListingBook {
    asset: Address,
    name: String,
    symbol: String,
    decimals: u8,
    instant: StateInstant,
    listings: Vec<AssetListing>,
}

/// Listings partitioned relative to a wallet address, as the marketplace
/// page presents them. Cancelled listings of other wallets show up in
/// neither `live` nor `completed`.
#[derive(Debug, Default)]
pub struct BookView<'b> {
    /// Live listings owned by somebody else, open to trade against.
    pub live: Vec<&'b AssetListing>,
    /// Recently traded listings owned by somebody else.
    pub completed: Vec<&'b AssetListing>,
    /// Listings created by the wallet itself, in any status.
    pub owned: Vec<&'b AssetListing>,
}

impl ListingBook {
    pub fn asset(&self) -> Address {
        self.asset
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Decimal precision of the point asset.
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Converter for point amounts of this asset.
    pub fn point_converter(&self) -> num::Converter {
        num::Converter::new(self.decimals)
    }

    /// Instant the snapshot is consistent with.
    pub fn instant(&self) -> StateInstant {
        self.instant
    }

    pub fn listings(&self) -> &[AssetListing] {
        &self.listings
    }

    pub fn listing(&self, id: ListingId) -> Option<&AssetListing> {
        self.listings.iter().find(|l| l.id() == id)
    }

    /// Partitions the book relative to the connected wallet. With no
    /// wallet connected every listing is public.
    pub fn partition(&self, wallet: Option<Address>) -> BookView<'_> {
        let mut view = BookView::default();
        for listing in &self.listings {
            if Some(listing.owner()) == wallet {
                view.owned.push(listing);
                continue;
            }
            match listing.status() {
                ListingStatus::Live => view.live.push(listing),
                ListingStatus::Bought => view.completed.push(listing),
                ListingStatus::Cancelled => {}
            }
        }
        view
    }
}

/// Builds a [`ListingBook`] snapshot from on-chain state.
pub struct BookBuilder<P> {
    market: Marketplace::MarketplaceInstance<P>,
    provider: P,
    block_id: BlockId,
    listings_per_batch: usize,
}

impl<P: Provider + Clone> BookBuilder<P> {
    /// Creates a builder which fetches the book at the latest block.
    pub fn new(chain: &Chain, provider: P) -> Self {
        Self {
            market: Marketplace::new(chain.marketplace(), provider.clone()),
            provider,
            block_id: BlockId::Number(alloy::eips::BlockNumberOrTag::Latest),
            listings_per_batch: DEFAULT_LISTINGS_PER_BATCH,
        }
    }

    /// Sets the block number or tag to fetch the state at (default: latest).
    /// If tag is provided, it gets converted to a specific block number
    /// first to ensure state consistency.
    pub fn at_block(mut self, block: BlockId) -> Self {
        self.block_id = block;
        self
    }

    /// Sets the number of listings to fetch in a single multicall batch
    /// (default: 500). Use if default does not fit node/provider gas and
    /// response size limits.
    pub fn with_listings_per_batch(mut self, listings_per_batch: usize) -> Self {
        self.listings_per_batch = listings_per_batch;
        self
    }

    /// Fetches the book snapshot for one point asset.
    pub async fn build(mut self, asset: Address) -> Result<ListingBook, MarketError> {
        let instant = self.normalize_block().await?;

        let token = MonetPoints::new(asset, self.provider.clone());
        let (name_call, symbol_call, decimals_call, count_call) = (
            token.name().block(self.block_id),
            token.symbol().block(self.block_id),
            token.decimals().block(self.block_id),
            self.market.listingCount().block(self.block_id),
        );
        let (name, symbol, decimals, count) = futures::try_join!(
            name_call.call().into_future(),
            symbol_call.call().into_future(),
            decimals_call.call().into_future(),
            count_call.call().into_future(),
        )
        .map_err(MarketError::from)?;

        let raw = self.raw_listings(count).await?;
        let point_converter = num::Converter::new(decimals);
        let listings = format_listings(
            &raw.into_iter()
                .filter(|listing| listing.asset == asset)
                .collect::<Vec<_>>(),
            point_converter,
        )?;

        Ok(ListingBook {
            asset,
            name,
            symbol,
            decimals,
            instant,
            listings,
        })
    }

    async fn normalize_block(&mut self) -> Result<StateInstant, MarketError> {
        // Transform provided block ID to fixed number block ID and use it for
        // all calls to retrieve consistent state
        let block_header = self
            .provider
            .get_block(self.block_id)
            .await
            .map_err(MarketError::from)?
            .map(|b| b.into_header())
            .ok_or(MarketError::InvalidRequest("block not found".to_string()))?;
        self.block_id = BlockId::number(block_header.number);
        Ok(StateInstant::new(block_header.number, block_header.timestamp))
    }

    async fn raw_listings(&self, count: U256) -> Result<Vec<Marketplace::Listing>, MarketError> {
        let id_chunks = listing_ids(count)?.chunks(self.listings_per_batch);
        let batch_futs = id_chunks.into_iter().map(|chunk| {
            let multicall = self
                .provider
                .multicall()
                .block(self.block_id)
                .dynamic()
                .extend(chunk.map(|id| self.market.getListing(U256::from(id))));
            async move { multicall.aggregate().await }
        });

        Ok(futures::future::try_join_all(batch_futs)
            .await
            .map_err(MarketError::from)?
            .into_iter()
            .flatten()
            .collect())
    }
}

/// Listing IDs are assigned by the contract starting from 1 up to
/// `listingCount`. A count beyond 64 bits means ids the SDK cannot
/// represent, not a fetchable book.
fn listing_ids(count: U256) -> Result<RangeInclusive<u64>, ListingParseError> {
    let count = u64::try_from(count).map_err(|_| ListingParseError::IdOverflow(count))?;
    Ok(1..=count)
}
