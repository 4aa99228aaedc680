use alloy::primitives::{Address, U256};
use fastnum::UD256;

use crate::{abi::market::Marketplace, num};

use super::ListingId;

/// Raw `listingType` discriminant of a listing the owner created to
/// acquire points.
const LISTING_TYPE_BUY: u8 = 0;
/// Raw `listingType` discriminant of a listing the owner created to
/// dispose of points.
const LISTING_TYPE_SELL: u8 = 1;

const STATUS_LIVE: u8 = 0;
const STATUS_BOUGHT: u8 = 1;
const STATUS_CANCELLED: u8 = 2;

/// Listing lifecycle state. `Live` is initial; `Bought` and `Cancelled`
/// are terminal and asserted solely by the marketplace contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListingStatus {
    Live,
    Bought,
    Cancelled,
}

impl ListingStatus {
    pub(crate) fn from_raw(raw: u8) -> Result<Self, ListingParseError> {
        match raw {
            STATUS_LIVE => Ok(Self::Live),
            STATUS_BOUGHT => Ok(Self::Bought),
            STATUS_CANCELLED => Ok(Self::Cancelled),
            other => Err(ListingParseError::UnknownStatus(other)),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

/// What the actor executing against a listing does, named from the
/// counterparty's point of view to avoid the BUY/SELL inversion trap:
/// a BUY-type listing means the owner acquires points, so the
/// counterparty executing the trade sells them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TradeDirection {
    /// Raw SELL listing: the owner disposes of points, the executing
    /// actor buys them and pays the listing's total price.
    CounterpartyBuys,
    /// Raw BUY listing: the owner acquires points, the executing actor
    /// sells them and needs a marketplace allowance.
    CounterpartySells,
}

impl TradeDirection {
    pub(crate) fn from_raw(raw: u8) -> Result<Self, ListingParseError> {
        match raw {
            LISTING_TYPE_BUY => Ok(Self::CounterpartySells),
            LISTING_TYPE_SELL => Ok(Self::CounterpartyBuys),
            other => Err(ListingParseError::UnknownListingType(other)),
        }
    }

    /// True when the executing actor is the one handing over points.
    pub fn actor_is_selling(&self) -> bool {
        matches!(self, Self::CounterpartySells)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListingParseError {
    #[error("listing id {0} does not fit into 64 bits")]
    IdOverflow(U256),

    #[error("unknown listing type discriminant: {0}")]
    UnknownListingType(u8),

    #[error("unknown listing status discriminant: {0}")]
    UnknownStatus(u8),
}

/// One marketplace offer, projected into exact decimal form.
///
/// `amount` is denominated in points (scaled by the asset's decimals on
/// chain), `total_price` and `price_per_point` in the payment currency
/// (scaled by [`num::PRICE_DECIMALS`] on chain).
#[derive(Clone, derive_more::Debug, PartialEq)]
pub struct AssetListing {
    id: ListingId,
    asset: Address,
    #[debug("{amount}")]
    amount: UD256,
    #[debug("{total_price}")]
    total_price: UD256,
    #[debug("{price_per_point}")]
    price_per_point: UD256,
    owner: Address,
    direction: TradeDirection,
    status: ListingStatus,
}

impl AssetListing {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: ListingId,
        asset: Address,
        amount: UD256,
        total_price: UD256,
        price_per_point: UD256,
        owner: Address,
        direction: TradeDirection,
        status: ListingStatus,
    ) -> Self {
        Self {
            id,
            asset,
            amount,
            total_price,
            price_per_point,
            owner,
            direction,
            status,
        }
    }

    /// Projects a raw on-chain listing into decimal form. Pure; the raw
    /// listing is left untouched.
    pub fn from_raw(
        raw: &Marketplace::Listing,
        point_converter: num::Converter,
    ) -> Result<Self, ListingParseError> {
        let price_converter = num::price_converter();
        Ok(Self {
            id: u64::try_from(raw.id).map_err(|_| ListingParseError::IdOverflow(raw.id))?,
            asset: raw.asset,
            amount: point_converter.from_unsigned(raw.amount),
            total_price: price_converter.from_unsigned(raw.totalPrice),
            price_per_point: price_converter.from_unsigned(raw.pricePerPoint),
            owner: raw.owner,
            direction: TradeDirection::from_raw(raw.listingType)?,
            status: ListingStatus::from_raw(raw.status)?,
        })
    }

    pub fn id(&self) -> ListingId {
        self.id
    }

    pub fn asset(&self) -> Address {
        self.asset
    }

    /// Quantity of points on offer, in human-readable decimal form.
    pub fn amount(&self) -> UD256 {
        self.amount
    }

    /// Value of the whole listing in the payment currency.
    pub fn total_price(&self) -> UD256 {
        self.total_price
    }

    pub fn price_per_point(&self) -> UD256 {
        self.price_per_point
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn direction(&self) -> TradeDirection {
        self.direction
    }

    pub fn status(&self) -> ListingStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use fastnum::udec256;

    use super::*;

    fn raw_listing() -> Marketplace::Listing {
        Marketplace::Listing {
            id: U256::from(1u8),
            asset: address!("0x00000000000000000000000000000000000000aa"),
            amount: U256::from(100u8),
            totalPrice: U256::from(50u8) * U256::from(10u8).pow(U256::from(18u8)),
            pricePerPoint: U256::from(5u8) * U256::from(10u8).pow(U256::from(17u8)),
            owner: address!("0x00000000000000000000000000000000000000ab"),
            listingType: LISTING_TYPE_BUY,
            status: STATUS_LIVE,
        }
    }

    #[test]
    fn test_from_raw_scales_amount_by_asset_decimals() {
        // amount = 100 with 6 decimals -> 0.0001 points
        let listing = AssetListing::from_raw(&raw_listing(), num::Converter::new(6)).unwrap();
        assert_eq!(listing.amount(), udec256!(0.0001));
        assert_eq!(listing.total_price(), udec256!(50));
        assert_eq!(listing.price_per_point(), udec256!(0.5));
        assert_eq!(listing.id(), 1);
        assert_eq!(listing.status(), ListingStatus::Live);
    }

    #[test]
    fn test_buy_listing_means_counterparty_sells() {
        let listing = AssetListing::from_raw(&raw_listing(), num::Converter::new(6)).unwrap();
        assert_eq!(listing.direction(), TradeDirection::CounterpartySells);
        assert!(listing.direction().actor_is_selling());

        let mut raw = raw_listing();
        raw.listingType = LISTING_TYPE_SELL;
        let listing = AssetListing::from_raw(&raw, num::Converter::new(6)).unwrap();
        assert_eq!(listing.direction(), TradeDirection::CounterpartyBuys);
        assert!(!listing.direction().actor_is_selling());
    }

    #[test]
    fn test_unknown_discriminants_do_not_panic() {
        let mut raw = raw_listing();
        raw.listingType = 7;
        assert!(matches!(
            AssetListing::from_raw(&raw, num::Converter::new(6)),
            Err(ListingParseError::UnknownListingType(7))
        ));

        let mut raw = raw_listing();
        raw.status = 9;
        assert!(matches!(
            AssetListing::from_raw(&raw, num::Converter::new(6)),
            Err(ListingParseError::UnknownStatus(9))
        ));
    }

    #[test]
    fn test_oversized_id_is_rejected() {
        let mut raw = raw_listing();
        raw.id = U256::MAX;
        assert!(matches!(
            AssetListing::from_raw(&raw, num::Converter::new(6)),
            Err(ListingParseError::IdOverflow(_))
        ));
    }
}
