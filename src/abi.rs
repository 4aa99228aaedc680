//! Contract bindings for the points marketplace and the point tokens it
//! trades.
//!
//! No compiled artifacts ship with this repository, so the interfaces are
//! declared inline rather than loaded from ABI JSON.

#[allow(clippy::too_many_arguments)]
pub mod points {
    alloy::sol!(
        /// ERC-20 surface of a company point token.
        ///
        /// `increaseAllowance` is the additive grant entry point; plain
        /// `approve` replaces the current allowance and must not be used
        /// for shortfall top-ups.
        #[derive(Debug)]
        #[sol(rpc)]
        interface MonetPoints {
            function name() external view returns (string memory);
            function symbol() external view returns (string memory);
            function decimals() external view returns (uint8);
            function balanceOf(address account) external view returns (uint256);
            function allowance(address owner, address spender) external view returns (uint256);
            function approve(address spender, uint256 value) external returns (bool);
            function increaseAllowance(address spender, uint256 addedValue) external returns (bool);
        }
    );
}

#[allow(clippy::too_many_arguments)]
pub mod market {
    alloy::sol!(
        /// Marketplace escrow contract. Owns listing state and is the sole
        /// authority over status transitions.
        #[derive(Debug)]
        #[sol(rpc)]
        interface Marketplace {
            /// Raw listing as stored on chain. `amount` is scaled by the
            /// asset's decimals, `totalPrice`/`pricePerPoint` by 18.
            struct Listing {
                uint256 id;
                address asset;
                uint256 amount;
                uint256 totalPrice;
                uint256 pricePerPoint;
                address owner;
                uint8 listingType;
                uint8 status;
            }

            error ListingNotFound(uint256 id);
            error ListingNotLive(uint256 id);
            error InsufficientAllowance(uint256 required, uint256 granted);
            error InvalidTradeValue(uint256 expected, uint256 provided);
            error InvalidAmount(uint256 amount);

            event ListingCreated(
                uint256 indexed id,
                address indexed asset,
                address indexed owner,
                uint8 listingType,
                uint256 amount,
                uint256 totalPrice,
                uint256 pricePerPoint
            );
            event ListingTraded(uint256 indexed id, address indexed trader, uint256 amount, uint256 totalPrice);
            event ListingCancelled(uint256 indexed id, address indexed owner);

            function listingCount() external view returns (uint256);
            function getListing(uint256 id) external view returns (Listing memory);
            function createListing(address asset, uint256 amount, uint256 pricePerPoint, uint8 listingType) external payable returns (uint256);
            function cancelListing(uint256 id) external;
            function trade(uint256 id, uint256 amount) external payable;
        }
    );
}
