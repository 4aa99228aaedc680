use alloy::primitives::U256;
use fastnum::{
    bint,
    decimal::{Context, RoundingMode, UnsignedDecimal},
};

/// Number of fractional digits of the payment currency.
///
/// Listing `totalPrice`/`pricePerPoint` fields are always scaled by this,
/// regardless of the point asset's own precision.
pub const PRICE_DECIMALS: u8 = 18;

/// Converter for payment-currency amounts.
pub fn price_converter() -> Converter {
    Converter::new(PRICE_DECIMALS)
}

/// Fixed-point to decimal converter.
///
/// All marketplace quantities are non-negative, so only the unsigned
/// conversions exist.
#[derive(Clone, Copy, Debug, Default)]
pub struct Converter {
    decimals: i32,
}

impl Converter {
    pub(crate) fn new(decimals: u8) -> Self {
        Self {
            decimals: decimals as i32,
        }
    }

    pub fn from_unsigned<const N: usize>(&self, value: U256) -> UnsignedDecimal<N> {
        let unscaled = bint::UInt::<N>::from_le_slice(value.as_le_slice())
            .expect("Converter: U256 -> UInt::<N>");
        UnsignedDecimal::<N>::from_parts(
            unscaled,
            -self.decimals,
            Context::default().with_rounding_mode(RoundingMode::Floor),
        )
    }

    pub fn to_unsigned<const N: usize>(&self, value: UnsignedDecimal<N>) -> U256 {
        let rescaled = value.rescale(self.decimals as i16);
        U256::from_le_slice(rescaled.digits().to_radix_le(256).as_slice())
    }
}
