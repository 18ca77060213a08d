use rust_decimal::{Decimal, RoundingStrategy};

/// Price value - uses Decimal so quotes like 149.50 survive arithmetic exactly
pub type Price = Decimal;

/// Order volume in whole units, as the remote book counts it
pub type Volume = u32;

/// Ticker symbol, e.g. `AAPL`
pub type Ticker = String;

/// User identifier registered with the remote service
pub type UserId = String;

/// Number of decimal places prices are rounded to before they go on the wire
pub const PRICE_DECIMALS: u32 = 2;

/// Round a price to wire precision (half away from zero)
pub fn round_price(price: Price) -> Price {
    price.round_dp_with_strategy(PRICE_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}
