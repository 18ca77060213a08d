//! Stampede Core Domain
//!
//! Protocol-shaped values shared by the gateway, the strategies and the runner.
//! Nothing here is owned state: an order, a trade or a book snapshot is only
//! ever an observation of what the remote matching service reported.
//! This crate contains no async and no I/O.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    BookLevel, InvalidSide, OrderId, Side, StrategyKind, TopOfBook, Trade,
};
pub use values::{PRICE_DECIMALS, Price, Ticker, UserId, Volume, round_price};
