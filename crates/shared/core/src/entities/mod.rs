mod book;
mod order;
mod side;
mod strategy_kind;
mod trade;

pub use book::{BookLevel, TopOfBook};
pub use order::OrderId;
pub use side::{InvalidSide, Side};
pub use strategy_kind::StrategyKind;
pub use trade::Trade;
