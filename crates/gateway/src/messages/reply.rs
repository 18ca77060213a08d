//! Typed success shapes per action
//!
//! Optional fields default instead of failing: the service omits fields
//! freely and the client treats absence as "not reported".

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stampede_core::{BookLevel, OrderId, Price, Ticker, TopOfBook, Trade, Volume};

/// `register_user` and `cancel_order`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SuccessReply {
    #[serde(default)]
    pub success: bool,
}

/// `get_tickers`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickersReply {
    #[serde(default)]
    pub tickers: Vec<Ticker>,
}

/// `get_top_of_book`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopOfBookReply {
    #[serde(default)]
    pub has_top: Option<bool>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub bid_price: Option<Price>,
    #[serde(default)]
    pub bid_volume: Option<Volume>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub ask_price: Option<Price>,
    #[serde(default)]
    pub ask_volume: Option<Volume>,
}

impl TopOfBookReply {
    fn level(price: Option<Price>, volume: Option<Volume>) -> Option<BookLevel> {
        let price = price.filter(|p| *p > Decimal::ZERO)?;
        Some(BookLevel::new(price, volume.unwrap_or(0)))
    }

    /// Interpret sentinels: `has_top == false` or a zero price means no level
    pub fn into_top_of_book(self) -> TopOfBook {
        if self.has_top == Some(false) {
            return TopOfBook::empty();
        }
        TopOfBook::new(
            Self::level(self.bid_price, self.bid_volume),
            Self::level(self.ask_price, self.ask_volume),
        )
    }
}

/// `handle_order`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaceOrderReply {
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub order_added_to_book: Option<bool>,
    #[serde(default)]
    pub trades_executed: Option<bool>,
    #[serde(default)]
    pub trades: Vec<Trade>,
}

impl PlaceOrderReply {
    /// Resting order id, `None` for the `-1` sentinel
    pub fn resting_id(&self) -> Option<OrderId> {
        self.order_id.and_then(OrderId::from_wire)
    }
}

/// `get_previous_trades` and `get_trades_by_user`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TradesReply {
    #[serde(default)]
    pub trades: Vec<Trade>,
}

/// `get_volume`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VolumeReply {
    #[serde(default)]
    pub volume: Volume,
}
