use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{Price, Volume};

/// Best resting level on one side of the book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub volume: Volume,
}

impl BookLevel {
    pub fn new(price: Price, volume: Volume) -> Self {
        Self { price, volume }
    }
}

/// Top of book snapshot for one ticker
///
/// A side is `None` when the service reported no resting level there
/// (empty book, one-sided book, or a zero price sentinel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopOfBook {
    pub bid: Option<BookLevel>,
    pub ask: Option<BookLevel>,
}

impl TopOfBook {
    pub fn new(bid: Option<BookLevel>, ask: Option<BookLevel>) -> Self {
        Self { bid, ask }
    }

    /// An empty book
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bid.is_none() && self.ask.is_none()
    }

    /// Both sides are quoted
    pub fn is_two_sided(&self) -> bool {
        self.bid.is_some() && self.ask.is_some()
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bid.map(|l| l.price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.ask.map(|l| l.price)
    }

    /// Gap between best ask and best bid (requires both sides)
    pub fn spread(&self) -> Option<Price> {
        Some(self.best_ask()? - self.best_bid()?)
    }

    /// Average of best bid and best ask (requires both sides)
    pub fn mid_price(&self) -> Option<Price> {
        Some((self.best_bid()? + self.best_ask()?) / Decimal::TWO)
    }
}
