use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order side (Buy or Sell)
///
/// On the wire the side travels as the integer `order_type`:
/// `0` is a buy (bid) and `1` is a sell (ask). This is the only place the
/// encoding is defined; everything else goes through [`Side`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Side {
    Buy,
    Sell,
}

/// Integer that is not a known `order_type`
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid order_type {0}: expected 0 (buy) or 1 (sell)")]
pub struct InvalidSide(pub u8);

impl Side {
    /// Wire value for a buy order
    pub const BUY_CODE: u8 = 0;
    /// Wire value for a sell order
    pub const SELL_CODE: u8 = 1;

    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Book-side label used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BID",
            Side::Sell => "ASK",
        }
    }

    pub fn code(&self) -> u8 {
        u8::from(*self)
    }
}

impl From<Side> for u8 {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => Side::BUY_CODE,
            Side::Sell => Side::SELL_CODE,
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = InvalidSide;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            Side::BUY_CODE => Ok(Side::Buy),
            Side::SELL_CODE => Ok(Side::Sell),
            other => Err(InvalidSide(other)),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
