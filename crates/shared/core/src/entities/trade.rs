use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{Price, UserId, Volume};

/// Executed trade as reported by the remote service
///
/// Read-only: produced either as a side effect of a placement that crossed
/// the book or by a trade history query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Buying user
    pub bid_user_id: UserId,
    /// Selling user
    pub ask_user_id: UserId,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Price,
    pub volume: Volume,
    /// Unix seconds
    pub timestamp: i64,
}

impl Trade {
    pub fn new(
        bid_user_id: impl Into<UserId>,
        ask_user_id: impl Into<UserId>,
        price: Price,
        volume: Volume,
        timestamp: i64,
    ) -> Self {
        Self {
            bid_user_id: bid_user_id.into(),
            ask_user_id: ask_user_id.into(),
            price,
            volume,
            timestamp,
        }
    }

    /// Execution time, if the timestamp is representable
    pub fn executed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Returns the notional value of the trade (price * volume)
    pub fn notional(&self) -> Decimal {
        self.price * Decimal::from(self.volume)
    }

    /// Whether the given user was on either side of the trade
    pub fn involves(&self, user_id: &str) -> bool {
        self.bid_user_id == user_id || self.ask_user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decodes_integer_price() {
        let json = r#"{"bid_user_id":"a","ask_user_id":"b","price":150,"volume":10,"timestamp":1700000000}"#;
        let trade: Trade = serde_json::from_str(json).unwrap();
        assert_eq!(trade.price, dec!(150));
        assert_eq!(trade.notional(), dec!(1500));
        assert!(trade.involves("a"));
        assert!(!trade.involves("c"));
        assert_eq!(trade.executed_at().unwrap().timestamp(), 1_700_000_000);
    }
}
