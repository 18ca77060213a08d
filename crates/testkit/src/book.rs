//! Minimal limit order book with price-time priority
//!
//! Best price first, then first in first out within a level. A crossing
//! order trades at the resting order's price; any remainder rests.

use chrono::Utc;
use stampede_core::{BookLevel, OrderId, Price, Side, TopOfBook, Trade, UserId, Volume};
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Clone)]
struct RestingOrder {
    id: OrderId,
    user_id: UserId,
    volume: Volume,
}

/// Result of submitting one order
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    /// Id of the resting remainder, if any
    pub order_id: Option<OrderId>,
    pub trades: Vec<Trade>,
}

impl MatchResult {
    pub fn added_to_book(&self) -> bool {
        self.order_id.is_some()
    }
}

/// Book for one ticker
#[derive(Debug, Default)]
pub struct StubBook {
    bids: BTreeMap<Price, VecDeque<RestingOrder>>,
    asks: BTreeMap<Price, VecDeque<RestingOrder>>,
    /// Executed trades, oldest first
    trades: Vec<Trade>,
}

impl StubBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<Price, VecDeque<RestingOrder>> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Best opposing price that `side` at `limit` can trade against
    fn best_crossing(&self, side: Side, limit: Price) -> Option<Price> {
        match side {
            Side::Buy => self.asks.keys().next().copied().filter(|p| *p <= limit),
            Side::Sell => self.bids.keys().next_back().copied().filter(|p| *p >= limit),
        }
    }

    /// Match `volume` against the opposite side, resting any remainder under `id`
    pub fn submit(
        &mut self,
        id: OrderId,
        user_id: &str,
        side: Side,
        price: Price,
        mut volume: Volume,
    ) -> MatchResult {
        let mut trades = Vec::new();
        let now = Utc::now().timestamp();

        while volume > 0 {
            let Some(level_price) = self.best_crossing(side, price) else {
                break;
            };
            let opposite = self.side_mut(side.opposite());
            let Some(level) = opposite.get_mut(&level_price) else {
                break;
            };

            while volume > 0 {
                let Some(maker) = level.front_mut() else {
                    break;
                };
                let fill = volume.min(maker.volume);
                let (bid_user, ask_user) = match side {
                    Side::Buy => (user_id.to_string(), maker.user_id.clone()),
                    Side::Sell => (maker.user_id.clone(), user_id.to_string()),
                };
                trades.push(Trade::new(bid_user, ask_user, level_price, fill, now));
                maker.volume -= fill;
                volume -= fill;
                if maker.volume == 0 {
                    level.pop_front();
                }
            }

            if level.is_empty() {
                opposite.remove(&level_price);
            }
        }

        self.trades.extend(trades.iter().cloned());

        let order_id = (volume > 0).then(|| {
            self.side_mut(side)
                .entry(price)
                .or_default()
                .push_back(RestingOrder {
                    id,
                    user_id: user_id.to_string(),
                    volume,
                });
            id
        });

        MatchResult { order_id, trades }
    }

    /// Remove a resting order; `false` if it is not on the book
    pub fn cancel(&mut self, id: OrderId) -> bool {
        for book in [&mut self.bids, &mut self.asks] {
            let found = book.iter().find_map(|(price, level)| {
                level
                    .iter()
                    .position(|o| o.id == id)
                    .map(|pos| (*price, pos))
            });
            if let Some((price, pos)) = found {
                if let Some(level) = book.get_mut(&price) {
                    level.remove(pos);
                    if level.is_empty() {
                        book.remove(&price);
                    }
                }
                return true;
            }
        }
        false
    }

    fn level(book: &BTreeMap<Price, VecDeque<RestingOrder>>, price: Price) -> BookLevel {
        let volume = book
            .get(&price)
            .map(|level| level.iter().map(|o| o.volume).sum())
            .unwrap_or(0);
        BookLevel::new(price, volume)
    }

    pub fn top_of_book(&self) -> TopOfBook {
        TopOfBook::new(
            self.bids.keys().next_back().map(|p| Self::level(&self.bids, *p)),
            self.asks.keys().next().map(|p| Self::level(&self.asks, *p)),
        )
    }

    /// Resting volume at exactly `price` on `side`
    pub fn volume_at(&self, side: Side, price: Price) -> Volume {
        let book = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        Self::level(book, price).volume
    }

    /// Up to `count` trades, most recent first
    pub fn previous_trades(&self, count: usize) -> Vec<Trade> {
        self.trades.iter().rev().take(count).cloned().collect()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn resting_orders(&self) -> usize {
        self.bids.values().chain(self.asks.values()).map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().copied()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rests_when_not_crossing() {
        let mut book = StubBook::new();
        let result = book.submit(OrderId::new(1), "a", Side::Buy, dec!(100), 5);
        assert_eq!(result.order_id, Some(OrderId::new(1)));
        assert!(result.trades.is_empty());
        assert_eq!(book.top_of_book().bid, Some(BookLevel::new(dec!(100), 5)));
    }

    #[test]
    fn test_cross_at_resting_price() {
        let mut book = StubBook::new();
        book.submit(OrderId::new(1), "maker", Side::Sell, dec!(101), 5);
        let result = book.submit(OrderId::new(2), "taker", Side::Buy, dec!(102), 3);

        assert_eq!(result.order_id, None);
        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.price, dec!(101));
        assert_eq!(trade.volume, 3);
        assert_eq!(trade.bid_user_id, "taker");
        assert_eq!(trade.ask_user_id, "maker");
        assert_eq!(book.volume_at(Side::Sell, dec!(101)), 2);
    }

    #[test]
    fn test_partial_fill_rests_remainder() {
        let mut book = StubBook::new();
        book.submit(OrderId::new(1), "maker", Side::Buy, dec!(100), 4);
        let result = book.submit(OrderId::new(2), "taker", Side::Sell, dec!(99), 10);

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.order_id, Some(OrderId::new(2)));
        assert_eq!(book.top_of_book().ask, Some(BookLevel::new(dec!(99), 6)));
        assert_eq!(book.top_of_book().bid, None);
    }

    #[test]
    fn test_time_priority_within_level() {
        let mut book = StubBook::new();
        book.submit(OrderId::new(1), "first", Side::Sell, dec!(100), 5);
        book.submit(OrderId::new(2), "second", Side::Sell, dec!(100), 5);
        let result = book.submit(OrderId::new(3), "taker", Side::Buy, dec!(100), 5);

        assert_eq!(result.trades[0].ask_user_id, "first");
        assert_eq!(book.resting_orders(), 1);
    }

    #[test]
    fn test_cancel_once() {
        let mut book = StubBook::new();
        book.submit(OrderId::new(7), "a", Side::Sell, dec!(150.5), 10);
        assert!(book.cancel(OrderId::new(7)));
        assert!(!book.cancel(OrderId::new(7)));
        assert!(book.is_empty());
    }

    #[test]
    fn test_previous_trades_most_recent_first() {
        let mut book = StubBook::new();
        book.submit(OrderId::new(1), "m", Side::Sell, dec!(100), 1);
        book.submit(OrderId::new(2), "m", Side::Sell, dec!(101), 1);
        book.submit(OrderId::new(3), "t", Side::Buy, dec!(101), 2);

        let recent = book.previous_trades(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].price, dec!(101));
        assert_eq!(recent[1].price, dec!(100));
    }
}
