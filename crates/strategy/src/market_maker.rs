//! Two-sided quoting market maker
//!
//! Each cycle:
//! - Reads the top of book and derives a mid price
//! - Falls back to a jittered base price when the book cannot supply one
//! - Quotes a buy and a sell `spread / 2` either side of mid
//! - Waits `cancel_delay`, then pulls whichever quotes still have an id
//!
//! Placement and cancel are separate calls. A quote can be filled by another
//! agent in between; the late cancel then simply comes back refused.

use crate::error::StrategyError;
use crate::orders::{self, round_to_tick};
use crate::strategy::{CycleReport, Strategy, make_rng};
use async_trait::async_trait;
use log::{debug, warn};
use rand::{Rng, rngs::StdRng};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use stampede_core::{Price, StrategyKind, Ticker, TopOfBook, UserId, Volume};
use stampede_gateway::{Action, ExchangeClient, NewOrder, Outcome, Placement};
use std::time::Duration;

/// What to do with a quote that already traded on arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelPolicy {
    /// Cancel every quote that received an order id
    #[default]
    Always,
    /// Leave a quote alone if its placement reported executed trades
    SkipIfFilled,
}

/// Configuration for the market maker
#[derive(Debug, Clone)]
pub struct MarketMakerConfig {
    /// Agent id; orders are placed under this user
    pub agent_id: UserId,
    pub ticker: Ticker,
    /// Full distance between the two quotes
    pub spread: Price,
    /// Volume on each side
    pub order_size: Volume,
    /// Reference used when the book has no usable mid
    pub base_price: Price,
    /// Fallback mid is drawn from `base_price ± jitter`
    pub jitter: Price,
    /// Price increment quotes are snapped to
    pub tick: Price,
    /// Book mids below this are ignored
    pub min_mid_price: Price,
    /// How long quotes rest before being pulled
    pub cancel_delay: Duration,
    /// Pause between cycles, after the cancels
    pub cycle_pause: Duration,
    pub cancel_policy: CancelPolicy,
    pub seed: Option<u64>,
}

impl Default for MarketMakerConfig {
    fn default() -> Self {
        Self {
            agent_id: "bot_mm_0".to_string(),
            ticker: "AAPL".to_string(),
            spread: dec!(1.0),
            order_size: 10,
            base_price: dec!(150.0),
            jitter: dec!(0.50),
            tick: dec!(0.01),
            min_mid_price: dec!(1.0),
            cancel_delay: Duration::from_millis(500),
            cycle_pause: Duration::ZERO,
            cancel_policy: CancelPolicy::Always,
            seed: None,
        }
    }
}

/// Buy and sell prices for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub mid: Price,
    pub bid: Price,
    pub ask: Price,
}

pub struct MarketMaker {
    config: MarketMakerConfig,
    rng: StdRng,
}

impl MarketMaker {
    pub fn new(config: MarketMakerConfig) -> Self {
        let rng = make_rng(config.seed);
        Self { config, rng }
    }

    pub fn config(&self) -> &MarketMakerConfig {
        &self.config
    }

    /// Base price shifted by a whole number of ticks within the jitter
    fn fallback_mid(&mut self) -> Price {
        let steps = if self.config.tick > Decimal::ZERO {
            self.config
                .jitter
                .checked_div(self.config.tick)
                .and_then(|steps| steps.floor().to_i64())
                .unwrap_or(0)
        } else {
            0
        };
        let shift = if steps > 0 {
            self.rng.gen_range(-steps..=steps)
        } else {
            0
        };
        self.config.base_price + Decimal::from(shift) * self.config.tick
    }

    /// Mid from the book if it is two-sided and sane, fallback otherwise
    pub fn quote(&mut self, top: Option<&TopOfBook>) -> Quote {
        let book_mid = top
            .and_then(TopOfBook::mid_price)
            .filter(|mid| *mid >= self.config.min_mid_price);

        let mid = match book_mid {
            Some(mid) => round_to_tick(mid, self.config.tick),
            None => self.fallback_mid(),
        };

        let half = self.config.spread / Decimal::TWO;
        Quote {
            mid,
            bid: mid - half,
            ask: mid + half,
        }
    }

    fn should_cancel(&self, placement: &Placement) -> bool {
        if placement.order_id.is_none() {
            return false;
        }
        match self.config.cancel_policy {
            CancelPolicy::Always => true,
            CancelPolicy::SkipIfFilled => !placement.executed(),
        }
    }
}

#[async_trait]
impl Strategy for MarketMaker {
    fn name(&self) -> &str {
        &self.config.agent_id
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::MarketMaker
    }

    async fn run_cycle(&mut self, client: &ExchangeClient) -> Result<CycleReport, StrategyError> {
        let mut report = CycleReport::idle();
        let agent = self.config.agent_id.clone();
        let ticker = self.config.ticker.clone();

        // A failed read only costs the book mid, the maker still quotes
        let top = match client.get_top_of_book(&ticker).await {
            Outcome::Ok(top) => Some(top),
            Outcome::Rejected(reason) => {
                debug!("[{}] {} rejected: {}", agent, Action::GetTopOfBook, reason);
                report.rejections += 1;
                None
            }
            Outcome::Failed(e) => {
                warn!("[{}] {} failed: {}", agent, Action::GetTopOfBook, e);
                report.transport_failures += 1;
                None
            }
        };

        let quote = self.quote(top.as_ref());
        debug!(
            "[{}] Quoting {} around {}: {} / {}",
            agent, ticker, quote.mid, quote.bid, quote.ask
        );

        let size = self.config.order_size;
        let buy = NewOrder::buy(agent.as_str(), ticker.as_str(), quote.bid, size);
        let sell = NewOrder::sell(agent.as_str(), ticker.as_str(), quote.ask, size);
        let placements = [
            orders::place(client, &buy, &mut report).await,
            orders::place(client, &sell, &mut report).await,
        ];

        // The wait paces the cycle even when nothing is left to cancel
        tokio::time::sleep(self.config.cancel_delay).await;

        for placement in placements.iter().flatten() {
            if !self.should_cancel(placement) {
                continue;
            }
            if let Some(order_id) = placement.order_id {
                orders::cancel(client, &agent, &ticker, order_id, &mut report).await;
            }
        }

        Ok(report)
    }

    fn next_delay(&mut self) -> Duration {
        self.config.cycle_pause
    }
}
