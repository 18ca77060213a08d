//! Book churner
//!
//! Places a random order near a reference price and, if it rests, cancels
//! it straight away. Meant to stress the service with insert/cancel pressure
//! rather than to trade.

use crate::error::StrategyError;
use crate::orders::{self, round_to_tick};
use crate::strategy::{CycleReport, Strategy, make_rng};
use async_trait::async_trait;
use rand::{Rng, rngs::StdRng};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rust_decimal_macros::dec;
use stampede_core::{Price, Side, StrategyKind, Ticker, UserId, Volume};
use stampede_gateway::{ExchangeClient, NewOrder};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AdversarialConfig {
    pub agent_id: UserId,
    pub ticker: Ticker,
    pub reference_price: Price,
    /// Prices are drawn from `reference_price ± max_offset`
    pub max_offset: Price,
    pub tick: Price,
    pub min_volume: Volume,
    pub max_volume: Volume,
    pub min_pause: Duration,
    pub max_pause: Duration,
    pub seed: Option<u64>,
}

impl Default for AdversarialConfig {
    fn default() -> Self {
        Self {
            agent_id: "bot_adv_3".to_string(),
            ticker: "AAPL".to_string(),
            reference_price: dec!(150.0),
            max_offset: dec!(1.0),
            tick: dec!(0.01),
            min_volume: 1,
            max_volume: 20,
            min_pause: Duration::from_millis(100),
            max_pause: Duration::from_millis(200),
            seed: None,
        }
    }
}

pub struct AdversarialTrader {
    config: AdversarialConfig,
    rng: StdRng,
}

impl AdversarialTrader {
    pub fn new(config: AdversarialConfig) -> Self {
        let rng = make_rng(config.seed);
        Self { config, rng }
    }

    /// Draw the next random order
    pub fn next_order(&mut self) -> NewOrder {
        let offset = self.config.max_offset.to_f64().unwrap_or(0.0);
        let shift = if offset > 0.0 {
            self.rng.gen_range(-offset..=offset)
        } else {
            0.0
        };
        let price = round_to_tick(
            self.config.reference_price + Decimal::from_f64_retain(shift).unwrap_or_default(),
            self.config.tick,
        );

        let lo = self.config.min_volume.min(self.config.max_volume);
        let hi = self.config.min_volume.max(self.config.max_volume);
        let volume = self.rng.gen_range(lo..=hi);

        let side = if self.rng.gen_bool(0.5) {
            Side::Buy
        } else {
            Side::Sell
        };

        NewOrder::limit(
            self.config.agent_id.as_str(),
            self.config.ticker.as_str(),
            side,
            price,
            volume,
        )
    }
}

#[async_trait]
impl Strategy for AdversarialTrader {
    fn name(&self) -> &str {
        &self.config.agent_id
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Adversarial
    }

    async fn run_cycle(&mut self, client: &ExchangeClient) -> Result<CycleReport, StrategyError> {
        let mut report = CycleReport::idle();
        let order = self.next_order();

        // No retry: a failed placement just skips the cancel
        let Some(placement) = orders::place(client, &order, &mut report).await else {
            return Ok(report);
        };
        if let Some(order_id) = placement.order_id {
            orders::cancel(client, &order.user_id, &order.ticker, order_id, &mut report).await;
        }

        Ok(report)
    }

    fn next_delay(&mut self) -> Duration {
        let (lo, hi) = (self.config.min_pause, self.config.max_pause);
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }
}
