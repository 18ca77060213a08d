//! Spread-crossing high-frequency trader
//!
//! When the observed spread is wider than a threshold, buys at the best ask
//! and sells at the best bid with the same random size. Orders are meant to
//! trade on arrival, so this strategy never cancels.

use crate::error::StrategyError;
use crate::orders;
use crate::strategy::{CycleReport, Strategy, make_rng};
use async_trait::async_trait;
use log::trace;
use rand::{Rng, rngs::StdRng};
use rust_decimal_macros::dec;
use stampede_core::{Price, StrategyKind, Ticker, TopOfBook, UserId, Volume};
use stampede_gateway::{Action, ExchangeClient, NewOrder, Outcome};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HighFrequencyConfig {
    pub agent_id: UserId,
    pub ticker: Ticker,
    /// Act only when `ask - bid` is strictly greater
    pub spread_threshold: Price,
    pub min_volume: Volume,
    pub max_volume: Volume,
    pub interval: Duration,
    pub seed: Option<u64>,
}

impl Default for HighFrequencyConfig {
    fn default() -> Self {
        Self {
            agent_id: "bot_hft_6".to_string(),
            ticker: "AAPL".to_string(),
            spread_threshold: dec!(1.0),
            min_volume: 5,
            max_volume: 15,
            interval: Duration::from_millis(200),
            seed: None,
        }
    }
}

pub struct HighFrequencyTrader {
    config: HighFrequencyConfig,
    rng: StdRng,
}

impl HighFrequencyTrader {
    pub fn new(config: HighFrequencyConfig) -> Self {
        let rng = make_rng(config.seed);
        Self { config, rng }
    }

    /// Crossing pair for this book, if the spread is wide enough
    pub fn decide(&mut self, top: &TopOfBook) -> Option<(NewOrder, NewOrder)> {
        let (bid, ask) = (top.best_bid()?, top.best_ask()?);
        if ask - bid <= self.config.spread_threshold {
            return None;
        }

        let lo = self.config.min_volume.min(self.config.max_volume);
        let hi = self.config.min_volume.max(self.config.max_volume);
        let volume = self.rng.gen_range(lo..=hi);

        let agent = self.config.agent_id.as_str();
        let ticker = self.config.ticker.as_str();
        Some((
            NewOrder::buy(agent, ticker, ask, volume),
            NewOrder::sell(agent, ticker, bid, volume),
        ))
    }
}

#[async_trait]
impl Strategy for HighFrequencyTrader {
    fn name(&self) -> &str {
        &self.config.agent_id
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::HighFrequency
    }

    async fn run_cycle(&mut self, client: &ExchangeClient) -> Result<CycleReport, StrategyError> {
        let action = Action::GetTopOfBook;
        let top = match client.get_top_of_book(&self.config.ticker).await {
            Outcome::Ok(top) => top,
            Outcome::Rejected(reason) => return Err(StrategyError::Rejected { action, reason }),
            Outcome::Failed(source) => return Err(StrategyError::Transport { action, source }),
        };

        let mut report = CycleReport::idle();
        let Some((buy, sell)) = self.decide(&top) else {
            trace!("[{}] Spread too narrow, standing aside", self.config.agent_id);
            return Ok(report);
        };

        orders::place(client, &buy, &mut report).await;
        orders::place(client, &sell, &mut report).await;
        Ok(report)
    }

    fn next_delay(&mut self) -> Duration {
        self.config.interval
    }
}
