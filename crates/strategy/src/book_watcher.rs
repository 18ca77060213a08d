//! Periodic top-of-book logger
//!
//! Observes only; never places orders.

use crate::error::StrategyError;
use crate::strategy::{CycleReport, Strategy};
use async_trait::async_trait;
use log::info;
use stampede_core::{BookLevel, StrategyKind, Ticker, TopOfBook};
use stampede_gateway::{Action, ExchangeClient, Outcome};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BookWatcherConfig {
    pub agent_id: String,
    pub ticker: Ticker,
    pub interval: Duration,
}

impl Default for BookWatcherConfig {
    fn default() -> Self {
        Self {
            agent_id: "book_watcher".to_string(),
            ticker: "AAPL".to_string(),
            interval: Duration::from_secs(3),
        }
    }
}

pub struct BookWatcher {
    config: BookWatcherConfig,
    last: Option<TopOfBook>,
}

fn describe(level: Option<BookLevel>) -> String {
    match level {
        Some(level) => format!("{} @ {}", level.volume, level.price),
        None => "-".to_string(),
    }
}

impl BookWatcher {
    pub fn new(config: BookWatcherConfig) -> Self {
        Self { config, last: None }
    }

    /// Most recent snapshot seen
    pub fn last_snapshot(&self) -> Option<&TopOfBook> {
        self.last.as_ref()
    }

    /// One-line rendering of a snapshot
    pub fn render(ticker: &str, top: &TopOfBook) -> String {
        format!(
            "{} BID {} | ASK {}",
            ticker,
            describe(top.bid),
            describe(top.ask)
        )
    }
}

#[async_trait]
impl Strategy for BookWatcher {
    fn name(&self) -> &str {
        &self.config.agent_id
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::BookWatcher
    }

    async fn run_cycle(&mut self, client: &ExchangeClient) -> Result<CycleReport, StrategyError> {
        let action = Action::GetTopOfBook;
        match client.get_top_of_book(&self.config.ticker).await {
            Outcome::Ok(top) => {
                info!(
                    "[{}] {}",
                    self.config.agent_id,
                    Self::render(&self.config.ticker, &top)
                );
                self.last = Some(top);
                Ok(CycleReport::idle())
            }
            Outcome::Rejected(reason) => Err(StrategyError::Rejected { action, reason }),
            Outcome::Failed(source) => Err(StrategyError::Transport { action, source }),
        }
    }

    fn next_delay(&mut self) -> Duration {
        self.config.interval
    }
}
