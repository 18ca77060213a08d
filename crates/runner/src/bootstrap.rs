//! Bootstrap - agent roster, ticker discovery and user registration
//!
//! Runs once before any agent starts:
//! - Discovers tickers if some agent group has none configured
//! - Plans the roster: one `AgentSpec` per agent, tickers assigned round-robin
//! - Registers the plain users and every trading agent's user id

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use log::{debug, info, warn};
use stampede_core::{StrategyKind, Ticker, UserId};
use stampede_gateway::{ExchangeClient, Outcome};
use stampede_strategy::{
    AdversarialConfig, AdversarialTrader, BookWatcher, BookWatcherConfig, HighFrequencyConfig,
    HighFrequencyTrader, MarketMaker, MarketMakerConfig, Strategy,
};
use std::time::Duration;

/// One agent to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    pub agent_id: UserId,
    pub kind: StrategyKind,
    pub ticker: Ticker,
    /// Position within its strategy group
    pub group_index: usize,
}

impl AgentSpec {
    /// Per-agent seed so seeded agents in one group still differ
    fn seed(&self, base: Option<u64>) -> Option<u64> {
        base.map(|s| s.wrapping_add(self.group_index as u64))
    }

    /// Build a fresh strategy for this agent from the configuration
    pub fn build_strategy(&self, config: &HarnessConfig) -> Box<dyn Strategy> {
        let agent_id = self.agent_id.clone();
        let ticker = self.ticker.clone();
        match self.kind {
            StrategyKind::MarketMaker => {
                let s = &config.market_makers;
                Box::new(MarketMaker::new(MarketMakerConfig {
                    agent_id,
                    ticker,
                    spread: s.spread,
                    order_size: s.order_size,
                    base_price: s.base_price,
                    jitter: s.jitter,
                    tick: s.tick,
                    min_mid_price: s.min_mid_price,
                    cancel_delay: Duration::from_millis(s.cancel_delay_ms),
                    cycle_pause: Duration::from_millis(s.cycle_pause_ms),
                    cancel_policy: s.cancel_policy,
                    seed: self.seed(s.seed),
                }))
            }
            StrategyKind::Adversarial => {
                let s = &config.adversarial;
                Box::new(AdversarialTrader::new(AdversarialConfig {
                    agent_id,
                    ticker,
                    reference_price: s.reference_price,
                    max_offset: s.max_offset,
                    tick: s.tick,
                    min_volume: s.min_volume,
                    max_volume: s.max_volume,
                    min_pause: Duration::from_millis(s.min_pause_ms),
                    max_pause: Duration::from_millis(s.max_pause_ms),
                    seed: self.seed(s.seed),
                }))
            }
            StrategyKind::HighFrequency => {
                let s = &config.high_frequency;
                Box::new(HighFrequencyTrader::new(HighFrequencyConfig {
                    agent_id,
                    ticker,
                    spread_threshold: s.spread_threshold,
                    min_volume: s.min_volume,
                    max_volume: s.max_volume,
                    interval: Duration::from_millis(s.interval_ms),
                    seed: self.seed(s.seed),
                }))
            }
            StrategyKind::BookWatcher => Box::new(BookWatcher::new(BookWatcherConfig {
                agent_id,
                ticker,
                interval: Duration::from_millis(config.book_watcher.interval_ms),
            })),
        }
    }
}

/// Ask the service which tickers it trades
pub async fn discover_tickers(client: &ExchangeClient) -> Result<Vec<Ticker>, HarnessError> {
    match client.get_tickers().await {
        Outcome::Ok(tickers) => {
            info!("Discovered tickers: {:?}", tickers);
            Ok(tickers)
        }
        Outcome::Rejected(reason) => Err(HarnessError::Discovery(reason)),
        Outcome::Failed(e) => Err(HarnessError::Discovery(e.to_string())),
    }
}

fn group(
    specs: &mut Vec<AgentSpec>,
    prefix: &str,
    kind: StrategyKind,
    count: usize,
    configured: &[Ticker],
    discovered: &[Ticker],
    next_id: &mut usize,
) -> Result<(), HarnessError> {
    if count == 0 {
        return Ok(());
    }
    let tickers = if configured.is_empty() {
        discovered
    } else {
        configured
    };
    if tickers.is_empty() {
        return Err(HarnessError::NoTickers);
    }

    for group_index in 0..count {
        specs.push(AgentSpec {
            agent_id: format!("{}_{}_{}", prefix, kind.id_prefix(), *next_id),
            kind,
            ticker: tickers[group_index % tickers.len()].clone(),
            group_index,
        });
        *next_id += 1;
    }
    Ok(())
}

/// Lay out every agent
///
/// Trading agents are numbered across groups in start order
/// (`bot_mm_0..2`, `bot_adv_3..5`, `bot_hft_6..9` with the defaults);
/// watchers get their own sequence.
pub fn plan_roster(
    config: &HarnessConfig,
    discovered: &[Ticker],
) -> Result<Vec<AgentSpec>, HarnessError> {
    let prefix = config.users.prefix.as_str();
    let mut specs = Vec::new();
    let mut next_id = 0;

    group(
        &mut specs,
        prefix,
        StrategyKind::MarketMaker,
        config.market_makers.count,
        &config.market_makers.tickers,
        discovered,
        &mut next_id,
    )?;
    group(
        &mut specs,
        prefix,
        StrategyKind::Adversarial,
        config.adversarial.count,
        &config.adversarial.tickers,
        discovered,
        &mut next_id,
    )?;
    group(
        &mut specs,
        prefix,
        StrategyKind::HighFrequency,
        config.high_frequency.count,
        &config.high_frequency.tickers,
        discovered,
        &mut next_id,
    )?;

    if config.book_watcher.enabled {
        let watched: &[Ticker] = if config.book_watcher.tickers.is_empty() {
            discovered
        } else {
            config.book_watcher.tickers.as_slice()
        };
        let mut watcher_id = 0;
        group(
            &mut specs,
            prefix,
            StrategyKind::BookWatcher,
            watched.len(),
            watched,
            discovered,
            &mut watcher_id,
        )?;
    }

    Ok(specs)
}

/// Registration results, for the start-up log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationSummary {
    pub registered: usize,
    /// Ids the service already knew
    pub existing: usize,
    pub failed: usize,
}

/// Register the plain users plus every trading agent's id
///
/// Failures are logged and counted, never fatal: agents will simply see
/// their orders rejected if the service insists on registration.
pub async fn register_users(
    client: &ExchangeClient,
    config: &HarnessConfig,
    specs: &[AgentSpec],
) -> RegistrationSummary {
    let plain = (0..config.users.count).map(|i| format!("{}_{}", config.users.prefix, i));
    let agents = specs
        .iter()
        .filter(|s| s.kind.trades())
        .map(|s| s.agent_id.clone());

    let mut summary = RegistrationSummary::default();
    for user_id in plain.chain(agents) {
        match client.register_user(&user_id).await {
            Outcome::Ok(true) => {
                debug!("Registered {}", user_id);
                summary.registered += 1;
            }
            Outcome::Ok(false) => {
                debug!("{} already registered", user_id);
                summary.existing += 1;
            }
            Outcome::Rejected(reason) => {
                warn!("Registration of {} rejected: {}", user_id, reason);
                summary.failed += 1;
            }
            Outcome::Failed(e) => {
                warn!("Registration of {} failed: {}", user_id, e);
                summary.failed += 1;
            }
        }
    }

    info!(
        "Users: {} registered, {} already known, {} failed",
        summary.registered, summary.existing, summary.failed
    );
    summary
}
