//! Agent Runner - drives one strategy forever
//!
//! Each agent:
//! - Runs its strategy's cycle, absorbing whatever error it returns
//! - Publishes cumulative stats on its own watch channel
//! - Sleeps the strategy's chosen delay, then goes again
//!
//! The loop only ends when its task is aborted.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use stampede_core::StrategyKind;
use stampede_gateway::ExchangeClient;
use stampede_strategy::{CycleReport, Strategy};
use std::time::Duration;
use tokio::sync::watch;

/// Cumulative per-agent counters
#[derive(Debug, Clone, PartialEq)]
pub struct AgentStats {
    pub agent_id: String,
    pub kind: StrategyKind,
    pub cycles: u64,
    /// Cycles that ended in a `StrategyError`
    pub failed_cycles: u64,
    pub totals: CycleReport,
    /// Times this agent was restarted after a panic
    pub restarts: u64,
    pub last_error: Option<String>,
    pub last_cycle_at: Option<DateTime<Utc>>,
}

impl AgentStats {
    pub fn new(agent_id: impl Into<String>, kind: StrategyKind) -> Self {
        Self {
            agent_id: agent_id.into(),
            kind,
            cycles: 0,
            failed_cycles: 0,
            totals: CycleReport::default(),
            restarts: 0,
            last_error: None,
            last_cycle_at: None,
        }
    }
}

pub struct AgentRunner {
    strategy: Box<dyn Strategy>,
    client: ExchangeClient,
    stats_tx: watch::Sender<AgentStats>,
}

impl AgentRunner {
    /// Create a runner and the receiver its stats are published on
    pub fn new(
        strategy: Box<dyn Strategy>,
        client: ExchangeClient,
    ) -> (Self, watch::Receiver<AgentStats>) {
        let stats = AgentStats::new(strategy.name(), strategy.kind());
        Self::resume(strategy, client, stats)
    }

    /// Create a runner that continues counting from `stats`
    pub fn resume(
        strategy: Box<dyn Strategy>,
        client: ExchangeClient,
        stats: AgentStats,
    ) -> (Self, watch::Receiver<AgentStats>) {
        let (stats_tx, stats_rx) = watch::channel(stats);
        (
            Self {
                strategy,
                client,
                stats_tx,
            },
            stats_rx,
        )
    }

    pub fn agent_id(&self) -> &str {
        self.strategy.name()
    }

    /// Run one cycle, publish the result and return the pause to take
    pub async fn step(&mut self) -> Duration {
        let outcome = self.strategy.run_cycle(&self.client).await;
        let agent_id = self.strategy.name().to_string();

        self.stats_tx.send_modify(|stats| {
            stats.cycles += 1;
            stats.last_cycle_at = Some(Utc::now());
            match &outcome {
                Ok(report) => stats.totals += *report,
                Err(e) => {
                    stats.failed_cycles += 1;
                    if e.is_transport() {
                        stats.totals.transport_failures += 1;
                    } else {
                        stats.totals.rejections += 1;
                    }
                    stats.last_error = Some(e.to_string());
                }
            }
        });

        match outcome {
            Ok(report) => debug!("[{}] Cycle done: {:?}", agent_id, report),
            Err(e) if e.is_transport() => warn!("[{}] Cycle failed: {}", agent_id, e),
            Err(e) => debug!("[{}] Cycle rejected: {}", agent_id, e),
        }

        self.strategy.next_delay()
    }

    /// Run the agent until its task is aborted
    pub async fn run(mut self) {
        info!("[{}] Agent started ({})", self.agent_id(), self.strategy.kind());
        loop {
            let delay = self.step().await;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            } else {
                tokio::task::yield_now().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use stampede_gateway::{Action, ActionRequest, ActionResponse, Transport, TransportError};
    use stampede_strategy::StrategyError;
    use std::sync::Arc;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn try_call(&self, _: &ActionRequest) -> Result<ActionResponse, TransportError> {
            Err(TransportError::Connection("refused".to_string()))
        }
    }

    /// Fails every other cycle
    struct Flaky {
        calls: u64,
    }

    #[async_trait]
    impl Strategy for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn kind(&self) -> StrategyKind {
            StrategyKind::HighFrequency
        }

        async fn run_cycle(
            &mut self,
            client: &ExchangeClient,
        ) -> Result<CycleReport, StrategyError> {
            self.calls += 1;
            if self.calls % 2 == 0 {
                let source = match client.get_tickers().await {
                    stampede_gateway::Outcome::Failed(e) => e,
                    _ => TransportError::Timeout,
                };
                return Err(StrategyError::Transport {
                    action: Action::GetTickers,
                    source,
                });
            }
            Ok(CycleReport {
                orders_placed: 1,
                ..Default::default()
            })
        }

        fn next_delay(&mut self) -> Duration {
            Duration::from_millis(10)
        }
    }

    #[tokio::test]
    async fn test_errors_are_absorbed_and_counted() {
        let client = ExchangeClient::new(Arc::new(Unreachable));
        let (mut runner, stats) = AgentRunner::new(Box::new(Flaky { calls: 0 }), client);

        for _ in 0..4 {
            assert_eq!(runner.step().await, Duration::from_millis(10));
        }

        let stats = stats.borrow();
        assert_eq!(stats.cycles, 4);
        assert_eq!(stats.failed_cycles, 2);
        assert_eq!(stats.totals.orders_placed, 2);
        assert_eq!(stats.totals.transport_failures, 2);
        assert!(stats.last_error.as_deref().unwrap().contains("refused"));
    }

    #[tokio::test]
    async fn test_resume_keeps_counts() {
        let client = ExchangeClient::new(Arc::new(Unreachable));
        let mut previous = AgentStats::new("flaky", StrategyKind::HighFrequency);
        previous.cycles = 7;
        previous.restarts = 1;

        let (mut runner, stats) =
            AgentRunner::resume(Box::new(Flaky { calls: 0 }), client, previous);
        runner.step().await;

        assert_eq!(stats.borrow().cycles, 8);
        assert_eq!(stats.borrow().restarts, 1);
    }
}
