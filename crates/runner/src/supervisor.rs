//! Supervisor - runs the whole harness
//!
//! Ties together:
//! - Bootstrap (discovery, roster, registration)
//! - One spawned task per agent, held in a `JoinSet`
//! - Panic recovery: a panicked agent is rebuilt from its spec and restarted
//! - Shutdown on Ctrl-C or after the configured duration
//!
//! Agents share nothing in-process. The supervisor only reads their
//! published stats when building the final report.

use crate::agent::{AgentRunner, AgentStats};
use crate::bootstrap::{self, AgentSpec, RegistrationSummary};
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use stampede_gateway::{ExchangeClient, TcpTransport};
use stampede_strategy::{CycleReport, Strategy};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::{Id, JoinSet};
use uuid::Uuid;

/// Builds the strategy an agent spec runs
pub type StrategyFactory = Arc<dyn Fn(&AgentSpec) -> Box<dyn Strategy> + Send + Sync>;

/// Why the harness stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Interrupted,
    DurationElapsed,
    /// Every agent task ended and none could be restarted
    AllAgentsExited,
}

/// Summary of one harness run
#[derive(Debug, Clone)]
pub struct HarnessReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub stop_reason: StopReason,
    pub registration: RegistrationSummary,
    pub agents: Vec<AgentStats>,
}

impl HarnessReport {
    /// Counters summed over all agents
    pub fn totals(&self) -> CycleReport {
        let mut totals = CycleReport::default();
        for agent in &self.agents {
            totals += agent.totals;
        }
        totals
    }

    pub fn total_cycles(&self) -> u64 {
        self.agents.iter().map(|a| a.cycles).sum()
    }

    pub fn total_restarts(&self) -> u64 {
        self.agents.iter().map(|a| a.restarts).sum()
    }

    pub fn agent(&self, agent_id: &str) -> Option<&AgentStats> {
        self.agents.iter().find(|a| a.agent_id == agent_id)
    }

    pub fn log_summary(&self) {
        info!(
            "Run {} stopped ({:?}) after {:.1}s",
            self.run_id,
            self.stop_reason,
            self.elapsed.as_secs_f64()
        );
        for agent in &self.agents {
            let t = &agent.totals;
            info!(
                "[{}] cycles={} failed={} placed={} rejected={} transport_failures={} cancels={}/{} trades={} restarts={}",
                agent.agent_id,
                agent.cycles,
                agent.failed_cycles,
                t.orders_placed,
                t.rejections,
                t.transport_failures,
                t.cancels_succeeded,
                t.cancels_attempted,
                t.trades_observed,
                agent.restarts
            );
        }
        let t = self.totals();
        info!(
            "Total: cycles={} placed={} trades={} transport_failures={}",
            self.total_cycles(),
            t.orders_placed,
            t.trades_observed,
            t.transport_failures
        );
    }
}

/// A running agent slot
struct Slot {
    spec: AgentSpec,
    stats: watch::Receiver<AgentStats>,
}

pub struct Supervisor {
    config: Arc<HarnessConfig>,
    client: ExchangeClient,
    factory: StrategyFactory,
}

impl Supervisor {
    /// Supervisor talking to the configured service over TCP
    pub fn new(config: HarnessConfig) -> Self {
        let client = ExchangeClient::new(Arc::new(TcpTransport::new(config.transport_config())));
        Self::with_client(config, client)
    }

    pub fn with_client(config: HarnessConfig, client: ExchangeClient) -> Self {
        let config = Arc::new(config);
        let factory_config = config.clone();
        let factory: StrategyFactory = Arc::new(move |spec: &AgentSpec| spec.build_strategy(&factory_config));
        Self {
            config,
            client,
            factory,
        }
    }

    /// Replace how strategies are built from specs
    pub fn with_factory(mut self, factory: StrategyFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Discover tickers if needed, plan the roster and register users
    pub async fn prepare(&self) -> Result<(Vec<AgentSpec>, RegistrationSummary), HarnessError> {
        let discovered = if self.config.needs_discovery() {
            bootstrap::discover_tickers(&self.client).await?
        } else {
            Vec::new()
        };
        let specs = bootstrap::plan_roster(&self.config, &discovered)?;
        let registration = bootstrap::register_users(&self.client, &self.config, &specs).await;
        Ok((specs, registration))
    }

    /// Run until Ctrl-C or the configured duration
    pub async fn run(self) -> Result<HarnessReport, HarnessError> {
        let duration = self.config.run.duration();
        self.run_until(shutdown_signal(duration)).await
    }

    /// Run until `stop` resolves
    pub async fn run_until<F>(self, stop: F) -> Result<HarnessReport, HarnessError>
    where
        F: Future<Output = StopReason>,
    {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let started = Instant::now();
        info!("Starting harness run {}", run_id);

        let (specs, registration) = self.prepare().await?;

        let mut tasks = JoinSet::new();
        let mut slots: HashMap<Id, Slot> = HashMap::new();
        // Stats of agents whose tasks ended for good
        let mut finished: Vec<AgentStats> = Vec::new();

        for spec in specs {
            let (runner, stats) = AgentRunner::new((self.factory)(&spec), self.client.clone());
            let id = tasks.spawn(runner.run()).id();
            slots.insert(id, Slot { spec, stats });
        }
        info!("Started {} agents", slots.len());

        tokio::pin!(stop);
        let stop_reason = loop {
            tokio::select! {
                reason = &mut stop => break reason,
                joined = tasks.join_next_with_id() => {
                    let Some(joined) = joined else {
                        break StopReason::AllAgentsExited;
                    };
                    match joined {
                        Ok((id, ())) => {
                            if let Some(slot) = slots.remove(&id) {
                                warn!("[{}] Agent exited", slot.spec.agent_id);
                                finished.push(slot.stats.borrow().clone());
                            }
                        }
                        Err(e) => {
                            let Some(slot) = slots.remove(&e.id()) else {
                                continue;
                            };
                            let mut last = slot.stats.borrow().clone();
                            if e.is_panic() && self.config.run.respawn_on_panic {
                                error!("[{}] Agent panicked, restarting", slot.spec.agent_id);
                                last.restarts += 1;
                                let (runner, stats) = AgentRunner::resume(
                                    (self.factory)(&slot.spec),
                                    self.client.clone(),
                                    last,
                                );
                                let id = tasks.spawn(runner.run()).id();
                                slots.insert(id, Slot { spec: slot.spec, stats });
                            } else {
                                error!("[{}] Agent task ended: {}", slot.spec.agent_id, e);
                                finished.push(last);
                            }
                        }
                    }
                }
            }
        };

        info!("Stopping agents ({:?})", stop_reason);
        tasks.shutdown().await;

        let mut agents: Vec<AgentStats> = slots
            .into_values()
            .map(|slot| slot.stats.borrow().clone())
            .chain(finished)
            .collect();
        agents.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));

        Ok(HarnessReport {
            run_id,
            started_at,
            elapsed: started.elapsed(),
            stop_reason,
            registration,
            agents,
        })
    }
}

/// Resolve on Ctrl-C, or after `duration` if one is set
pub async fn shutdown_signal(duration: Option<Duration>) -> StopReason {
    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    match duration {
        Some(duration) => tokio::select! {
            _ = interrupted => StopReason::Interrupted,
            _ = tokio::time::sleep(duration) => StopReason::DurationElapsed,
        },
        None => {
            interrupted.await;
            StopReason::Interrupted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_duration_elapses() {
        let reason = shutdown_signal(Some(Duration::from_secs(5))).await;
        assert_eq!(reason, StopReason::DurationElapsed);
    }

    #[test]
    fn test_report_totals() {
        let mut a = AgentStats::new("a", stampede_core::StrategyKind::MarketMaker);
        a.cycles = 3;
        a.totals.orders_placed = 6;
        let mut b = AgentStats::new("b", stampede_core::StrategyKind::HighFrequency);
        b.cycles = 2;
        b.restarts = 1;
        b.totals.orders_placed = 1;

        let report = HarnessReport {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            elapsed: Duration::from_secs(1),
            stop_reason: StopReason::DurationElapsed,
            registration: RegistrationSummary::default(),
            agents: vec![a, b],
        };
        assert_eq!(report.total_cycles(), 5);
        assert_eq!(report.totals().orders_placed, 7);
        assert_eq!(report.total_restarts(), 1);
        assert!(report.agent("b").is_some());
    }
}
