//! Strategy trait and cycle bookkeeping
//!
//! A strategy is a control loop body: each call to [`Strategy::run_cycle`]
//! observes the remote book, decides, and issues its calls strictly in
//! sequence. The runner owns the loop, the pause between cycles and the
//! error absorption.

use crate::error::StrategyError;
use async_trait::async_trait;
use rand::{SeedableRng, rngs::StdRng};
use stampede_core::StrategyKind;
use stampede_gateway::ExchangeClient;
use std::ops::AddAssign;
use std::time::Duration;

/// What one cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleReport {
    /// Placements acknowledged by the service
    pub orders_placed: u64,
    /// Placements or cancels rejected by the service
    pub rejections: u64,
    /// Calls lost to transport or protocol failures
    pub transport_failures: u64,
    pub cancels_attempted: u64,
    pub cancels_succeeded: u64,
    /// Trades reported back on placement
    pub trades_observed: u64,
    /// Orders dropped locally for a non-positive price
    pub orders_skipped: u64,
}

impl CycleReport {
    /// A cycle that issued no orders
    pub fn idle() -> Self {
        Self::default()
    }
}

impl AddAssign for CycleReport {
    fn add_assign(&mut self, rhs: Self) {
        self.orders_placed += rhs.orders_placed;
        self.rejections += rhs.rejections;
        self.transport_failures += rhs.transport_failures;
        self.cancels_attempted += rhs.cancels_attempted;
        self.cancels_succeeded += rhs.cancels_succeeded;
        self.trades_observed += rhs.trades_observed;
        self.orders_skipped += rhs.orders_skipped;
    }
}

/// Strategy trait - implement this for each agent behaviour
#[async_trait]
pub trait Strategy: Send {
    /// Agent id, also the user id orders are placed under
    fn name(&self) -> &str;

    fn kind(&self) -> StrategyKind;

    /// One observe → decide → act pass
    async fn run_cycle(&mut self, client: &ExchangeClient) -> Result<CycleReport, StrategyError>;

    /// Pause before the next cycle
    fn next_delay(&mut self) -> Duration;
}

/// Seeded generator for reproducible runs, entropy otherwise
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
