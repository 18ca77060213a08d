//! Stampede Strategies
//!
//! Agent behaviours that drive load against the remote matching service:
//! - `MarketMaker`: quotes both sides around mid, then pulls the quotes
//! - `AdversarialTrader`: random insert-then-cancel churn
//! - `HighFrequencyTrader`: crosses the book when the spread is wide
//! - `BookWatcher`: logs the top of book, never trades
//!
//! ## Architecture
//!
//! ```text
//!   AgentRunner (stampede-runner)
//!        │ run_cycle / next_delay
//!   ┌────▼─────┐
//!   │ Strategy │  observe → decide → act, calls in sequence
//!   └────┬─────┘
//!        │ Outcome<T>
//!   ExchangeClient (stampede-gateway)
//! ```
//!
//! Strategies hold no state shared with other agents. Whatever they believe
//! about an order is advisory; the service may already have filled it.

pub mod adversarial;
pub mod book_watcher;
pub mod error;
pub mod high_frequency;
pub mod market_maker;
pub mod orders;
pub mod strategy;

// Re-export main types
pub use adversarial::{AdversarialConfig, AdversarialTrader};
pub use book_watcher::{BookWatcher, BookWatcherConfig};
pub use error::StrategyError;
pub use high_frequency::{HighFrequencyConfig, HighFrequencyTrader};
pub use market_maker::{CancelPolicy, MarketMaker, MarketMakerConfig, Quote};
pub use strategy::{CycleReport, Strategy, make_rng};
