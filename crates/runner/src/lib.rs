//! Stampede Runner - Multi-Agent Load Harness
//!
//! Drives a matching service with many concurrent trading agents:
//!
//! - **Config**: JSON file, environment and CLI overrides, validated once
//! - **Bootstrap**: Ticker discovery, agent roster and user registration
//! - **Agent**: Runs one strategy in a loop and publishes its counters
//! - **Supervisor**: Spawns every agent, restarts panicked ones, stops on
//!   Ctrl-C or after a fixed duration
//!
//! ## Architecture
//!
//! ```text
//!               ┌───────────────────────┐
//!               │      Supervisor       │
//!               └───────────┬───────────┘
//!                           │ spawn / respawn
//!      ┌──────────────┬─────┴────────┬──────────────┐
//!      ▼              ▼              ▼              ▼
//! ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐
//! │  Market  │  │Adversarial│ │   HFT    │  │  Book    │
//! │  Maker   │  │          │  │          │  │ Watcher  │
//! └────┬─────┘  └────┬─────┘  └────┬─────┘  └────┬─────┘
//!      └─────────────┴──────┬──────┴─────────────┘
//!                           │ one TCP connection per request
//!                           ▼
//!               ┌───────────────────────┐
//!               │   Matching service    │
//!               └───────────────────────┘
//! ```

pub mod agent;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod supervisor;

pub use agent::{AgentRunner, AgentStats};
pub use bootstrap::{AgentSpec, RegistrationSummary};
pub use config::HarnessConfig;
pub use error::{ConfigError, HarnessError};
pub use supervisor::{HarnessReport, StopReason, StrategyFactory, Supervisor};
