//! Stampede Testkit
//!
//! Stand-ins for the remote matching service, used by the integration tests
//! of every other crate:
//! - [`StubExchange`]: a real TCP server speaking the action protocol over a
//!   minimal price-time book. Like the production service it keeps each
//!   connection open after replying.
//! - [`ScriptedTransport`]: an in-memory [`Transport`](stampede_gateway::Transport)
//!   that returns queued responses and records every request.

pub mod book;
pub mod scripted;
pub mod stub_exchange;

pub use book::{MatchResult, StubBook};
pub use scripted::ScriptedTransport;
pub use stub_exchange::StubExchange;
