//! Error types for the strategy crate

use stampede_gateway::{Action, TransportError};
use thiserror::Error;

/// A cycle that could not complete its observe step
///
/// Never fatal: the agent loop logs it and carries on at its normal cadence.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("{action} failed: {source}")]
    Transport {
        action: Action,
        #[source]
        source: TransportError,
    },

    #[error("{action} rejected: {reason}")]
    Rejected { action: Action, reason: String },
}

impl StrategyError {
    /// Transport or protocol failure, as opposed to an application rejection
    pub fn is_transport(&self) -> bool {
        matches!(self, StrategyError::Transport { .. })
    }
}
