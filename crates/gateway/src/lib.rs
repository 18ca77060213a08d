//! Stampede Gateway
//!
//! Everything the agents need to talk to the remote matching service:
//! - Transport abstraction, with a TCP implementation that opens one
//!   connection per call
//! - Wire codec for the action envelope and its responses
//! - `ExchangeClient`, a typed facade returning `Outcome` values
//!
//! ## Architecture
//!
//! ```text
//!  Strategy
//!     │ typed call (place_order, cancel_order, ...)
//! ┌───▼────────────┐
//! │ ExchangeClient │  Outcome::{Ok, Rejected, Failed}
//! └───┬────────────┘
//!     │ ActionRequest / ActionResponse
//! ┌───▼────────────┐
//! │   Transport    │  connect → write envelope → read one reply → close
//! └───┬────────────┘
//!     ▼
//!  Remote matching service
//! ```
//!
//! ## Failure model
//!
//! `Transport::call` never fails: I/O errors, timeouts, empty bodies and
//! unparsable bodies come back as a synthetic `{"error": ...}` response.
//! `Transport::try_call` keeps the typed `TransportError` for callers that
//! want to tell transport failures apart from application rejections.

pub mod client;
pub mod error;
pub mod messages;
pub mod transport;

// Re-export commonly used types
pub use client::{ExchangeClient, Outcome, Placement};
pub use error::{CodecError, TransportError};
pub use messages::{
    action::{Action, ActionRequest, NewOrder},
    response::ActionResponse,
};
pub use transport::{Transport, config::TransportConfig, tcp::TcpTransport};
