//! Transport abstraction layer
//!
//! One request, one response. The trait seam lets agents run against the
//! real TCP service or a scripted stand-in without changing their code.

pub mod config;
pub mod tcp;

pub use config::TransportConfig;
pub use tcp::TcpTransport;

use crate::error::TransportError;
use crate::messages::{action::ActionRequest, response::ActionResponse};
use async_trait::async_trait;

/// Request/response exchange with the remote service
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and wait for the response, surfacing failures
    async fn try_call(&self, request: &ActionRequest) -> Result<ActionResponse, TransportError>;

    /// Send a request; never fails
    ///
    /// Any failure becomes a synthetic `{"error": ...}` response, so callers
    /// see one shape for rejections and transport problems alike.
    async fn call(&self, request: &ActionRequest) -> ActionResponse {
        match self.try_call(request).await {
            Ok(response) => response,
            Err(e) => {
                log::debug!("{} call failed: {}", request.action(), e);
                ActionResponse::from_transport_error(&e)
            }
        }
    }
}
