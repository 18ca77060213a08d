//! Scripted in-memory transport
//!
//! Responses are served in the order they were queued. Once the script runs
//! out every call fails with a connection error, which strategies treat like
//! an unreachable service.

use async_trait::async_trait;
use serde_json::Value;
use stampede_gateway::{ActionRequest, ActionResponse, Transport, TransportError};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<ActionResponse, TransportError>>>,
    requests: Mutex<Vec<ActionRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a success (or error-shaped) response given as a JSON object
    pub fn respond(&self, body: Value) -> &Self {
        let response = match body {
            Value::Object(fields) => ActionResponse::new(fields),
            other => ActionResponse::error(format!("scripted non-object: {}", other)),
        };
        lock(&self.script).push_back(Ok(response));
        self
    }

    /// Queue a transport failure
    pub fn fail(&self, error: TransportError) -> &Self {
        lock(&self.script).push_back(Err(error));
        self
    }

    /// Responses still queued
    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<ActionRequest> {
        lock(&self.requests).clone()
    }

    /// Only the `handle_order` requests
    pub fn placed_orders(&self) -> Vec<ActionRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| matches!(r, ActionRequest::PlaceOrder { .. }))
            .cloned()
            .collect()
    }

    /// Only the `cancel_order` requests
    pub fn cancels(&self) -> Vec<ActionRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| matches!(r, ActionRequest::CancelOrder { .. }))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn try_call(&self, request: &ActionRequest) -> Result<ActionResponse, TransportError> {
        lock(&self.requests).push(request.clone());
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection("script exhausted".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_serves_in_order_then_fails() {
        let transport = ScriptedTransport::new();
        transport
            .respond(json!({"tickers": ["AAPL"]}))
            .fail(TransportError::Timeout);

        let first = transport.try_call(&ActionRequest::get_tickers()).await;
        assert!(first.unwrap().contains("tickers"));
        let second = transport.try_call(&ActionRequest::get_tickers()).await;
        assert_eq!(second, Err(TransportError::Timeout));
        let third = transport.call(&ActionRequest::get_tickers()).await;
        assert!(third.is_error());

        assert_eq!(transport.requests().len(), 3);
        assert_eq!(transport.remaining(), 0);
    }
}
