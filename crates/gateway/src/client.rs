//! Typed exchange client
//!
//! Wraps a [`Transport`] and turns raw responses into [`Outcome`] values so
//! strategies branch on results instead of catching failures.

use crate::error::TransportError;
use crate::messages::{
    action::{ActionRequest, NewOrder},
    reply::{PlaceOrderReply, SuccessReply, TickersReply, TopOfBookReply, TradesReply, VolumeReply},
    response::ActionResponse,
};
use crate::transport::Transport;
use serde::de::DeserializeOwned;
use stampede_core::{OrderId, Price, Side, Ticker, TopOfBook, Trade, Volume};
use std::sync::Arc;

/// Result of one remote operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Well-formed success response
    Ok(T),
    /// Application-level rejection carried in the response (`error` field)
    Rejected(String),
    /// Transport or protocol failure; no usable response
    Failed(TransportError),
}

impl<T> Outcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// Success value, discarding the failure reason
    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Ok(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ok(value) => Outcome::Ok(f(value)),
            Outcome::Rejected(reason) => Outcome::Rejected(reason),
            Outcome::Failed(err) => Outcome::Failed(err),
        }
    }
}

/// Result of a successful `handle_order`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Placement {
    /// Id of the resting remainder, `None` when nothing rests
    pub order_id: Option<OrderId>,
    /// Trades executed immediately on placement
    pub trades: Vec<Trade>,
    pub added_to_book: bool,
}

impl Placement {
    /// An id was issued, so the order can be targeted by a cancel
    pub fn is_resting(&self) -> bool {
        self.order_id.is_some()
    }

    /// The order matched at least partially on arrival
    pub fn executed(&self) -> bool {
        !self.trades.is_empty()
    }
}

/// Typed facade over a transport, cheap to clone
#[derive(Clone)]
pub struct ExchangeClient {
    transport: Arc<dyn Transport>,
}

impl ExchangeClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Raw call, never fails (see [`Transport::call`])
    pub async fn call(&self, request: &ActionRequest) -> ActionResponse {
        self.transport.call(request).await
    }

    async fn request<R: DeserializeOwned>(&self, request: &ActionRequest) -> Outcome<R> {
        let response = match self.transport.try_call(request).await {
            Ok(response) => response,
            Err(e) => return Outcome::Failed(e),
        };

        if let Some(reason) = response.error_message() {
            return Outcome::Rejected(reason);
        }

        match response.decode_as::<R>() {
            Ok(reply) => Outcome::Ok(reply),
            Err(e) => Outcome::Failed(TransportError::Malformed {
                reason: e.to_string(),
                raw: response.to_string(),
            }),
        }
    }

    /// `Ok(false)` when the id is already taken
    pub async fn register_user(&self, user_id: &str) -> Outcome<bool> {
        self.request::<SuccessReply>(&ActionRequest::register_user(user_id))
            .await
            .map(|r| r.success)
    }

    pub async fn get_tickers(&self) -> Outcome<Vec<Ticker>> {
        self.request::<TickersReply>(&ActionRequest::get_tickers())
            .await
            .map(|r| r.tickers)
    }

    pub async fn get_top_of_book(&self, ticker: &str) -> Outcome<TopOfBook> {
        self.request::<TopOfBookReply>(&ActionRequest::get_top_of_book(ticker))
            .await
            .map(TopOfBookReply::into_top_of_book)
    }

    /// Place a limit order
    ///
    /// A reply with neither an `order_id` nor executed trades is a rejection.
    pub async fn place_order(&self, order: &NewOrder) -> Outcome<Placement> {
        match self
            .request::<PlaceOrderReply>(&ActionRequest::place_order(order))
            .await
        {
            Outcome::Ok(reply) => {
                if reply.order_id.is_none() && reply.trades.is_empty() {
                    return Outcome::Rejected("no order_id in response".to_string());
                }
                let order_id = reply.resting_id();
                Outcome::Ok(Placement {
                    added_to_book: reply.order_added_to_book.unwrap_or(order_id.is_some()),
                    order_id,
                    trades: reply.trades,
                })
            }
            Outcome::Rejected(reason) => Outcome::Rejected(reason),
            Outcome::Failed(err) => Outcome::Failed(err),
        }
    }

    /// `Ok(false)` when the order is gone (filled, cancelled or unknown)
    pub async fn cancel_order(&self, user_id: &str, ticker: &str, order_id: OrderId) -> Outcome<bool> {
        self.request::<SuccessReply>(&ActionRequest::cancel_order(user_id, ticker, order_id))
            .await
            .map(|r| r.success)
    }

    /// Most recent first
    pub async fn get_previous_trades(&self, ticker: &str, count: u32) -> Outcome<Vec<Trade>> {
        self.request::<TradesReply>(&ActionRequest::get_previous_trades(ticker, count))
            .await
            .map(|r| r.trades)
    }

    pub async fn get_trades_by_user(&self, user_id: &str) -> Outcome<Vec<Trade>> {
        self.request::<TradesReply>(&ActionRequest::get_trades_by_user(user_id))
            .await
            .map(|r| r.trades)
    }

    /// Resting volume at one price level
    pub async fn get_volume(&self, ticker: &str, price: Price, side: Side) -> Outcome<Volume> {
        self.request::<VolumeReply>(&ActionRequest::get_volume(ticker, price, side))
            .await
            .map(|r| r.volume)
    }
}

impl std::fmt::Debug for ExchangeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeClient").finish_non_exhaustive()
    }
}
