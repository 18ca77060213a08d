//! In-process stub of the remote matching service
//!
//! Speaks the same JSON action protocol over TCP. Each accepted connection
//! is served in its own task and stays open after a reply, so clients must
//! frame responses themselves.

use crate::book::StubBook;
use log::{debug, info};
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Value, json};
use stampede_core::{OrderId, Price, Ticker, TopOfBook, Trade, UserId};
use stampede_gateway::{
    Action, ActionRequest, ActionResponse, ExchangeClient, TcpTransport, TransportConfig,
};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const READ_CHUNK: usize = 2048;

/// Mutable service state behind one lock
#[derive(Debug, Default)]
struct ExchangeState {
    tickers: Vec<Ticker>,
    books: HashMap<Ticker, StubBook>,
    users: HashSet<UserId>,
    next_order_id: i64,
    served: HashMap<Action, usize>,
}

impl ExchangeState {
    fn new(tickers: &[&str]) -> Self {
        Self {
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            books: tickers
                .iter()
                .map(|t| (t.to_string(), StubBook::new()))
                .collect(),
            ..Self::default()
        }
    }

    fn handle(&mut self, request: ActionRequest) -> ActionResponse {
        *self.served.entry(request.action()).or_default() += 1;

        match request {
            ActionRequest::RegisterUser { user_id } => {
                let success = self.users.insert(user_id);
                response(json!({ "success": success }))
            }
            ActionRequest::GetTickers => response(json!({ "tickers": self.tickers })),
            ActionRequest::GetTopOfBook { ticker } => match self.books.get(&ticker) {
                Some(book) => top_of_book_response(&book.top_of_book()),
                None => ActionResponse::error("Unknown ticker"),
            },
            ActionRequest::PlaceOrder {
                user_id,
                order_type,
                price,
                volume,
                ticker,
            } => {
                let id = OrderId::new(self.next_order_id);
                let Some(book) = self.books.get_mut(&ticker) else {
                    return ActionResponse::error("Unknown ticker");
                };
                let result = book.submit(id, &user_id, order_type, price, volume);
                if result.added_to_book() {
                    self.next_order_id += 1;
                }
                response(json!({
                    "order_added_to_book": result.added_to_book(),
                    "order_id": result.order_id.map_or(OrderId::NONE_SENTINEL, |id| id.value()),
                    "trades_executed": !result.trades.is_empty(),
                    "trades": trades_json(&result.trades),
                }))
            }
            ActionRequest::CancelOrder {
                ticker, order_id, ..
            } => {
                let success = self
                    .books
                    .get_mut(&ticker)
                    .is_some_and(|book| book.cancel(order_id));
                response(json!({ "success": success }))
            }
            ActionRequest::GetPreviousTrades {
                ticker,
                num_previous_trades,
            } => {
                let trades = self
                    .books
                    .get(&ticker)
                    .map(|book| book.previous_trades(num_previous_trades as usize))
                    .unwrap_or_default();
                response(json!({ "trades": trades_json(&trades) }))
            }
            ActionRequest::GetTradesByUser { user_id } => {
                let trades: Vec<Trade> = self
                    .books
                    .values()
                    .flat_map(|book| book.trades())
                    .filter(|t| t.involves(&user_id))
                    .cloned()
                    .collect();
                response(json!({ "trades": trades_json(&trades) }))
            }
            ActionRequest::GetVolume {
                ticker,
                price,
                order_type,
            } => {
                let volume = self
                    .books
                    .get(&ticker)
                    .map_or(0, |book| book.volume_at(order_type, price));
                response(json!({ "volume": volume }))
            }
        }
    }

    /// Answer one raw request the way the service does
    fn handle_value(&mut self, value: Value) -> ActionResponse {
        let action = value.get("action").and_then(Value::as_str).map(str::to_string);
        match serde_json::from_value::<ActionRequest>(value) {
            Ok(request) => self.handle(request),
            Err(e) => match action {
                Some(name) if Action::from_wire(&name).is_none() => {
                    ActionResponse::error("Unknown action")
                }
                _ => {
                    debug!("Stub rejected request: {}", e);
                    ActionResponse::error("Exception caught during processing")
                }
            },
        }
    }
}

fn response(value: Value) -> ActionResponse {
    match value {
        Value::Object(fields) => ActionResponse::new(fields),
        other => ActionResponse::error(format!("unexpected response shape: {}", other)),
    }
}

fn price_json(price: Option<Price>) -> Value {
    json!(price.and_then(|p| p.to_f64()).unwrap_or(0.0))
}

fn top_of_book_response(top: &TopOfBook) -> ActionResponse {
    response(json!({
        "has_top": !top.is_empty(),
        "bid_price": price_json(top.best_bid()),
        "bid_volume": top.bid.map_or(0, |l| l.volume),
        "ask_price": price_json(top.best_ask()),
        "ask_volume": top.ask.map_or(0, |l| l.volume),
    }))
}

fn trades_json(trades: &[Trade]) -> Value {
    serde_json::to_value(trades).unwrap_or_else(|_| Value::Array(Vec::new()))
}

/// Running stub service; stops accepting when dropped
pub struct StubExchange {
    addr: SocketAddr,
    state: Arc<Mutex<ExchangeState>>,
    task: JoinHandle<()>,
}

impl StubExchange {
    /// Bind `127.0.0.1:0` and start serving the given tickers
    pub async fn start(tickers: &[&str]) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ExchangeState::new(tickers)));

        let accept_state = state.clone();
        let task = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((socket, _)) => {
                        tokio::spawn(serve_connection(socket, accept_state.clone()));
                    }
                    Err(e) => {
                        debug!("Stub accept failed: {}", e);
                    }
                }
            }
        });

        info!("Stub exchange listening on {}", addr);
        Ok(Self { addr, state, task })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Transport settings pointing at this stub, with short test timeouts
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::new(self.addr.ip().to_string(), self.addr.port())
            .with_connect_timeout(Duration::from_millis(500))
            .with_request_timeout(Duration::from_secs(2))
    }

    pub fn client(&self) -> ExchangeClient {
        ExchangeClient::new(Arc::new(TcpTransport::new(self.transport_config())))
    }

    /// Current top of book as the stub sees it
    pub async fn top_of_book(&self, ticker: &str) -> Option<TopOfBook> {
        let state = self.state.lock().await;
        state.books.get(ticker).map(StubBook::top_of_book)
    }

    pub async fn resting_orders(&self, ticker: &str) -> usize {
        let state = self.state.lock().await;
        state.books.get(ticker).map_or(0, StubBook::resting_orders)
    }

    pub async fn registered_users(&self) -> Vec<UserId> {
        let state = self.state.lock().await;
        let mut users: Vec<UserId> = state.users.iter().cloned().collect();
        users.sort();
        users
    }

    /// Number of well-formed requests served for `action`
    pub async fn served(&self, action: Action) -> usize {
        let state = self.state.lock().await;
        state.served.get(&action).copied().unwrap_or(0)
    }

    pub async fn trade_count(&self) -> usize {
        let state = self.state.lock().await;
        state.books.values().map(|b| b.trades().len()).sum()
    }
}

impl Drop for StubExchange {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Serve requests on one connection until the peer goes away
async fn serve_connection(mut socket: TcpStream, state: Arc<Mutex<ExchangeState>>) {
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        loop {
            let parsed = {
                let mut values = serde_json::Deserializer::from_slice(&buf).into_iter::<Value>();
                values.next().map(|r| (r, values.byte_offset()))
            };

            let reply = match parsed {
                Some((Ok(value), consumed)) => {
                    buf.drain(..consumed);
                    state.lock().await.handle_value(value)
                }
                Some((Err(e), _)) if e.is_eof() => break,
                Some((Err(_), _)) => {
                    buf.clear();
                    ActionResponse::error("Exception caught during processing")
                }
                None => {
                    buf.clear();
                    break;
                }
            };

            let bytes = match reply.encode() {
                Ok(bytes) => bytes,
                Err(_) => return,
            };
            if socket.write_all(&bytes).await.is_err() {
                return;
            }
        }
    }
}
