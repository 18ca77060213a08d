//! Action envelope (client → service)

use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use stampede_core::{OrderId, Price, Side, Ticker, UserId, Volume, round_price};

/// Operations supported by the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    RegisterUser,
    GetTickers,
    GetTopOfBook,
    PlaceOrder,
    CancelOrder,
    GetPreviousTrades,
    GetTradesByUser,
    GetVolume,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Self::RegisterUser,
        Self::GetTickers,
        Self::GetTopOfBook,
        Self::PlaceOrder,
        Self::CancelOrder,
        Self::GetPreviousTrades,
        Self::GetTradesByUser,
        Self::GetVolume,
    ];

    /// Look up an action by its wire name
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }

    /// Value of the `action` key on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegisterUser => "register_user",
            Self::GetTickers => "get_tickers",
            Self::GetTopOfBook => "get_top_of_book",
            Self::PlaceOrder => "handle_order",
            Self::CancelOrder => "cancel_order",
            Self::GetPreviousTrades => "get_previous_trades",
            Self::GetTradesByUser => "get_trades_by_user",
            Self::GetVolume => "get_volume",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request envelope
///
/// Serializes to a flat JSON object tagged by `action`, e.g.
/// `{"action":"cancel_order","user_id":"bot_0","ticker":"AAPL","order_id":7}`.
/// Fields are translated structurally; the service does all validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRequest {
    RegisterUser {
        user_id: UserId,
    },
    GetTickers,
    GetTopOfBook {
        ticker: Ticker,
    },
    #[serde(rename = "handle_order")]
    PlaceOrder {
        user_id: UserId,
        order_type: Side,
        #[serde(with = "rust_decimal::serde::float")]
        price: Price,
        volume: Volume,
        ticker: Ticker,
    },
    CancelOrder {
        user_id: UserId,
        ticker: Ticker,
        order_id: OrderId,
    },
    GetPreviousTrades {
        ticker: Ticker,
        num_previous_trades: u32,
    },
    GetTradesByUser {
        user_id: UserId,
    },
    GetVolume {
        ticker: Ticker,
        #[serde(with = "rust_decimal::serde::float")]
        price: Price,
        order_type: Side,
    },
}

impl ActionRequest {
    pub fn register_user(user_id: impl Into<UserId>) -> Self {
        Self::RegisterUser {
            user_id: user_id.into(),
        }
    }

    pub fn get_tickers() -> Self {
        Self::GetTickers
    }

    pub fn get_top_of_book(ticker: impl Into<Ticker>) -> Self {
        Self::GetTopOfBook {
            ticker: ticker.into(),
        }
    }

    pub fn place_order(order: &NewOrder) -> Self {
        Self::PlaceOrder {
            user_id: order.user_id.clone(),
            order_type: order.side,
            price: round_price(order.price),
            volume: order.volume,
            ticker: order.ticker.clone(),
        }
    }

    pub fn cancel_order(
        user_id: impl Into<UserId>,
        ticker: impl Into<Ticker>,
        order_id: OrderId,
    ) -> Self {
        Self::CancelOrder {
            user_id: user_id.into(),
            ticker: ticker.into(),
            order_id,
        }
    }

    pub fn get_previous_trades(ticker: impl Into<Ticker>, num_previous_trades: u32) -> Self {
        Self::GetPreviousTrades {
            ticker: ticker.into(),
            num_previous_trades,
        }
    }

    pub fn get_trades_by_user(user_id: impl Into<UserId>) -> Self {
        Self::GetTradesByUser {
            user_id: user_id.into(),
        }
    }

    pub fn get_volume(ticker: impl Into<Ticker>, price: Price, side: Side) -> Self {
        Self::GetVolume {
            ticker: ticker.into(),
            price: round_price(price),
            order_type: side,
        }
    }

    /// Which operation this envelope carries
    pub fn action(&self) -> Action {
        match self {
            Self::RegisterUser { .. } => Action::RegisterUser,
            Self::GetTickers => Action::GetTickers,
            Self::GetTopOfBook { .. } => Action::GetTopOfBook,
            Self::PlaceOrder { .. } => Action::PlaceOrder,
            Self::CancelOrder { .. } => Action::CancelOrder,
            Self::GetPreviousTrades { .. } => Action::GetPreviousTrades,
            Self::GetTradesByUser { .. } => Action::GetTradesByUser,
            Self::GetVolume { .. } => Action::GetVolume,
        }
    }

    /// Serialize the envelope to wire bytes
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(self).map_err(CodecError::Encode)
    }

    /// Parse an envelope from wire bytes (used by reference stubs)
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        serde_json::from_slice(bytes).map_err(CodecError::Decode)
    }
}

/// Limit order to place
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub ticker: Ticker,
    pub side: Side,
    pub price: Price,
    pub volume: Volume,
}

impl NewOrder {
    /// Create a limit order; the price is rounded to wire precision
    pub fn limit(
        user_id: impl Into<UserId>,
        ticker: impl Into<Ticker>,
        side: Side,
        price: Price,
        volume: Volume,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            ticker: ticker.into(),
            side,
            price: round_price(price),
            volume,
        }
    }

    /// Convenience for a buy
    pub fn buy(
        user_id: impl Into<UserId>,
        ticker: impl Into<Ticker>,
        price: Price,
        volume: Volume,
    ) -> Self {
        Self::limit(user_id, ticker, Side::Buy, price, volume)
    }

    /// Convenience for a sell
    pub fn sell(
        user_id: impl Into<UserId>,
        ticker: impl Into<Ticker>,
        price: Price,
        volume: Volume,
    ) -> Self {
        Self::limit(user_id, ticker, Side::Sell, price, volume)
    }
}
