//! Exchange client against the stub service over TCP

use rust_decimal_macros::dec;
use stampede_core::{OrderId, Side};
use stampede_gateway::{
    ActionRequest, ExchangeClient, NewOrder, Outcome, TcpTransport, Transport, TransportConfig,
    TransportError,
};
use stampede_testkit::StubExchange;
use std::sync::Arc;
use std::time::Duration;

async fn setup() -> (StubExchange, ExchangeClient) {
    let _ = env_logger::try_init();
    let stub = StubExchange::start(&["AAPL", "MSFT"]).await.unwrap();
    let client = stub.client();
    (stub, client)
}

#[tokio::test]
async fn test_register_then_duplicate() {
    let (_stub, client) = setup().await;

    assert_eq!(client.register_user("bot_0").await, Outcome::Ok(true));
    assert_eq!(client.register_user("bot_1").await, Outcome::Ok(true));
    assert_eq!(client.register_user("bot_0").await, Outcome::Ok(false));
}

#[tokio::test]
async fn test_tickers_in_order() {
    let (_stub, client) = setup().await;

    assert_eq!(
        client.get_tickers().await,
        Outcome::Ok(vec!["AAPL".to_string(), "MSFT".to_string()])
    );
}

#[tokio::test]
async fn test_empty_book_has_no_levels() {
    let (_stub, client) = setup().await;

    let top = client.get_top_of_book("AAPL").await.ok().unwrap();
    assert!(top.is_empty());
    assert_eq!(top.mid_price(), None);
}

#[tokio::test]
async fn test_unknown_ticker_is_rejected() {
    let (_stub, client) = setup().await;

    assert!(client.get_top_of_book("ZZZZ").await.is_rejected());
}

#[tokio::test]
async fn test_cancel_succeeds_exactly_once() {
    let (stub, client) = setup().await;
    client.register_user("maker").await;

    let placement = client
        .place_order(&NewOrder::sell("maker", "AAPL", dec!(150.5), 10))
        .await
        .ok()
        .unwrap();
    let order_id = placement.order_id.unwrap();
    assert!(placement.added_to_book);
    assert_eq!(stub.resting_orders("AAPL").await, 1);

    assert_eq!(
        client.cancel_order("maker", "AAPL", order_id).await,
        Outcome::Ok(true)
    );
    // Repeated cancels answer false without side effects
    for _ in 0..2 {
        assert_eq!(
            client.cancel_order("maker", "AAPL", order_id).await,
            Outcome::Ok(false)
        );
    }
    assert_eq!(stub.resting_orders("AAPL").await, 0);
}

#[tokio::test]
async fn test_cancel_unknown_order() {
    let (_stub, client) = setup().await;

    assert_eq!(
        client.cancel_order("maker", "AAPL", OrderId::new(999)).await,
        Outcome::Ok(false)
    );
}

#[tokio::test]
async fn test_round_trip_reproduces_fields() {
    let (stub, client) = setup().await;

    client
        .place_order(&NewOrder::buy("alice", "MSFT", dec!(99.25), 7))
        .await;

    let top = stub.top_of_book("MSFT").await.unwrap();
    let bid = top.bid.unwrap();
    assert_eq!(bid.price, dec!(99.25));
    assert_eq!(bid.volume, 7);

    assert_eq!(
        client.get_volume("MSFT", dec!(99.25), Side::Buy).await,
        Outcome::Ok(7)
    );
    assert_eq!(
        client.get_volume("MSFT", dec!(99.25), Side::Sell).await,
        Outcome::Ok(0)
    );
}

#[tokio::test]
async fn test_trade_history() {
    let (_stub, client) = setup().await;

    client
        .place_order(&NewOrder::sell("alice", "AAPL", dec!(150), 3))
        .await;
    client
        .place_order(&NewOrder::sell("alice", "AAPL", dec!(151), 3))
        .await;
    let taker = client
        .place_order(&NewOrder::buy("bob", "AAPL", dec!(151), 6))
        .await
        .ok()
        .unwrap();
    assert_eq!(taker.trades.len(), 2);
    assert!(!taker.is_resting());

    let recent = client.get_previous_trades("AAPL", 1).await.ok().unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].price, dec!(151));

    let bobs = client.get_trades_by_user("bob").await.ok().unwrap();
    assert_eq!(bobs.len(), 2);
    assert!(bobs.iter().all(|t| t.bid_user_id == "bob" && t.ask_user_id == "alice"));

    assert_eq!(client.get_trades_by_user("carol").await, Outcome::Ok(vec![]));
}

#[tokio::test]
async fn test_unreachable_service() {
    let _ = env_logger::try_init();
    // Stop the stub to free its port
    let port = {
        let stub = StubExchange::start(&["AAPL"]).await.unwrap();
        stub.port()
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let config = TransportConfig::new("127.0.0.1", port)
        .with_connect_timeout(Duration::from_millis(200));
    let transport = Arc::new(TcpTransport::new(config));

    let response = transport.call(&ActionRequest::get_tickers()).await;
    assert!(response.is_error());

    let client = ExchangeClient::new(transport);
    assert!(matches!(
        client.get_top_of_book("AAPL").await,
        Outcome::Failed(TransportError::Connection(_))
    ));
}
