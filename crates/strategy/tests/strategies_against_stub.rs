//! Strategy cycles against scripted responses and the stub exchange

use rust_decimal_macros::dec;
use serde_json::json;
use stampede_core::{Price, Side};
use stampede_gateway::{Action, ActionRequest, ExchangeClient, TransportError};
use stampede_strategy::{
    AdversarialConfig, AdversarialTrader, BookWatcher, BookWatcherConfig, CancelPolicy,
    HighFrequencyConfig, HighFrequencyTrader, MarketMaker, MarketMakerConfig, Strategy,
    StrategyError,
};
use stampede_testkit::{ScriptedTransport, StubExchange};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn scripted() -> (Arc<ScriptedTransport>, ExchangeClient) {
    let _ = env_logger::try_init();
    let transport = Arc::new(ScriptedTransport::new());
    let client = ExchangeClient::new(transport.clone());
    (transport, client)
}

fn top_of_book(bid: f64, ask: f64) -> serde_json::Value {
    json!({
        "has_top": true,
        "bid_price": bid, "bid_volume": 10,
        "ask_price": ask, "ask_volume": 10
    })
}

fn empty_book() -> serde_json::Value {
    json!({
        "has_top": false,
        "bid_price": 0, "bid_volume": 0,
        "ask_price": 0, "ask_volume": 0
    })
}

fn resting(order_id: i64) -> serde_json::Value {
    json!({"order_added_to_book": true, "order_id": order_id, "trades_executed": false, "trades": []})
}

/// (side, price) of every placement sent
fn placed(transport: &ScriptedTransport) -> Vec<(Side, Price)> {
    transport
        .placed_orders()
        .into_iter()
        .filter_map(|r| match r {
            ActionRequest::PlaceOrder {
                order_type, price, ..
            } => Some((order_type, price)),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_hft_crosses_wide_spread() {
    let (transport, client) = scripted();
    transport
        .respond(top_of_book(100.0, 102.0))
        .respond(resting(1))
        .respond(resting(2));

    let mut hft = HighFrequencyTrader::new(HighFrequencyConfig {
        seed: Some(1),
        ..Default::default()
    });
    let report = hft.run_cycle(&client).await.unwrap();

    assert_eq!(
        placed(&transport),
        vec![(Side::Buy, dec!(102)), (Side::Sell, dec!(100))]
    );
    assert_eq!(report.orders_placed, 2);
    assert!(transport.cancels().is_empty());
}

#[tokio::test]
async fn test_hft_stands_aside_on_narrow_spread() {
    let (transport, client) = scripted();
    transport.respond(top_of_book(100.0, 100.5));

    let mut hft = HighFrequencyTrader::new(HighFrequencyConfig::default());
    let report = hft.run_cycle(&client).await.unwrap();

    assert!(placed(&transport).is_empty());
    assert_eq!(report.orders_placed, 0);
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_maker_quotes_empty_book_then_cancels() {
    let (transport, client) = scripted();
    transport
        .respond(empty_book())
        .respond(resting(10))
        .respond(resting(11))
        .respond(json!({"success": true}))
        .respond(json!({"success": false}));

    let mut mm = MarketMaker::new(MarketMakerConfig {
        seed: Some(42),
        ..Default::default()
    });
    let started = Instant::now();
    let report = mm.run_cycle(&client).await.unwrap();
    assert!(started.elapsed() >= mm.config().cancel_delay);

    let quotes = placed(&transport);
    assert_eq!(quotes.len(), 2);
    let (buy_side, buy) = quotes[0];
    let (sell_side, sell) = quotes[1];
    assert_eq!((buy_side, sell_side), (Side::Buy, Side::Sell));
    assert!(buy >= dec!(149.0) && buy <= dec!(150.0));
    assert_eq!(sell - buy, dec!(1.0));

    assert_eq!(transport.cancels().len(), 2);
    assert_eq!(report.cancels_attempted, 2);
    // The second quote was consumed by someone else before the cancel
    assert_eq!(report.cancels_succeeded, 1);
}

/// Run `cycles` maker cycles the way the agent loop does, returning virtual time spent
async fn drive_maker(mm: &mut MarketMaker, client: &ExchangeClient, cycles: u32) -> Duration {
    let started = Instant::now();
    for _ in 0..cycles {
        let _ = mm.run_cycle(client).await;
        let delay = mm.next_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
    started.elapsed()
}

#[tokio::test(start_paused = true)]
async fn test_maker_paces_itself_when_service_is_down() {
    let (transport, client) = scripted();
    let mut mm = MarketMaker::new(MarketMakerConfig::default());
    let cancel_delay = mm.config().cancel_delay;

    let elapsed = drive_maker(&mut mm, &client, 20).await;

    assert!(elapsed >= cancel_delay * 20);
    assert_eq!(transport.requests().len(), 60);
    assert!(transport.cancels().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_maker_paces_itself_when_quotes_fill_at_once() {
    let (transport, client) = scripted();
    let matched = json!({
        "order_added_to_book": false, "order_id": -1, "trades_executed": true,
        "trades": [{"bid_user_id": "bot_mm_0", "ask_user_id": "x", "price": 149.5, "volume": 10, "timestamp": 0}]
    });
    for _ in 0..5 {
        transport
            .respond(empty_book())
            .respond(matched.clone())
            .respond(matched.clone());
    }
    let mut mm = MarketMaker::new(MarketMakerConfig {
        seed: Some(9),
        ..Default::default()
    });
    let cancel_delay = mm.config().cancel_delay;

    let elapsed = drive_maker(&mut mm, &client, 5).await;

    assert!(elapsed >= cancel_delay * 5);
    assert_eq!(transport.remaining(), 0);
    assert!(transport.cancels().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_maker_skips_cancel_for_filled_quote() {
    let (transport, client) = scripted();
    let filled = json!({
        "order_added_to_book": true, "order_id": 21, "trades_executed": true,
        "trades": [{"bid_user_id": "x", "ask_user_id": "bot_mm_0", "price": 150.5, "volume": 4, "timestamp": 0}]
    });
    transport
        .respond(top_of_book(149.0, 151.0))
        .respond(resting(20))
        .respond(filled)
        .respond(json!({"success": true}));

    let mut mm = MarketMaker::new(MarketMakerConfig {
        cancel_policy: CancelPolicy::SkipIfFilled,
        ..Default::default()
    });
    let report = mm.run_cycle(&client).await.unwrap();

    assert_eq!(
        placed(&transport),
        vec![(Side::Buy, dec!(149.5)), (Side::Sell, dec!(150.5))]
    );
    assert_eq!(transport.cancels().len(), 1);
    assert_eq!(report.trades_observed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_service_never_ends_a_cycle_badly() {
    let (transport, client) = scripted();

    let mut mm = MarketMaker::new(MarketMakerConfig::default());
    let report = mm.run_cycle(&client).await.unwrap();
    assert_eq!(report.transport_failures, 3);
    assert_eq!(report.cancels_attempted, 0);

    let mut adversarial = AdversarialTrader::new(AdversarialConfig::default());
    let report = adversarial.run_cycle(&client).await.unwrap();
    assert_eq!(report.transport_failures, 1);

    let mut hft = HighFrequencyTrader::new(HighFrequencyConfig::default());
    let err = hft.run_cycle(&client).await.unwrap_err();
    assert!(err.is_transport());

    transport.fail(TransportError::Timeout);
    let mut watcher = BookWatcher::new(BookWatcherConfig::default());
    assert_eq!(
        watcher.run_cycle(&client).await,
        Err(StrategyError::Transport {
            action: Action::GetTopOfBook,
            source: TransportError::Timeout,
        })
    );
}

#[tokio::test]
async fn test_maker_cycle_on_stub_leaves_book_clean() {
    let _ = env_logger::try_init();
    let stub = StubExchange::start(&["AAPL"]).await.unwrap();
    let client = stub.client();

    let mut mm = MarketMaker::new(MarketMakerConfig {
        cancel_delay: Duration::from_millis(20),
        seed: Some(7),
        ..Default::default()
    });
    let report = mm.run_cycle(&client).await.unwrap();

    assert_eq!(report.orders_placed, 2);
    assert_eq!(report.cancels_succeeded, 2);
    assert_eq!(stub.served(Action::PlaceOrder).await, 2);
    assert_eq!(stub.resting_orders("AAPL").await, 0);
}

#[tokio::test]
async fn test_adversarial_churn_on_stub() {
    let _ = env_logger::try_init();
    let stub = StubExchange::start(&["AAPL"]).await.unwrap();
    let client = stub.client();

    let mut adversarial = AdversarialTrader::new(AdversarialConfig {
        seed: Some(3),
        ..Default::default()
    });
    for _ in 0..5 {
        let report = adversarial.run_cycle(&client).await.unwrap();
        assert_eq!(report.orders_placed, 1);
        assert_eq!(report.cancels_succeeded, 1);
    }
    assert_eq!(stub.resting_orders("AAPL").await, 0);
}

#[tokio::test]
async fn test_watcher_records_snapshot() {
    let _ = env_logger::try_init();
    let stub = StubExchange::start(&["AAPL"]).await.unwrap();
    let client = stub.client();
    client
        .place_order(&stampede_gateway::NewOrder::buy("u", "AAPL", dec!(99), 3))
        .await;

    let mut watcher = BookWatcher::new(BookWatcherConfig::default());
    watcher.run_cycle(&client).await.unwrap();

    let snapshot = watcher.last_snapshot().unwrap();
    assert_eq!(snapshot.best_bid(), Some(dec!(99)));
    assert_eq!(snapshot.ask, None);
}
