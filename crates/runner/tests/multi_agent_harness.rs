//! Full harness runs against the in-process stub exchange

use async_trait::async_trait;
use stampede_core::StrategyKind;
use stampede_gateway::{Action, ExchangeClient};
use stampede_runner::{
    AgentSpec, HarnessConfig, HarnessError, HarnessReport, StopReason, StrategyFactory, Supervisor,
};
use stampede_strategy::{CycleReport, Strategy, StrategyError};
use stampede_testkit::StubExchange;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Small, fast configuration aimed at `port`
fn quick_config(port: u16) -> HarnessConfig {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut config = HarnessConfig::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = port;
    config.server.connect_timeout_ms = 500;
    config.server.request_timeout_ms = 2000;
    config.users.count = 2;

    config.market_makers.count = 1;
    config.market_makers.tickers = vec!["AAPL".to_string()];
    config.market_makers.cancel_delay_ms = 10;
    config.market_makers.cycle_pause_ms = 0;
    config.market_makers.seed = Some(7);

    config.adversarial.count = 1;
    config.adversarial.tickers = vec!["AAPL".to_string()];
    config.adversarial.min_pause_ms = 10;
    config.adversarial.max_pause_ms = 20;
    config.adversarial.seed = Some(11);

    config.high_frequency.count = 1;
    config.high_frequency.tickers = vec!["AAPL".to_string()];
    config.high_frequency.interval_ms = 20;
    config.high_frequency.seed = Some(13);

    config.book_watcher.interval_ms = 50;
    config
}

async fn run_for(
    supervisor: Supervisor,
    duration: Duration,
) -> Result<HarnessReport, HarnessError> {
    supervisor
        .run_until(async move {
            tokio::time::sleep(duration).await;
            StopReason::DurationElapsed
        })
        .await
}

#[tokio::test]
async fn test_agents_trade_against_stub() {
    let stub = StubExchange::start(&["AAPL", "MSFT"]).await.unwrap();
    let mut config = quick_config(stub.port());
    // Watchers discover both tickers
    config.book_watcher.tickers.clear();

    let report = run_for(Supervisor::new(config), Duration::from_millis(600))
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::DurationElapsed);
    assert_eq!(report.registration.registered, 5);
    assert_eq!(report.registration.failed, 0);

    let users = stub.registered_users().await;
    for user in ["bot_0", "bot_1", "bot_mm_0", "bot_adv_1", "bot_hft_2"] {
        assert!(users.iter().any(|u| u == user), "{} not registered", user);
    }
    assert!(!users.iter().any(|u| u.starts_with("bot_watch")));

    assert_eq!(report.agents.len(), 5);
    assert!(report.agent("bot_watch_0").is_some());
    assert!(report.agent("bot_watch_1").is_some());
    for agent in &report.agents {
        assert!(agent.cycles > 0, "{} never cycled", agent.agent_id);
        assert_eq!(agent.totals.transport_failures, 0);
        assert_eq!(agent.restarts, 0);
    }

    let maker = report.agent("bot_mm_0").unwrap();
    assert!(maker.totals.orders_placed >= 2);
    assert!(stub.served(Action::PlaceOrder).await >= 2);
    assert!(stub.served(Action::GetTopOfBook).await > 0);
    assert_eq!(stub.served(Action::GetTickers).await, 1);
}

/// Panics on the first cycle of the first instance only
struct Fragile {
    agent_id: String,
    kind: StrategyKind,
    explode: bool,
}

#[async_trait]
impl Strategy for Fragile {
    fn name(&self) -> &str {
        &self.agent_id
    }

    fn kind(&self) -> StrategyKind {
        self.kind
    }

    async fn run_cycle(&mut self, client: &ExchangeClient) -> Result<CycleReport, StrategyError> {
        if self.explode {
            panic!("strategy bug");
        }
        let _ = client.get_top_of_book("AAPL").await;
        Ok(CycleReport::idle())
    }

    fn next_delay(&mut self) -> Duration {
        Duration::from_millis(10)
    }
}

fn fragile_factory(builds: Arc<AtomicUsize>) -> StrategyFactory {
    Arc::new(move |spec: &AgentSpec| {
        let explode = builds.fetch_add(1, Ordering::SeqCst) == 0;
        Box::new(Fragile {
            agent_id: spec.agent_id.clone(),
            kind: spec.kind,
            explode,
        }) as Box<dyn Strategy>
    })
}

fn single_agent_config(port: u16) -> HarnessConfig {
    let mut config = quick_config(port);
    config.users.count = 0;
    config.adversarial.count = 0;
    config.high_frequency.count = 0;
    config.book_watcher.enabled = false;
    config
}

#[tokio::test]
async fn test_panicked_agent_is_restarted() {
    let stub = StubExchange::start(&["AAPL"]).await.unwrap();
    let builds = Arc::new(AtomicUsize::new(0));
    let supervisor = Supervisor::new(single_agent_config(stub.port()))
        .with_factory(fragile_factory(builds.clone()));

    let report = run_for(supervisor, Duration::from_millis(300)).await.unwrap();

    assert_eq!(builds.load(Ordering::SeqCst), 2);
    let agent = report.agent("bot_mm_0").unwrap();
    assert_eq!(agent.restarts, 1);
    assert!(agent.cycles > 0);
    assert_eq!(report.total_restarts(), 1);
}

#[tokio::test]
async fn test_without_respawn_harness_ends_when_agents_exit() {
    let stub = StubExchange::start(&["AAPL"]).await.unwrap();
    let mut config = single_agent_config(stub.port());
    config.run.respawn_on_panic = false;
    let builds = Arc::new(AtomicUsize::new(0));
    let supervisor = Supervisor::new(config).with_factory(fragile_factory(builds.clone()));

    let report = run_for(supervisor, Duration::from_secs(30)).await.unwrap();

    assert_eq!(report.stop_reason, StopReason::AllAgentsExited);
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    let agent = report.agent("bot_mm_0").unwrap();
    assert_eq!(agent.restarts, 0);
    assert_eq!(agent.cycles, 0);
}

#[tokio::test]
async fn test_unreachable_service_keeps_agents_running() {
    let port = {
        let stub = StubExchange::start(&["AAPL"]).await.unwrap();
        stub.port()
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut config = quick_config(port);
    config.book_watcher.tickers = vec!["AAPL".to_string()];

    let report = run_for(Supervisor::new(config), Duration::from_millis(400))
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::DurationElapsed);
    assert_eq!(report.registration.registered, 0);
    assert_eq!(report.registration.failed, 5);
    for agent in report.agents.iter().filter(|a| a.kind.trades()) {
        assert!(agent.cycles > 0, "{} never cycled", agent.agent_id);
        assert!(
            agent.totals.transport_failures > 0,
            "{} saw no transport failures",
            agent.agent_id
        );
        assert_eq!(agent.restarts, 0);
    }
    assert!(report.totals().trades_observed == 0);
}

#[tokio::test]
async fn test_no_tickers_anywhere_fails_start() {
    let stub = StubExchange::start(&[]).await.unwrap();
    let mut config = single_agent_config(stub.port());
    config.market_makers.tickers.clear();

    let result = run_for(Supervisor::new(config), Duration::from_millis(200)).await;

    assert!(matches!(result, Err(HarnessError::NoTickers)));
}
