//! Harness configuration
//!
//! Loaded once at start-up (JSON file, then environment, then CLI flags),
//! validated, and handed to every component by value. Nothing reads
//! configuration after that.

use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use stampede_core::{Price, Ticker, Volume};
use stampede_gateway::TransportConfig;
use stampede_strategy::CancelPolicy;
use std::path::Path;
use std::time::Duration;

pub const ENV_HOST: &str = "STAMPEDE_HOST";
pub const ENV_PORT: &str = "STAMPEDE_PORT";

fn default_tickers() -> Vec<Ticker> {
    vec!["AAPL".to_string()]
}

/// Remote service endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_response_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let transport = TransportConfig::default();
        Self {
            host: transport.host,
            port: transport.port,
            connect_timeout_ms: transport.connect_timeout.as_millis() as u64,
            request_timeout_ms: transport.request_timeout.as_millis() as u64,
            max_response_bytes: transport.max_response_bytes,
        }
    }
}

impl ServerConfig {
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::new(self.host.clone(), self.port)
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .with_request_timeout(Duration::from_millis(self.request_timeout_ms))
            .with_max_response_bytes(self.max_response_bytes)
    }
}

/// Plain users registered before agents start (`bot_0`, `bot_1`, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsersConfig {
    pub count: usize,
    /// Also the prefix of agent ids
    pub prefix: String,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            count: 10,
            prefix: "bot".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketMakerSection {
    pub count: usize,
    /// Empty means "discover from the service"
    pub tickers: Vec<Ticker>,
    #[serde(with = "rust_decimal::serde::float")]
    pub spread: Price,
    pub order_size: Volume,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_price: Price,
    #[serde(with = "rust_decimal::serde::float")]
    pub jitter: Price,
    #[serde(with = "rust_decimal::serde::float")]
    pub tick: Price,
    #[serde(with = "rust_decimal::serde::float")]
    pub min_mid_price: Price,
    pub cancel_delay_ms: u64,
    pub cycle_pause_ms: u64,
    pub cancel_policy: CancelPolicy,
    pub seed: Option<u64>,
}

impl Default for MarketMakerSection {
    fn default() -> Self {
        Self {
            count: 3,
            tickers: default_tickers(),
            spread: dec!(1.0),
            order_size: 10,
            base_price: dec!(150.0),
            jitter: dec!(0.50),
            tick: dec!(0.01),
            min_mid_price: dec!(1.0),
            cancel_delay_ms: 500,
            cycle_pause_ms: 0,
            cancel_policy: CancelPolicy::Always,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdversarialSection {
    pub count: usize,
    pub tickers: Vec<Ticker>,
    #[serde(with = "rust_decimal::serde::float")]
    pub reference_price: Price,
    #[serde(with = "rust_decimal::serde::float")]
    pub max_offset: Price,
    #[serde(with = "rust_decimal::serde::float")]
    pub tick: Price,
    pub min_volume: Volume,
    pub max_volume: Volume,
    pub min_pause_ms: u64,
    pub max_pause_ms: u64,
    pub seed: Option<u64>,
}

impl Default for AdversarialSection {
    fn default() -> Self {
        Self {
            count: 3,
            tickers: default_tickers(),
            reference_price: dec!(150.0),
            max_offset: dec!(1.0),
            tick: dec!(0.01),
            min_volume: 1,
            max_volume: 20,
            min_pause_ms: 100,
            max_pause_ms: 200,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighFrequencySection {
    pub count: usize,
    pub tickers: Vec<Ticker>,
    #[serde(with = "rust_decimal::serde::float")]
    pub spread_threshold: Price,
    pub min_volume: Volume,
    pub max_volume: Volume,
    pub interval_ms: u64,
    pub seed: Option<u64>,
}

impl Default for HighFrequencySection {
    fn default() -> Self {
        Self {
            count: 4,
            tickers: default_tickers(),
            spread_threshold: dec!(1.0),
            min_volume: 5,
            max_volume: 15,
            interval_ms: 200,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookWatcherSection {
    pub enabled: bool,
    /// One watcher per ticker
    pub tickers: Vec<Ticker>,
    pub interval_ms: u64,
}

impl Default for BookWatcherSection {
    fn default() -> Self {
        Self {
            enabled: true,
            tickers: default_tickers(),
            interval_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Absent: run until interrupted
    pub duration_secs: Option<u64>,
    /// Restart an agent whose task panicked
    pub respawn_on_panic: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration_secs: None,
            respawn_on_panic: true,
        }
    }
}

impl RunConfig {
    pub fn duration(&self) -> Option<Duration> {
        self.duration_secs.map(Duration::from_secs)
    }
}

/// Complete harness configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub server: ServerConfig,
    pub users: UsersConfig,
    pub market_makers: MarketMakerSection,
    pub adversarial: AdversarialSection,
    pub high_frequency: HighFrequencySection,
    pub book_watcher: BookWatcherSection,
    pub run: RunConfig,
}

impl HarnessConfig {
    /// Read a JSON config file; missing sections and fields take defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply `STAMPEDE_HOST` / `STAMPEDE_PORT` from the process environment
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply host/port overrides from any variable source
    pub fn apply_overrides(
        mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = lookup(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(value) = lookup(ENV_PORT) {
            self.server.port = value.trim().parse().map_err(|_| ConfigError::Env {
                name: ENV_PORT,
                value,
            })?;
        }
        Ok(self)
    }

    /// Agents that place orders
    pub fn trading_agents(&self) -> usize {
        self.market_makers.count + self.adversarial.count + self.high_frequency.count
    }

    /// Whether any agent group relies on ticker discovery
    pub fn needs_discovery(&self) -> bool {
        (self.market_makers.count > 0 && self.market_makers.tickers.is_empty())
            || (self.adversarial.count > 0 && self.adversarial.tickers.is_empty())
            || (self.high_frequency.count > 0 && self.high_frequency.tickers.is_empty())
            || (self.book_watcher.enabled && self.book_watcher.tickers.is_empty())
    }

    pub fn transport_config(&self) -> TransportConfig {
        self.server.transport_config()
    }

    /// Reject configurations no agent could run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::invalid("server.host", "must not be empty"));
        }
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "must not be 0"));
        }
        if self.server.max_response_bytes == 0 {
            return Err(ConfigError::invalid("server.max_response_bytes", "must be positive"));
        }
        if self.trading_agents() == 0 {
            return Err(ConfigError::invalid("agents", "at least one trading agent is required"));
        }
        if self.users.prefix.trim().is_empty() {
            return Err(ConfigError::invalid("users.prefix", "must not be empty"));
        }

        let mm = &self.market_makers;
        positive("market_makers.spread", mm.spread)?;
        positive("market_makers.base_price", mm.base_price)?;
        positive("market_makers.tick", mm.tick)?;
        non_negative("market_makers.jitter", mm.jitter)?;
        if mm.order_size == 0 {
            return Err(ConfigError::invalid("market_makers.order_size", "must be positive"));
        }
        if mm.cancel_delay_ms == 0 && mm.cycle_pause_ms == 0 {
            return Err(ConfigError::invalid(
                "market_makers.cancel_delay_ms",
                "must be positive when cycle_pause_ms is 0",
            ));
        }
        if mm.base_price - mm.jitter - mm.spread / Decimal::TWO <= Decimal::ZERO {
            return Err(ConfigError::invalid(
                "market_makers.base_price",
                "fallback quotes would not be positive",
            ));
        }

        let adv = &self.adversarial;
        positive("adversarial.reference_price", adv.reference_price)?;
        positive("adversarial.tick", adv.tick)?;
        non_negative("adversarial.max_offset", adv.max_offset)?;
        ordered("adversarial.volume", adv.min_volume, adv.max_volume)?;
        ordered("adversarial.pause_ms", adv.min_pause_ms, adv.max_pause_ms)?;
        if adv.min_volume == 0 {
            return Err(ConfigError::invalid("adversarial.min_volume", "must be positive"));
        }
        if adv.max_pause_ms == 0 {
            return Err(ConfigError::invalid("adversarial.max_pause_ms", "must be positive"));
        }

        let hft = &self.high_frequency;
        non_negative("high_frequency.spread_threshold", hft.spread_threshold)?;
        ordered("high_frequency.volume", hft.min_volume, hft.max_volume)?;
        if hft.min_volume == 0 {
            return Err(ConfigError::invalid("high_frequency.min_volume", "must be positive"));
        }
        if hft.interval_ms == 0 {
            return Err(ConfigError::invalid("high_frequency.interval_ms", "must be positive"));
        }

        if self.book_watcher.enabled && self.book_watcher.interval_ms == 0 {
            return Err(ConfigError::invalid("book_watcher.interval_ms", "must be positive"));
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: Decimal) -> Result<(), ConfigError> {
    if value <= Decimal::ZERO {
        return Err(ConfigError::invalid(field, format!("must be positive, got {}", value)));
    }
    Ok(())
}

fn non_negative(field: &'static str, value: Decimal) -> Result<(), ConfigError> {
    if value < Decimal::ZERO {
        return Err(ConfigError::invalid(field, format!("must not be negative, got {}", value)));
    }
    Ok(())
}

fn ordered<T: PartialOrd + std::fmt::Display>(
    field: &'static str,
    min: T,
    max: T,
) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::invalid(field, format!("range {}..={} is inverted", min, max)));
    }
    Ok(())
}
