use serde::{Deserialize, Serialize};

/// Trading behaviour an agent runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Quotes both sides around mid, then pulls the quotes
    MarketMaker,
    /// Places and immediately cancels random orders
    Adversarial,
    /// Crosses the book when the spread is wide
    HighFrequency,
    /// Observes the top of book, never trades
    BookWatcher,
}

impl StrategyKind {
    /// Prefix used when deriving agent ids (`bot_mm_0`, `bot_adv_3`, ...)
    pub fn id_prefix(&self) -> &'static str {
        match self {
            StrategyKind::MarketMaker => "mm",
            StrategyKind::Adversarial => "adv",
            StrategyKind::HighFrequency => "hft",
            StrategyKind::BookWatcher => "watch",
        }
    }

    /// Whether agents of this kind submit orders
    pub fn trades(&self) -> bool {
        !matches!(self, StrategyKind::BookWatcher)
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StrategyKind::MarketMaker => "market maker",
            StrategyKind::Adversarial => "adversarial trader",
            StrategyKind::HighFrequency => "high-frequency trader",
            StrategyKind::BookWatcher => "book watcher",
        };
        f.write_str(name)
    }
}
