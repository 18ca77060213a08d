use serde::{Deserialize, Serialize};

/// Order identifier assigned by the remote service
///
/// The service answers `-1` when an order did not rest on the book, so a
/// valid id is always non-negative. Local knowledge of an id is advisory:
/// the order may already be filled or cancelled by the time it is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    /// Sentinel the service uses for "no resting order"
    pub const NONE_SENTINEL: i64 = -1;

    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Interpret a raw wire id, mapping the sentinel (or any negative) to `None`
    pub fn from_wire(raw: i64) -> Option<Self> {
        (raw >= 0).then_some(Self(raw))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire() {
        assert_eq!(OrderId::from_wire(42), Some(OrderId::new(42)));
        assert_eq!(OrderId::from_wire(0), Some(OrderId::new(0)));
        assert_eq!(OrderId::from_wire(OrderId::NONE_SENTINEL), None);
    }
}
