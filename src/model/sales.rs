//! Period-indexed sales order lines.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Strategy that produces the order lines due in a given period and
/// consumes them as they're satisfied.
///
/// Implemented by [`Sales`]; callers may plug in a custom demand source
/// (e.g. one backed by a generator) in its place.
pub trait SalesStrategy {
    fn pop_sales(&mut self, period: i64) -> Vec<i64>;
}

/// `period -> order lines` mapping. `pop` is destructive: it removes and
/// returns the entry, yielding an empty list if there was none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sales {
    data: IndexMap<i64, Vec<i64>>,
}

impl Sales {
    pub fn new(data: IndexMap<i64, Vec<i64>>) -> Self {
        Self { data }
    }

    pub fn pop(&mut self, period: i64) -> Vec<i64> {
        self.data.shift_remove(&period).unwrap_or_default()
    }

    /// Iterate the still-pending `period -> order lines` entries, in
    /// insertion order. Used by the JSON serializer (`io::parse`).
    pub fn iter(&self) -> impl Iterator<Item = (i64, &[i64])> {
        self.data.iter().map(|(k, v)| (*k, v.as_slice()))
    }
}

impl SalesStrategy for Sales {
    fn pop_sales(&mut self, period: i64) -> Vec<i64> {
        self.pop(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_removes_and_returns_entry() {
        let mut sales = Sales::new(IndexMap::from([(1, vec![5, 5])]));
        assert_eq!(sales.pop(1), vec![5, 5]);
        assert_eq!(sales.pop(1), Vec::<i64>::new());
    }

    #[test]
    fn pop_missing_period_yields_empty() {
        let mut sales = Sales::default();
        assert_eq!(sales.pop(42), Vec::<i64>::new());
    }
}
