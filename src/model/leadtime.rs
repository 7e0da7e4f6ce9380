//! Period-indexed lead-time lookup with an optional default.

use crate::error::SimError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Strategy for producing a lead time for a given period.
///
/// Implemented by [`LeadTime`]; callers may plug in their own
/// implementation (e.g. a generated schedule) in place of it.
pub trait LeadTimeStrategy {
    fn get_lead_time(&self, period: i64) -> Result<i64, SimError>;
}

/// `period -> lead time` mapping with an optional fallback.
///
/// Looking up a period with no queued entry returns `default` if set,
/// otherwise fails with [`SimError::MissingLeadTime`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadTime {
    queue: IndexMap<i64, i64>,
    default: Option<i64>,
}

impl LeadTime {
    pub fn new(queue: IndexMap<i64, i64>, default: Option<i64>) -> Self {
        Self { queue, default }
    }

    pub fn with_default(default: i64) -> Self {
        Self {
            queue: IndexMap::new(),
            default: Some(default),
        }
    }

    pub fn get(&self, period: i64) -> Result<i64, SimError> {
        if let Some(value) = self.queue.get(&period) {
            return Ok(*value);
        }
        self.default.ok_or(SimError::MissingLeadTime { period })
    }

    /// The explicit `period -> lead time` entries, in insertion order.
    /// Used by the JSON serializer (`io::parse`).
    pub fn queue_entries(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.queue.iter().map(|(k, v)| (*k, *v))
    }

    pub fn default_value(&self) -> Option<i64> {
        self.default
    }
}

impl LeadTimeStrategy for LeadTime {
    fn get_lead_time(&self, period: i64) -> Result<i64, SimError> {
        self.get(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_default_fails_on_missing_period() {
        let lt = LeadTime::default();
        assert!(lt.get(1).is_err());
    }

    #[test]
    fn default_used_for_missing_period() {
        let lt = LeadTime::new(IndexMap::from([(3, 3)]), Some(5));
        assert_eq!(lt.get(1).unwrap(), 5);
        assert_eq!(lt.get(2).unwrap(), 5);
        assert_eq!(lt.get(3).unwrap(), 3);
    }

    #[test]
    fn queue_takes_precedence_over_default() {
        let lt = LeadTime::new(IndexMap::from([(1, 14), (10, 12)]), Some(10));
        assert_eq!(lt.get(1).unwrap(), 14);
        assert_eq!(lt.get(10).unwrap(), 12);
        assert_eq!(lt.get(5).unwrap(), 10);
    }
}
