//! A weighted predecessor relation between two nodes.

use crate::error::SimError;
use serde::{Deserialize, Serialize};

/// Relation between a predecessor (`source`) and a successor (`destination`).
///
/// `number` is the quantity of `source` consumed to assemble one unit of
/// `destination`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub destination: String,
    pub number: i64,
}

impl Edge {
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        number: i64,
    ) -> Result<Self, SimError> {
        if number < 1 {
            return Err(SimError::Parse {
                message: format!("edge number must be >= 1, got {number}"),
            });
        }
        Ok(Self {
            source: source.into(),
            destination: destination.into(),
            number,
        })
    }

    /// Identity used as a key in the edge set: `"{source}->{destination}"`.
    pub fn id(&self) -> String {
        format!("{}->{}", self.source, self.destination)
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}: {}", self.source, self.destination, self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_number() {
        assert!(Edge::new("A", "B", 0).is_err());
        assert!(Edge::new("A", "B", -1).is_err());
        assert!(Edge::new("A", "B", 1).is_ok());
    }

    #[test]
    fn id_format() {
        let edge = Edge::new("B", "A", 2).unwrap();
        assert_eq!(edge.id(), "B->A");
    }
}
