//! In-transit shipments and the per-node pipeline that holds them.

use serde::{Deserialize, Serialize};

/// An in-transit shipment of `quantity` units of `sku_code`, arriving in
/// `eta` periods (`eta == 0` means "arrives this period").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub sku_code: String,
    pub eta: i64,
    pub quantity: i64,
}

impl Receipt {
    pub fn new(sku_code: impl Into<String>, eta: i64, quantity: i64) -> Self {
        Self {
            sku_code: sku_code.into(),
            eta,
            quantity,
        }
    }
}

impl std::fmt::Display for Receipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Receipt(sku_code={}, eta={}, quantity={})",
            self.sku_code, self.eta, self.quantity
        )
    }
}

/// Insertion-ordered queue of receipts in transit to a single node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    receipts: Vec<Receipt>,
}

impl Pipeline {
    pub fn new(receipts: Vec<Receipt>) -> Self {
        Self { receipts }
    }

    pub fn add(&mut self, receipt: Receipt) {
        self.receipts.push(receipt);
    }

    /// Decrement every receipt's `eta` by one period.
    pub fn age(&mut self) {
        for receipt in &mut self.receipts {
            receipt.eta -= 1;
        }
    }

    /// Remove and return all receipts whose ETA has elapsed (`eta <= 0`),
    /// preserving the relative order of the ones that remain.
    pub fn pop_received(&mut self) -> Vec<Receipt> {
        let (received, remaining): (Vec<_>, Vec<_>) =
            self.receipts.drain(..).partition(|r| r.eta <= 0);
        self.receipts = remaining;
        received
    }

    pub fn iter(&self) -> impl Iterator<Item = &Receipt> {
        self.receipts.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.receipts.len()
    }
}

impl<'a> IntoIterator for &'a Pipeline {
    type Item = &'a Receipt;
    type IntoIter = std::slice::Iter<'a, Receipt>;

    fn into_iter(self) -> Self::IntoIter {
        self.receipts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_decrements_all_etas() {
        let mut pipeline = Pipeline::new(vec![
            Receipt::new("A", 2, 5),
            Receipt::new("B", 0, 3),
        ]);
        pipeline.age();
        assert_eq!(pipeline.receipts[0].eta, 1);
        assert_eq!(pipeline.receipts[1].eta, -1);
    }

    #[test]
    fn pop_received_keeps_remaining_order() {
        let mut pipeline = Pipeline::new(vec![
            Receipt::new("A", 0, 8),
            Receipt::new("B", 0, 9),
            Receipt::new("A", 8, 10),
        ]);
        let received = pipeline.pop_received();
        assert_eq!(received, vec![Receipt::new("A", 0, 8), Receipt::new("B", 0, 9)]);
        assert_eq!(pipeline.receipts, vec![Receipt::new("A", 8, 10)]);
    }
}
