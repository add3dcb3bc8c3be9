use chrono::NaiveDate;
use std::collections::HashMap;

/// Index into a [`LabelSet`].
pub type LabelId = u32;

/// Interned set of observed label values, in first-seen order.
///
/// The currency and counterparty columns take values from a small finite set,
/// so rows store ids and the distinct strings live here once.
#[derive(Debug, Default)]
pub struct LabelSet {
    labels: Vec<String>,
    index: HashMap<String, LabelId>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `value`, inserting it on first sight.
    pub fn intern(&mut self, value: &str) -> LabelId {
        if let Some(&id) = self.index.get(value) {
            return id;
        }
        let id = self.labels.len() as LabelId;
        self.labels.push(value.to_string());
        self.index.insert(value.to_string(), id);
        id
    }

    pub fn get(&self, id: LabelId) -> &str {
        &self.labels[id as usize]
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

/// One fully-typed statement line.
///
/// Amounts are minor currency units (fen, 0.01 元), truncated, never floats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub date: NaiveDate,
    pub currency: LabelId,
    pub amount_cents: i64,
    pub balance_cents: i64,
    pub summary: String,
    pub counterparty: LabelId,
}

/// The cleaned statement: every extracted page fragment, merged, normalized
/// and typed, in the statement's original (chronological) row order.
#[derive(Debug, Default)]
pub struct Statement {
    pub records: Vec<Record>,
    pub currencies: LabelSet,
    pub counterparties: LabelSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_dedupes_and_preserves_first_seen_order() {
        let mut set = LabelSet::new();
        let a = set.intern("招商银行");
        let b = set.intern("支付宝");
        let a2 = set.intern("招商银行");
        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(a), "招商银行");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["招商银行", "支付宝"]);
    }
}
