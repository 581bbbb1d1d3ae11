use {
    osc_core::{Datatype, DatatypeId, Operator, OperatorId},
    std::collections::BTreeMap,
};

/// Accumulated outcomes for one `(datatype, operator)` pair. Trial numbers are 1-based.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct LedgerEntry {
    pub trials: usize,
    pub validations_performed: usize,
    pub validation_failures: usize,
    pub first_failure: Option<usize>,
    pub last_failure: Option<usize>,
}

impl LedgerEntry {
    pub fn passed(&self) -> bool {
        self.validation_failures == 0 && self.validations_performed == self.trials
    }

    pub fn skipped(&self) -> bool {
        self.validation_failures == 0 && self.validations_performed < self.trials
    }
}

#[derive(Clone, Debug, Default)]
pub struct Ledger {
    entries: BTreeMap<(DatatypeId, OperatorId), LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one trial. `checked` is false when no validation could be performed.
    pub fn record(&mut self, datatype: Datatype, operator: Operator, checked: bool, failed: bool) {
        let entry = self
            .entries
            .entry((datatype.into(), operator.into()))
            .or_default();
        entry.trials += 1;
        if checked {
            entry.validations_performed += 1;
        }
        if failed {
            entry.validation_failures += 1;
            if entry.first_failure.is_none() {
                entry.first_failure = Some(entry.trials);
            }
            entry.last_failure = Some(entry.trials);
        }
    }

    pub fn get(&self, datatype: Datatype, operator: Operator) -> Option<&LedgerEntry> {
        self.entries.get(&(datatype.into(), operator.into()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Datatype, Operator, &LedgerEntry)> + '_ {
        self.entries
            .iter()
            .map(|(&(dt, op), entry)| (dt.into(), op.into(), entry))
    }

    /// Empties the ledger, yielding every entry exactly once.
    pub fn drain(&mut self) -> impl Iterator<Item = (Datatype, Operator, LedgerEntry)> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .map(|((dt, op), entry)| (dt.into(), op.into(), entry))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
