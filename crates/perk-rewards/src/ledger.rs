use perk_core::{Coins, DayKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-day, per-game-kind coin bookkeeping.
///
/// One ledger instance tracks either settled earnings (cap enforcement) or
/// pending accruals (batched claims); the structure is the same. An absent
/// day or kind reads as zero. Old day keys are retained; `prune_before`
/// exists for an operator job but nothing in the engine calls it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualLedger(BTreeMap<DayKey, BTreeMap<String, Coins>>);

impl AccrualLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add coins for a (day, kind). Values only ever grow within a day.
    pub fn credit(&mut self, day: DayKey, kind: &str, coins: Coins) {
        let entry = self
            .0
            .entry(day)
            .or_default()
            .entry(kind.to_string())
            .or_insert(0);
        *entry += coins;
    }

    /// Coins recorded for a (day, kind).
    pub fn balance(&self, day: DayKey, kind: &str) -> Coins {
        self.0
            .get(&day)
            .and_then(|kinds| kinds.get(kind))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all kinds for a day.
    pub fn day_total(&self, day: DayKey) -> Coins {
        self.0
            .get(&day)
            .map(|kinds| kinds.values().sum())
            .unwrap_or(0)
    }

    /// Per-kind amounts for a day.
    pub fn day_breakdown(&self, day: DayKey) -> BTreeMap<String, Coins> {
        self.0.get(&day).cloned().unwrap_or_default()
    }

    /// Remove a day's entries entirely. Returns true if the day existed.
    pub fn clear_day(&mut self, day: DayKey) -> bool {
        self.0.remove(&day).is_some()
    }

    /// Drop all days strictly before `day`. Returns how many were removed.
    pub fn prune_before(&mut self, day: DayKey) -> usize {
        let keep = self.0.split_off(&day);
        let removed = self.0.len();
        self.0 = keep;
        removed
    }

    /// Number of days with entries.
    pub fn day_count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
