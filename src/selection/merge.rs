//! SelectionMerger - reconcile a prior store against a fresh tree
//!
//! Per id: `unseen -> present -> stale(n) -> removed`.
//!
//! - in the tree, no record: new record with the policy default
//! - in the tree, with a record: decision carried forward, staleness reset
//! - missing from the tree: staleness + 1, dropped once it reaches the
//!   retention threshold
//!
//! Pending import overrides are applied first; one whose id still does not
//! appear ages the same way and expires at the same threshold.

use super::record::SelectionRecord;
use super::store::SelectionStore;
use crate::tree::ComponentTree;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// How new and vanished ids are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePolicy {
    /// Decision for ids seen for the first time
    pub default_included: bool,
    /// Missed merges before a record is dropped. 0 behaves like 1.
    pub retention_threshold: u32,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            default_included: true,
            retention_threshold: 1,
        }
    }
}

impl MergePolicy {
    fn threshold(&self) -> u32 {
        self.retention_threshold.max(1)
    }
}

/// What a merge changed, for user-facing summaries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeReport {
    /// Ids that received a record this run
    pub added: Vec<String>,
    /// Ids whose record was dropped this run
    pub removed: Vec<String>,
    /// Previously known ids still present
    pub retained: usize,
    /// Ids missing this run but kept under the retention threshold
    pub stale: Vec<String>,
    /// Pending import overrides that expired without their id reappearing
    pub expired_overrides: Vec<String>,
}

impl ChangeReport {
    /// No additions and no removals
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionMerger {
    policy: MergePolicy,
}

impl SelectionMerger {
    pub fn new(policy: MergePolicy) -> Self {
        Self { policy }
    }

    /// Reconcile `store` against `tree`
    ///
    /// Running the same tree against the result again changes nothing: the
    /// store's generation only advances when a record is added, dropped, or
    /// changes staleness, or a pending override is consumed.
    pub fn merge(
        &self,
        tree: &ComponentTree,
        mut store: SelectionStore,
    ) -> (SelectionStore, ChangeReport) {
        let mut report = ChangeReport::default();

        if !self.has_work(tree, &store) {
            report.retained = store.selections.len();
            debug!("Selections already match the tree ({} records)", report.retained);
            return (store, report);
        }

        let generation = store.generation + 1;
        store.generation = generation;
        let threshold = self.policy.threshold();
        let mut added = BTreeSet::new();

        // Pending overrides whose id reappeared become records (or replace them)
        for (id, mut decision) in std::mem::take(&mut store.pending) {
            if tree.contains(&id) {
                if !store.selections.contains_key(&id) {
                    added.insert(id.clone());
                }
                store.apply_override(&id, decision);
                continue;
            }

            decision.staleness += 1;
            if decision.staleness >= threshold {
                warn!("Dropping import override for {}: id never reappeared", id);
                report.expired_overrides.push(id);
            } else {
                store.pending.insert(id, decision);
            }
        }

        for id in tree.ids() {
            match store.selections.get_mut(id) {
                Some(record) => {
                    if !added.contains(id) {
                        report.retained += 1;
                    }
                    record.staleness = 0;
                    record.last_seen_at = generation;
                }
                None => {
                    store.selections.insert(
                        id.clone(),
                        SelectionRecord::new(self.policy.default_included, generation),
                    );
                    added.insert(id.clone());
                }
            }
        }

        // Records whose id vanished age toward removal
        let mut kept = BTreeMap::new();
        for (id, mut record) in std::mem::take(&mut store.selections) {
            if tree.contains(&id) {
                kept.insert(id, record);
                continue;
            }

            record.staleness += 1;
            if record.staleness >= threshold {
                debug!("Removing {} after {} missed runs", id, record.staleness);
                report.removed.push(id);
            } else {
                report.stale.push(id.clone());
                kept.insert(id, record);
            }
        }
        store.selections = kept;
        report.added = added.into_iter().collect();

        info!(
            "Merged selections at generation {}: {} added, {} removed, {} retained, {} stale",
            generation,
            report.added.len(),
            report.removed.len(),
            report.retained,
            report.stale.len()
        );
        (store, report)
    }

    fn has_work(&self, tree: &ComponentTree, store: &SelectionStore) -> bool {
        if !store.pending.is_empty() {
            return true;
        }
        if tree.ids().iter().any(|id| {
            store
                .selections
                .get(id)
                .map_or(true, |record| record.staleness > 0)
        }) {
            return true;
        }
        store.selections.keys().any(|id| !tree.contains(id))
    }
}

/// Merge with an explicit policy
pub fn merge(
    tree: &ComponentTree,
    store: SelectionStore,
    policy: &MergePolicy,
) -> (SelectionStore, ChangeReport) {
    SelectionMerger::new(*policy).merge(tree, store)
}
