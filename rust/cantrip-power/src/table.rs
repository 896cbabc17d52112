use std::collections::HashMap;
use std::sync::{Mutex, Weak};

use crate::{Power, PowerCell};

/// Identity-keyed label table for [`Power`]s.
///
/// The first time a Power is labeled it receives the next unused positive
/// integer, starting at 1; every later sighting of the same Power returns
/// the same label. Lookup is by identity, so two structurally identical
/// but separately minted Powers get distinct labels. Labels are never
/// reused or reassigned for the lifetime of the table.
///
/// The table keeps only [`Weak`] references: labeling a Power does not
/// keep it alive. One table is typically shared (behind an `Arc`) by every
/// serialization call in a process; the internal mutex keeps label
/// assignment atomic under concurrent first sightings.
#[derive(Default)]
pub struct PowerTable {
    state: Mutex<TableState>,
}

#[derive(Default)]
struct TableState {
    next_label: u64,
    by_identity: HashMap<usize, u64>,
    by_label: HashMap<u64, Weak<PowerCell>>,
}

impl PowerTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Label a Power, assigning the next unused label on first sight.
    ///
    /// Total over all Powers: there are no error conditions, and the table
    /// grows by at most one entry per call.
    pub fn label(&self, power: &Power) -> u64 {
        let mut state = self.state.lock().expect("lock poisoned");
        // The weak handle stored per label pins the identity allocation
        // (though not the Power's payload), so identity keys are never
        // reused for the lifetime of the table.
        let identity = power.identity();
        if let Some(&label) = state.by_identity.get(&identity) {
            return label;
        }
        state.next_label += 1;
        let label = state.next_label;
        state.by_identity.insert(identity, label);
        state.by_label.insert(label, std::sync::Arc::downgrade(&power.0));
        tracing::trace!(label, "labeled new power");
        label
    }

    /// Look up the live Power previously assigned `label`.
    ///
    /// Returns `None` when the label was never assigned, or when every
    /// outside handle to the Power has been dropped.
    pub fn resolve(&self, label: u64) -> Option<Power> {
        let state = self.state.lock().expect("lock poisoned");
        state.by_label.get(&label)?.upgrade().map(Power)
    }

    /// Whether `label` has ever been assigned, live or not.
    pub fn is_assigned(&self, label: u64) -> bool {
        let state = self.state.lock().expect("lock poisoned");
        state.by_label.contains_key(&label)
    }

    /// Number of labels assigned so far, including ones whose Powers have
    /// since been dropped.
    pub fn len(&self) -> usize {
        let state = self.state.lock().expect("lock poisoned");
        state.by_label.len()
    }

    /// Whether no label has been assigned yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
