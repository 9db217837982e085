//! Manual observer - intersection entries are pushed in by the caller.

use std::cell::Cell;

use tracing::debug;

use crate::config::RevealOptions;
use crate::types::RegionId;

use super::{IntersectionCallback, IntersectionEntry, RegistrationTable, ViewportObserver};

/// Observer whose entries are synthesized by the caller.
///
/// Nothing is computed: `deliver` hands the entry straight to the region's
/// callback. Counts every registration so tests can assert that nothing
/// leaks past unmount.
#[derive(Default)]
pub struct ManualObserver {
    table: RegistrationTable,
    observe_calls: Cell<usize>,
    unobserve_calls: Cell<usize>,
}

impl ManualObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an entry to the region's callback.
    /// Returns false if the region is not observed (the entry is dropped).
    pub fn deliver(&self, entry: IntersectionEntry) -> bool {
        self.table.dispatch(&entry)
    }

    /// Deliver the same entry shape to every observed region.
    /// Returns how many callbacks ran.
    pub fn deliver_all(&self, ratio: f32) -> usize {
        self.table
            .regions()
            .into_iter()
            .filter(|region| self.deliver(IntersectionEntry::intersecting(*region, ratio)))
            .count()
    }

    pub fn is_observing(&self, region: RegionId) -> bool {
        self.table.contains(region)
    }

    /// Options the region was registered with.
    pub fn options(&self, region: RegionId) -> Option<RevealOptions> {
        self.table.options(region)
    }

    /// Total `observe` calls over the observer's lifetime.
    pub fn observe_calls(&self) -> usize {
        self.observe_calls.get()
    }

    /// Total `unobserve` calls over the observer's lifetime.
    pub fn unobserve_calls(&self) -> usize {
        self.unobserve_calls.get()
    }
}

impl ViewportObserver for ManualObserver {
    fn observe(&self, region: RegionId, options: &RevealOptions, callback: IntersectionCallback) -> bool {
        self.observe_calls.set(self.observe_calls.get() + 1);
        if !self.table.insert(region, *options, callback) {
            return false;
        }
        debug!(%region, "observe");
        true
    }

    fn unobserve(&self, region: RegionId) {
        self.unobserve_calls.set(self.unobserve_calls.get() + 1);
        if self.table.remove(region) {
            debug!(%region, "unobserve");
        }
    }

    fn active_registrations(&self) -> usize {
        self.table.len()
    }
}
