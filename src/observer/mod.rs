//! Viewport Observer - Intersection capability for reveal regions
//!
//! The reveal controller never talks to a host visibility API directly.
//! It goes through [`ViewportObserver`], a two-call capability
//! (`observe` / `unobserve`) that any host can implement:
//!
//! - [`ManualObserver`] - delivers synthesized entries (tests, scripted hosts)
//! - [`GeometryObserver`] - computes entries from region and viewport rects
//!   as the viewport scrolls (terminal and canvas hosts)
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use spark_folio::observer::{ManualObserver, IntersectionEntry};
//!
//! let observer = Rc::new(ManualObserver::new());
//! let reveal = RevealController::attach(Some(observer.clone()), RegionId(1), &options);
//!
//! observer.deliver(IntersectionEntry::intersecting(RegionId(1), 0.5));
//! assert!(reveal.is_visible());
//! ```

mod geometry;
mod intersection;
mod manual;

pub use geometry::GeometryObserver;
pub use intersection::compute_entry;
pub use manual::ManualObserver;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{trace, warn};

use crate::config::RevealOptions;
use crate::types::RegionId;

// =============================================================================
// TYPES
// =============================================================================

/// One intersection notification for a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub region: RegionId,
    /// Visible fraction of the region, 0.0..=1.0.
    pub ratio: f32,
    /// Whether the region touches the (margin-adjusted) viewport at all.
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    /// Entry for a region overlapping the viewport by `ratio`.
    pub fn intersecting(region: RegionId, ratio: f32) -> Self {
        Self {
            region,
            ratio: ratio.clamp(0.0, 1.0),
            is_intersecting: true,
        }
    }

    /// Entry for a region entirely outside the viewport.
    pub fn outside(region: RegionId) -> Self {
        Self {
            region,
            ratio: 0.0,
            is_intersecting: false,
        }
    }

    /// Whether this entry counts as "in view" for the given threshold.
    pub fn qualifies(&self, threshold: f32) -> bool {
        self.is_intersecting && self.ratio >= threshold
    }
}

/// Callback invoked with each intersection entry for a region.
pub type IntersectionCallback = Box<dyn FnMut(&IntersectionEntry)>;

// =============================================================================
// CAPABILITY
// =============================================================================

/// Host capability for watching region visibility.
///
/// Implementations must tolerate `unobserve` being called from inside a
/// callback, and for regions that were never observed.
pub trait ViewportObserver {
    /// Start observing `region`.
    ///
    /// Returns `false` when the host cannot observe the region, including
    /// when it is already observed; the existing registration is left
    /// untouched and callers fall back to treating the region as visible.
    fn observe(&self, region: RegionId, options: &RevealOptions, callback: IntersectionCallback) -> bool;

    /// Stop observing `region`. No-op if it is not observed.
    fn unobserve(&self, region: RegionId);

    /// Number of regions currently observed.
    fn active_registrations(&self) -> usize;
}

// =============================================================================
// REGISTRATION TABLE
// =============================================================================

struct Registration {
    options: RevealOptions,
    callback: Rc<RefCell<IntersectionCallback>>,
}

/// Region → callback table shared by the observer implementations.
///
/// One registration per region; a second insert for the same region is
/// refused. Dispatch clones the callback handle out before invoking it, so
/// callbacks are free to unobserve while running.
#[derive(Default)]
pub(crate) struct RegistrationTable {
    entries: RefCell<BTreeMap<RegionId, Registration>>,
}

impl RegistrationTable {
    /// Register `callback` for `region`. Returns false if the region already
    /// has a registration.
    pub(crate) fn insert(&self, region: RegionId, options: RevealOptions, callback: IntersectionCallback) -> bool {
        let mut entries = self.entries.borrow_mut();
        if entries.contains_key(&region) {
            warn!(%region, "region already observed, registration refused");
            return false;
        }
        entries.insert(
            region,
            Registration {
                options,
                callback: Rc::new(RefCell::new(callback)),
            },
        );
        true
    }

    pub(crate) fn remove(&self, region: RegionId) -> bool {
        self.entries.borrow_mut().remove(&region).is_some()
    }

    pub(crate) fn contains(&self, region: RegionId) -> bool {
        self.entries.borrow().contains_key(&region)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub(crate) fn options(&self, region: RegionId) -> Option<RevealOptions> {
        self.entries.borrow().get(&region).map(|r| r.options)
    }

    pub(crate) fn regions(&self) -> Vec<RegionId> {
        self.entries.borrow().keys().copied().collect()
    }

    /// Invoke the callback registered for `entry.region`.
    /// Returns false if the region is not observed.
    pub(crate) fn dispatch(&self, entry: &IntersectionEntry) -> bool {
        let callback = match self.entries.borrow().get(&entry.region) {
            Some(registration) => registration.callback.clone(),
            None => return false,
        };

        match callback.try_borrow_mut() {
            Ok(mut callback) => {
                trace!(region = %entry.region, ratio = entry.ratio, "dispatch intersection");
                callback(entry);
                true
            }
            Err(_) => {
                warn!(region = %entry.region, "re-entrant intersection dispatch dropped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_entry_qualifies() {
        let region = RegionId(1);

        assert!(IntersectionEntry::intersecting(region, 0.1).qualifies(0.1));
        assert!(IntersectionEntry::intersecting(region, 1.0).qualifies(0.1));
        assert!(!IntersectionEntry::intersecting(region, 0.05).qualifies(0.1));
        assert!(!IntersectionEntry::outside(region).qualifies(0.0));
    }

    #[test]
    fn test_entry_ratio_clamped() {
        let entry = IntersectionEntry::intersecting(RegionId(1), 3.0);
        assert_eq!(entry.ratio, 1.0);
    }

    #[test]
    fn test_table_dispatch_and_remove() {
        let table = RegistrationTable::default();
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();

        assert!(table.insert(
            RegionId(1),
            RevealOptions::default(),
            Box::new(move |_| hits_clone.set(hits_clone.get() + 1)),
        ));

        assert!(table.dispatch(&IntersectionEntry::intersecting(RegionId(1), 1.0)));
        assert!(!table.dispatch(&IntersectionEntry::intersecting(RegionId(2), 1.0)));
        assert_eq!(hits.get(), 1);

        assert!(table.remove(RegionId(1)));
        assert!(!table.remove(RegionId(1)));
        assert!(!table.dispatch(&IntersectionEntry::intersecting(RegionId(1), 1.0)));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_table_refuses_second_registration() {
        let table = RegistrationTable::default();
        let hits = Rc::new(Cell::new(0));
        let first = hits.clone();

        assert!(table.insert(RegionId(1), RevealOptions::default(), Box::new(move |_| first.set(first.get() + 1))));
        assert!(!table.insert(RegionId(1), RevealOptions::default().with_threshold(0.9), Box::new(|_| {})));

        assert_eq!(table.len(), 1);
        assert_eq!(table.options(RegionId(1)), Some(RevealOptions::default()));
        table.dispatch(&IntersectionEntry::intersecting(RegionId(1), 1.0));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_table_callback_may_remove_itself() {
        let table = Rc::new(RegistrationTable::default());
        let table_clone = table.clone();

        table.insert(
            RegionId(3),
            RevealOptions::default(),
            Box::new(move |entry| {
                table_clone.remove(entry.region);
            }),
        );

        assert!(table.dispatch(&IntersectionEntry::intersecting(RegionId(3), 1.0)));
        assert_eq!(table.len(), 0);
    }
}
