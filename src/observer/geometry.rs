//! Geometry observer - computes intersections from layout rects.
//!
//! Hosts that own their own layout (a terminal page, a canvas) register each
//! region's rect and move the viewport as the user scrolls. After every
//! change the host calls [`GeometryObserver::refresh`], which notifies a
//! region the first time it is evaluated and then whenever it crosses its
//! threshold, the same cadence a browser intersection observer follows.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use tracing::{debug, trace};

use crate::config::RevealOptions;
use crate::types::{Rect, RegionId};

use super::{compute_entry, IntersectionCallback, RegistrationTable, ViewportObserver};

/// Software intersection observer driven by explicit viewport movement.
pub struct GeometryObserver {
    viewport: Cell<Rect>,
    layout: RefCell<HashMap<RegionId, Rect>>,
    /// Last qualifying state per observed region; absent until first evaluated.
    last_state: RefCell<HashMap<RegionId, bool>>,
    table: RegistrationTable,
}

impl GeometryObserver {
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport: Cell::new(viewport),
            layout: RefCell::new(HashMap::new()),
            last_state: RefCell::new(HashMap::new()),
            table: RegistrationTable::default(),
        }
    }

    pub fn viewport(&self) -> Rect {
        self.viewport.get()
    }

    /// Place (or move) a region on the page.
    pub fn set_region(&self, region: RegionId, rect: Rect) {
        self.layout.borrow_mut().insert(region, rect);
    }

    /// Remove a region from the page layout.
    pub fn remove_region(&self, region: RegionId) {
        self.layout.borrow_mut().remove(&region);
    }

    pub fn region_rect(&self, region: RegionId) -> Option<Rect> {
        self.layout.borrow().get(&region).copied()
    }

    /// Scroll the viewport to a vertical page offset and refresh.
    pub fn scroll_to(&self, y: f32) -> usize {
        let mut viewport = self.viewport.get();
        viewport.y = y.max(0.0);
        self.viewport.set(viewport);
        self.refresh()
    }

    /// Scroll the viewport by a vertical delta and refresh.
    pub fn scroll_by(&self, dy: f32) -> usize {
        let y = self.viewport.get().y + dy;
        self.scroll_to(y)
    }

    /// Resize the viewport (keeping its origin) and refresh.
    pub fn resize(&self, width: f32, height: f32) -> usize {
        let mut viewport = self.viewport.get();
        viewport.width = width;
        viewport.height = height;
        self.viewport.set(viewport);
        self.refresh()
    }

    /// Evaluate every observed region against the current viewport and
    /// notify the ones whose qualifying state changed.
    ///
    /// Returns the number of callbacks that ran.
    pub fn refresh(&self) -> usize {
        let viewport = self.viewport.get();
        let mut notified = 0;

        for region in self.table.regions() {
            // A callback earlier in this pass may have unobserved the region
            let Some(options) = self.table.options(region) else {
                continue;
            };
            let Some(rect) = self.region_rect(region) else {
                trace!(%region, "observed region has no layout yet");
                continue;
            };

            let entry = compute_entry(region, rect, viewport, &options);
            let state = entry.qualifies(options.threshold);
            let previous = self.last_state.borrow_mut().insert(region, state);
            if previous == Some(state) {
                continue;
            }

            if self.table.dispatch(&entry) {
                notified += 1;
            }
        }

        notified
    }
}

impl ViewportObserver for GeometryObserver {
    fn observe(&self, region: RegionId, options: &RevealOptions, callback: IntersectionCallback) -> bool {
        if !self.table.insert(region, *options, callback) {
            return false;
        }
        self.last_state.borrow_mut().remove(&region);
        debug!(%region, "observe (geometry)");
        true
    }

    fn unobserve(&self, region: RegionId) {
        self.table.remove(region);
        self.last_state.borrow_mut().remove(&region);
    }

    fn active_registrations(&self) -> usize {
        self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::IntersectionEntry;
    use std::rc::Rc;

    fn setup() -> (GeometryObserver, Rc<RefCell<Vec<IntersectionEntry>>>) {
        let observer = GeometryObserver::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        let log = Rc::new(RefCell::new(Vec::new()));
        (observer, log)
    }

    fn logging(log: &Rc<RefCell<Vec<IntersectionEntry>>>) -> IntersectionCallback {
        let log = log.clone();
        Box::new(move |entry| log.borrow_mut().push(*entry))
    }

    #[test]
    fn test_initial_notification_on_first_refresh() {
        let (observer, log) = setup();
        observer.set_region(RegionId(1), Rect::new(0.0, 1000.0, 800.0, 200.0));
        observer.observe(RegionId(1), &RevealOptions::default(), logging(&log));

        assert_eq!(observer.refresh(), 1);
        assert_eq!(log.borrow().len(), 1);
        assert!(!log.borrow()[0].is_intersecting);

        // Nothing changed - no second notification
        assert_eq!(observer.refresh(), 0);
    }

    #[test]
    fn test_scroll_into_view_notifies() {
        let (observer, log) = setup();
        observer.set_region(RegionId(1), Rect::new(0.0, 1000.0, 800.0, 200.0));
        observer.observe(RegionId(1), &RevealOptions::default(), logging(&log));
        observer.refresh();

        // Region top at viewport-relative 500: 60px past the margin line (560)
        assert_eq!(observer.scroll_to(500.0), 1);
        let last = *log.borrow().last().unwrap();
        assert!(last.qualifies(0.1));
    }

    #[test]
    fn test_margin_delays_notification() {
        let (observer, log) = setup();
        observer.set_region(RegionId(1), Rect::new(0.0, 1000.0, 800.0, 200.0));
        observer.observe(RegionId(1), &RevealOptions::default(), logging(&log));
        observer.refresh();

        // Region top 30px above the raw viewport bottom: still hidden by -40px
        assert_eq!(observer.scroll_to(430.0), 0);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_unobserve_inside_callback() {
        let observer = Rc::new(GeometryObserver::new(Rect::new(0.0, 0.0, 800.0, 600.0)));
        observer.set_region(RegionId(1), Rect::new(0.0, 0.0, 800.0, 100.0));

        let weak = Rc::downgrade(&observer);
        observer.observe(
            RegionId(1),
            &RevealOptions::default(),
            Box::new(move |entry| {
                if let Some(observer) = weak.upgrade() {
                    observer.unobserve(entry.region);
                }
            }),
        );

        assert_eq!(observer.refresh(), 1);
        assert_eq!(observer.active_registrations(), 0);
        assert_eq!(observer.scroll_to(10.0), 0);
    }

    #[test]
    fn test_region_without_layout_is_skipped() {
        let (observer, log) = setup();
        observer.observe(RegionId(5), &RevealOptions::default(), logging(&log));

        assert_eq!(observer.refresh(), 0);

        observer.set_region(RegionId(5), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(observer.refresh(), 1);
    }

    #[test]
    fn test_resize_reveals_region() {
        let (observer, log) = setup();
        observer.set_region(RegionId(1), Rect::new(0.0, 700.0, 800.0, 100.0));
        observer.observe(RegionId(1), &RevealOptions::default(), logging(&log));
        observer.refresh();

        assert_eq!(observer.resize(800.0, 900.0), 1);
        assert!(log.borrow().last().unwrap().qualifies(0.1));
    }

    #[test]
    fn test_scroll_clamps_at_top() {
        let (observer, _log) = setup();
        observer.scroll_by(-50.0);
        assert_eq!(observer.viewport().y, 0.0);
    }
}
