//! Reveal Controller - One-shot scroll reveal for a page region
//!
//! A region starts hidden and flips to visible the first time it enters the
//! viewport. The flip is permanent for the mount: the controller unobserves
//! the region as soon as it fires, so scrolling away never re-hides it.
//!
//! # Lifecycle
//!
//! - `attach` registers with the observer, `visible = false`
//! - first qualifying intersection sets `visible = true` and unobserves
//! - `detach` (or drop) unobserves if still registered
//!
//! With no observer available the region is simply visible from the start.
//!
//! # Example
//!
//! ```ignore
//! let reveal = RevealController::attach(Some(observer.clone()), RegionId(3), &options)
//!     .with_delay(RevealDelay::new(2)?);
//!
//! // rendering layer
//! let class = reveal.class_name(Some("card")); // "reveal reveal-d2 card"
//! ```

use std::cell::Cell;
use std::rc::{Rc, Weak};

use serde::Serialize;
use spark_signals::{signal, Signal};
use tracing::{debug, warn};

use crate::config::RevealOptions;
use crate::observer::{IntersectionCallback, ViewportObserver};
use crate::types::{RegionId, RevealDelay};

/// Serializable reveal state for a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealView {
    pub region: RegionId,
    pub visible: bool,
    pub delay: Option<u8>,
    pub class_name: String,
}

/// Scroll-triggered reveal for one region.
pub struct RevealController {
    region: RegionId,
    delay: Option<RevealDelay>,
    visible: Signal<bool>,
    /// True while the observer holds our callback.
    attached: Rc<Cell<bool>>,
    observer: Option<Weak<dyn ViewportObserver>>,
}

impl RevealController {
    /// Start watching `region`.
    ///
    /// `None` (or an observer that refuses the region) degrades to an
    /// always-visible region; construction never fails.
    pub fn attach(
        observer: Option<Rc<dyn ViewportObserver>>,
        region: RegionId,
        options: &RevealOptions,
    ) -> Self {
        let visible = signal(false);
        let attached = Rc::new(Cell::new(false));

        let Some(observer) = observer else {
            warn!(%region, "viewport observer unavailable, region shown immediately");
            visible.set(true);
            return Self {
                region,
                delay: None,
                visible,
                attached,
                observer: None,
            };
        };

        let weak = Rc::downgrade(&observer);
        let callback = reveal_callback(options.threshold, visible.clone(), attached.clone(), weak.clone());

        // Set before observing: a host may deliver synchronously
        attached.set(true);
        if observer.observe(region, options, callback) {
            debug!(%region, threshold = options.threshold, margin = %options.root_margin, "reveal attached");
        } else {
            attached.set(false);
            warn!(%region, "observer refused region, region shown immediately");
            visible.set(true);
        }

        Self {
            region,
            delay: None,
            visible,
            attached,
            observer: Some(weak),
        }
    }

    /// Set the stagger rank used by the presentation class.
    pub fn with_delay(mut self, delay: RevealDelay) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn region(&self) -> RegionId {
        self.region
    }

    pub fn delay(&self) -> Option<RevealDelay> {
        self.delay
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    /// The visibility flag as a signal, for reactive rendering.
    pub fn visible_signal(&self) -> Signal<bool> {
        self.visible.clone()
    }

    /// Whether the region is still registered with the observer.
    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    /// Stop observing. Safe to call any number of times, revealed or not.
    pub fn detach(&self) {
        if !self.attached.replace(false) {
            return;
        }
        if let Some(observer) = self.observer.as_ref().and_then(Weak::upgrade) {
            observer.unobserve(self.region);
        }
        debug!(region = %self.region, "reveal detached");
    }

    /// Presentation class: `reveal`, then `visible` once shown, then the
    /// delay class, then `extra` when non-empty.
    pub fn class_name(&self, extra: Option<&str>) -> String {
        let mut class = String::from("reveal");
        if self.is_visible() {
            class.push_str(" visible");
        }
        if let Some(delay) = self.delay {
            class.push(' ');
            class.push_str(&delay.class_name());
        }
        if let Some(extra) = extra.filter(|extra| !extra.is_empty()) {
            class.push(' ');
            class.push_str(extra);
        }
        class
    }

    pub fn view(&self, extra: Option<&str>) -> RevealView {
        RevealView {
            region: self.region,
            visible: self.is_visible(),
            delay: self.delay.map(RevealDelay::rank),
            class_name: self.class_name(extra),
        }
    }
}

impl Drop for RevealController {
    fn drop(&mut self) {
        self.detach();
    }
}

fn reveal_callback(
    threshold: f32,
    visible: Signal<bool>,
    attached: Rc<Cell<bool>>,
    observer: Weak<dyn ViewportObserver>,
) -> IntersectionCallback {
    Box::new(move |entry| {
        // Late delivery after detach
        if !attached.get() {
            return;
        }
        if !entry.qualifies(threshold) {
            return;
        }

        visible.set(true);
        attached.set(false);
        if let Some(observer) = observer.upgrade() {
            observer.unobserve(entry.region);
        }
        debug!(region = %entry.region, ratio = entry.ratio, "region revealed");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{GeometryObserver, IntersectionEntry, ManualObserver};
    use crate::types::Rect;
    use spark_signals::effect;
    use std::cell::RefCell;

    /// Host that keeps a callback around after it was unobserved.
    #[derive(Default)]
    struct LaggingObserver {
        callback: RefCell<Option<IntersectionCallback>>,
    }

    impl ViewportObserver for LaggingObserver {
        fn observe(&self, _region: RegionId, _options: &RevealOptions, callback: IntersectionCallback) -> bool {
            *self.callback.borrow_mut() = Some(callback);
            true
        }

        fn unobserve(&self, _region: RegionId) {}

        fn active_registrations(&self) -> usize {
            usize::from(self.callback.borrow().is_some())
        }
    }

    fn setup() -> Rc<ManualObserver> {
        Rc::new(ManualObserver::new())
    }

    fn attach(observer: &Rc<ManualObserver>, region: u32) -> RevealController {
        RevealController::attach(Some(observer.clone()), RegionId(region), &RevealOptions::default())
    }

    #[test]
    fn test_starts_hidden_and_attached() {
        let observer = setup();
        let reveal = attach(&observer, 1);

        assert!(!reveal.is_visible());
        assert!(reveal.is_attached());
        assert!(observer.is_observing(RegionId(1)));
    }

    #[test]
    fn test_registers_reference_options() {
        let observer = setup();
        let _reveal = attach(&observer, 1);

        let options = observer.options(RegionId(1)).unwrap();
        assert!((options.threshold - 0.1).abs() < f32::EPSILON);
        assert_eq!(options.root_margin.bottom, -40.0);
    }

    #[test]
    fn test_first_intersection_reveals_and_unobserves() {
        let observer = setup();
        let reveal = attach(&observer, 1);

        assert!(observer.deliver(IntersectionEntry::intersecting(RegionId(1), 0.5)));

        assert!(reveal.is_visible());
        assert!(!reveal.is_attached());
        assert_eq!(observer.active_registrations(), 0);
    }

    #[test]
    fn test_stays_visible_after_leaving() {
        let observer = setup();
        let reveal = attach(&observer, 1);

        observer.deliver(IntersectionEntry::intersecting(RegionId(1), 1.0));
        observer.deliver(IntersectionEntry::outside(RegionId(1)));
        observer.deliver(IntersectionEntry::intersecting(RegionId(1), 0.0));

        assert!(reveal.is_visible());
    }

    #[test]
    fn test_below_threshold_does_not_reveal() {
        let observer = setup();
        let reveal = attach(&observer, 1);

        observer.deliver(IntersectionEntry::intersecting(RegionId(1), 0.05));
        observer.deliver(IntersectionEntry::outside(RegionId(1)));

        assert!(!reveal.is_visible());
        assert!(reveal.is_attached());
    }

    #[test]
    fn test_detach_before_intersection() {
        let observer = setup();
        let reveal = attach(&observer, 1);

        reveal.detach();
        let delivered = observer.deliver(IntersectionEntry::intersecting(RegionId(1), 1.0));

        assert!(!delivered);
        assert!(!reveal.is_visible());
        assert_eq!(observer.active_registrations(), 0);
    }

    #[test]
    fn test_late_delivery_after_detach_is_ignored() {
        let host = Rc::new(LaggingObserver::default());
        let reveal = RevealController::attach(Some(host.clone()), RegionId(1), &RevealOptions::default());

        reveal.detach();
        let mut callback = host.callback.borrow_mut().take().unwrap();
        callback(&IntersectionEntry::intersecting(RegionId(1), 1.0));

        assert!(!reveal.is_visible());
        assert!(!reveal.is_attached());
    }

    #[test]
    fn test_shared_region_second_controller_degrades() {
        let observer = setup();
        let first = attach(&observer, 1);
        let second = attach(&observer, 1);

        assert!(first.is_attached());
        assert!(!second.is_attached());
        assert!(second.is_visible());
        assert_eq!(observer.active_registrations(), 1);

        // Dropping the refused controller must not take the other's registration
        drop(second);
        assert!(observer.is_observing(RegionId(1)));

        observer.deliver(IntersectionEntry::intersecting(RegionId(1), 1.0));
        assert!(first.is_visible());
        assert_eq!(observer.active_registrations(), 0);
    }

    #[test]
    fn test_shared_region_first_detach_leaves_nothing_stranded() {
        let observer = setup();
        let first = attach(&observer, 1);
        let second = attach(&observer, 1);

        first.detach();

        assert_eq!(observer.active_registrations(), 0);
        assert!(!second.is_attached());
        assert!(second.is_visible());
        assert!(!first.is_visible());
    }

    #[test]
    fn test_detach_is_idempotent() {
        let observer = setup();
        let reveal = attach(&observer, 1);

        reveal.detach();
        reveal.detach();
        reveal.detach();

        assert_eq!(observer.unobserve_calls(), 1);
    }

    #[test]
    fn test_detach_after_reveal_is_noop() {
        let observer = setup();
        let reveal = attach(&observer, 1);

        observer.deliver(IntersectionEntry::intersecting(RegionId(1), 1.0));
        reveal.detach();

        // Only the self-detach inside the callback
        assert_eq!(observer.unobserve_calls(), 1);
        assert!(reveal.is_visible());
    }

    #[test]
    fn test_drop_releases_registration() {
        let observer = setup();
        {
            let _a = attach(&observer, 1);
            let _b = attach(&observer, 2);
            assert_eq!(observer.active_registrations(), 2);
        }
        assert_eq!(observer.active_registrations(), 0);
    }

    #[test]
    fn test_missing_observer_degrades_to_visible() {
        let reveal = RevealController::attach(None, RegionId(1), &RevealOptions::default());

        assert!(reveal.is_visible());
        assert!(!reveal.is_attached());
        reveal.detach();
    }

    #[test]
    fn test_observer_dropped_before_controller() {
        let observer = setup();
        let reveal = attach(&observer, 1);
        drop(observer);

        // Weak handle is dead; detach must not panic
        reveal.detach();
        assert!(!reveal.is_attached());
    }

    #[test]
    fn test_class_name() {
        let observer = setup();
        let reveal = attach(&observer, 1).with_delay(RevealDelay::new(2).unwrap());

        assert_eq!(reveal.class_name(None), "reveal reveal-d2");
        assert_eq!(reveal.class_name(Some("")), "reveal reveal-d2");

        observer.deliver(IntersectionEntry::intersecting(RegionId(1), 1.0));
        assert_eq!(reveal.class_name(Some("bento-card")), "reveal visible reveal-d2 bento-card");
    }

    #[test]
    fn test_view_serializes() {
        let observer = setup();
        let reveal = attach(&observer, 7);
        observer.deliver(IntersectionEntry::intersecting(RegionId(7), 1.0));

        let json = serde_json::to_value(reveal.view(None)).unwrap();
        assert_eq!(json["region"], 7);
        assert_eq!(json["visible"], true);
        assert_eq!(json["class_name"], "reveal visible");
        assert!(json["delay"].is_null());
    }

    #[test]
    fn test_visible_signal_drives_effects() {
        let observer = setup();
        let reveal = attach(&observer, 1);

        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();
        let visible = reveal.visible_signal();
        let _effect = effect(move || {
            let _ = visible.get();
            runs_clone.set(runs_clone.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        observer.deliver(IntersectionEntry::intersecting(RegionId(1), 1.0));
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_with_geometry_observer() {
        let observer = Rc::new(GeometryObserver::new(Rect::new(0.0, 0.0, 800.0, 600.0)));
        observer.set_region(RegionId(1), Rect::new(0.0, 1200.0, 800.0, 300.0));

        let reveal = RevealController::attach(Some(observer.clone()), RegionId(1), &RevealOptions::default());
        observer.refresh();
        assert!(!reveal.is_visible());

        observer.scroll_to(700.0);
        assert!(reveal.is_visible());
        assert_eq!(observer.active_registrations(), 0);

        observer.scroll_to(0.0);
        assert!(reveal.is_visible());
    }
}
