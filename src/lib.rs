//! # spark-folio
//!
//! Reactive runtime components for a portfolio site.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! A portfolio page is mostly inert markup. The pieces with runtime behavior
//! are small components, each owning its own state and subscriptions:
//!
//! ```text
//! ViewportObserver ──▶ RevealController ──▶ visible: Signal<bool>
//! Scheduler + WallClock ──▶ LiveClockTicker ──▶ Signal<TickerState>
//! user selection ──▶ CatalogFilter ──▶ Signal<FilterState> ──▶ visible entries
//! ```
//!
//! Host capabilities (viewport intersection, timers, wall clock) sit behind
//! small traits, so a browser binding, a terminal host and a test harness can
//! all drive the same components.
//!
//! ## Modules
//!
//! - [`types`] - Region handles, geometry, root-margin edges, delay ranks
//! - [`config`] - Reveal and ticker configuration (JSON)
//! - [`observer`] - Viewport intersection capability and implementations
//! - [`scheduler`] - Cancellable periodic tasks (virtual and realtime)
//! - [`clock`] - Wall-clock source and calendar names
//! - [`components`] - RevealController, LiveClockTicker, CatalogFilter

pub mod clock;
pub mod components;
pub mod config;
pub mod error;
pub mod observer;
pub mod scheduler;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{FolioError, Result};

pub use config::{FolioConfig, RevealOptions, TickerConfig};

pub use observer::{
    compute_entry, GeometryObserver, IntersectionCallback, IntersectionEntry, ManualObserver,
    ViewportObserver,
};

pub use scheduler::{RealtimeScheduler, Scheduler, Task, TaskId, VirtualScheduler};

pub use clock::{ClockReading, ManualClock, SystemClock, WallClock, DAY_NAMES, MONTH_NAMES};

pub use components::{
    // Reveal
    RevealController, RevealView,
    // Ticker
    ClockView, LiveClockTicker, TickerAction, TickerChanges, TickerItem, TickerState,
    // Catalog
    CatalogEntry, CatalogFilter, CategoryKey, FilterAction, FilterState, FilterView,
    ALL_CATEGORIES,
};
