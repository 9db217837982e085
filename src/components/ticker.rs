//! Live Clock Ticker - Advancing local time plus a rotating highlight
//!
//! Two independent periodic tasks drive the ticker:
//!
//! - clock task (1s): re-reads the wall clock into hours/minutes/seconds
//! - rotation task (4s): advances the highlighted item, wrapping at the end
//!
//! A user can jump to any item with [`LiveClockTicker::select`]; the rotation
//! task keeps its own period and simply continues from the chosen index.
//!
//! All state changes go through [`TickerState::reduce`], so the transitions
//! are testable without any timer at all.
//!
//! # Example
//!
//! ```ignore
//! let ticker = LiveClockTicker::mount(items, Rc::new(SystemClock), scheduler.clone(), &config.ticker);
//!
//! // host loop
//! scheduler.pump();
//! if !ticker.take_changes().is_empty() {
//!     redraw(ticker.view());
//! }
//!
//! ticker.unmount();
//! ```

use std::cell::Cell;
use std::rc::Rc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use spark_signals::{derived, signal, Derived, Signal};
use tracing::{debug, trace, warn};

use crate::clock::{ClockReading, WallClock};
use crate::config::TickerConfig;
use crate::scheduler::{Scheduler, TaskId};

// =============================================================================
// TYPES
// =============================================================================

/// One entry of the ticker's fixed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerItem {
    pub name: String,
    #[serde(default)]
    pub label: String,
}

impl TickerItem {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

bitflags! {
    /// Ticker view fields changed since the host last looked.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TickerChanges: u8 {
        const TIME = 1 << 0;
        const ACTIVE = 1 << 1;
    }
}

/// Serializable ticker state for a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockView {
    pub time: String,
    pub day: &'static str,
    pub month_day: String,
    pub active_index: usize,
    pub active: Option<TickerItem>,
}

// =============================================================================
// REDUCER
// =============================================================================

/// Transitions of the ticker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerAction {
    /// Fresh wall-clock reading (clock task).
    Tick(ClockReading),
    /// Advance the highlight by one (rotation task).
    Rotate,
    /// Jump to an index (user selection).
    Select(usize),
}

/// Clock fields plus the highlighted index into a list of `len` items.
///
/// `active_index` is always `< len` (or 0 for an empty list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickerState {
    pub reading: ClockReading,
    pub active_index: usize,
    pub len: usize,
}

impl TickerState {
    pub fn new(reading: ClockReading, len: usize) -> Self {
        Self {
            reading,
            active_index: 0,
            len,
        }
    }

    pub fn reduce(self, action: TickerAction) -> Self {
        match action {
            TickerAction::Tick(reading) => Self { reading, ..self },
            TickerAction::Rotate => Self {
                active_index: self.wrap(self.active_index + 1),
                ..self
            },
            TickerAction::Select(index) => Self {
                active_index: self.wrap(index),
                ..self
            },
        }
    }

    fn wrap(&self, index: usize) -> usize {
        if self.len == 0 { 0 } else { index % self.len }
    }

    fn changes_from(&self, before: &Self) -> TickerChanges {
        let mut changes = TickerChanges::empty();
        if self.reading != before.reading {
            changes |= TickerChanges::TIME;
        }
        if self.active_index != before.active_index {
            changes |= TickerChanges::ACTIVE;
        }
        changes
    }
}

/// Apply one action to the signal-held state, recording what changed.
fn apply(state: &Signal<TickerState>, changes: &Cell<TickerChanges>, action: TickerAction) -> TickerChanges {
    let before = state.get();
    let after = before.reduce(action);
    let changed = after.changes_from(&before);
    if !changed.is_empty() {
        state.set(after);
        changes.set(changes.get() | changed);
    }
    changed
}

// =============================================================================
// COMPONENT
// =============================================================================

/// Mounted clock + rotating ticker.
pub struct LiveClockTicker {
    items: Rc<[TickerItem]>,
    state: Signal<TickerState>,
    changes: Rc<Cell<TickerChanges>>,
    /// Cleared on unmount; tasks check it before touching state.
    alive: Rc<Cell<bool>>,
    scheduler: Rc<dyn Scheduler>,
    clock_task: Option<TaskId>,
    rotation_task: Option<TaskId>,
}

impl LiveClockTicker {
    /// Capture the current time and start both periodic tasks.
    pub fn mount(
        items: Vec<TickerItem>,
        clock: Rc<dyn WallClock>,
        scheduler: Rc<dyn Scheduler>,
        config: &TickerConfig,
    ) -> Self {
        let items: Rc<[TickerItem]> = Rc::from(items);
        let state = signal(TickerState::new(clock.reading(), items.len()));
        let changes = Rc::new(Cell::new(TickerChanges::empty()));
        let alive = Rc::new(Cell::new(true));

        let clock_task = {
            let state = state.clone();
            let changes = changes.clone();
            let alive = alive.clone();
            scheduler.schedule_repeating(
                config.clock_period(),
                Box::new(move || {
                    if !alive.get() {
                        return;
                    }
                    let reading = clock.reading();
                    trace!(time = %reading.hh_mm_ss(), "clock tick");
                    apply(&state, &changes, TickerAction::Tick(reading));
                }),
            )
        };

        let rotation_task = {
            let state = state.clone();
            let changes = changes.clone();
            let alive = alive.clone();
            scheduler.schedule_repeating(
                config.rotation_period(),
                Box::new(move || {
                    if !alive.get() {
                        return;
                    }
                    apply(&state, &changes, TickerAction::Rotate);
                }),
            )
        };

        if clock_task.is_none() || rotation_task.is_none() {
            warn!("ticker timers unavailable, display will not advance on its own");
        }
        debug!(items = items.len(), "ticker mounted");

        Self {
            items,
            state,
            changes,
            alive,
            scheduler,
            clock_task,
            rotation_task,
        }
    }

    pub fn state(&self) -> TickerState {
        self.state.get()
    }

    /// The state as a signal, for reactive rendering.
    pub fn state_signal(&self) -> Signal<TickerState> {
        self.state.clone()
    }

    /// Formatted `hh:mm:ss` that recomputes on every clock tick.
    pub fn time_derived(&self) -> Derived<String> {
        let state = self.state.clone();
        derived(move || state.get().reading.hh_mm_ss())
    }

    pub fn reading(&self) -> ClockReading {
        self.state.get().reading
    }

    pub fn active_index(&self) -> usize {
        self.state.get().active_index
    }

    pub fn items(&self) -> &[TickerItem] {
        &self.items
    }

    pub fn active_item(&self) -> Option<&TickerItem> {
        self.items.get(self.active_index())
    }

    /// Highlight item `index` (wrapped into range). Does not touch the
    /// rotation task's schedule.
    pub fn select(&self, index: usize) {
        self.dispatch(TickerAction::Select(index));
    }

    /// Apply an action directly. Ignored once unmounted.
    pub fn dispatch(&self, action: TickerAction) -> TickerChanges {
        if !self.alive.get() {
            return TickerChanges::empty();
        }
        apply(&self.state, &self.changes, action)
    }

    /// Changes accumulated since the previous call.
    pub fn take_changes(&self) -> TickerChanges {
        self.changes.replace(TickerChanges::empty())
    }

    pub fn is_mounted(&self) -> bool {
        self.alive.get()
    }

    pub fn view(&self) -> ClockView {
        let state = self.state.get();
        ClockView {
            time: state.reading.hh_mm_ss(),
            day: state.reading.day_name(),
            month_day: state.reading.month_day(),
            active_index: state.active_index,
            active: self.items.get(state.active_index).cloned(),
        }
    }

    /// Cancel both tasks and stop accepting updates.
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        self.alive.set(false);
        for task in [self.clock_task.take(), self.rotation_task.take()].into_iter().flatten() {
            self.scheduler.cancel(task);
        }
        debug!("ticker unmounted");
    }
}

impl Drop for LiveClockTicker {
    fn drop(&mut self) {
        if self.alive.get() {
            self.teardown();
        }
    }
}
