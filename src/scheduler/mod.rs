//! Scheduler - Cancellable periodic tasks
//!
//! Components never call a platform timer directly. They schedule repeating
//! tasks through the [`Scheduler`] capability and cancel them by id on
//! unmount. Two implementations share one task table:
//!
//! - [`VirtualScheduler`] - time only moves when the caller advances it
//! - [`RealtimeScheduler`] - pumped from the host event loop against a
//!   monotonic clock
//!
//! Both run tasks on the calling thread. There is no background thread:
//! tasks touch thread-local reactive state, so they must run where the
//! component lives.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use spark_folio::scheduler::{Scheduler, VirtualScheduler};
//!
//! let scheduler = VirtualScheduler::new();
//! let id = scheduler.schedule_repeating(Duration::from_secs(1), Box::new(|| tick())).unwrap();
//!
//! scheduler.advance(Duration::from_secs(3)); // tick() ran 3 times
//! scheduler.cancel(id);
//! ```

mod realtime;
mod virtual_time;

pub use realtime::RealtimeScheduler;
pub use virtual_time::VirtualScheduler;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, warn};

// =============================================================================
// TYPES
// =============================================================================

/// Identifier of a scheduled task, unique per scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// A repeating unit of work.
pub type Task = Box<dyn FnMut()>;

// =============================================================================
// CAPABILITY
// =============================================================================

/// Host capability for periodic work.
pub trait Scheduler {
    /// Run `task` every `period`, first one period from now.
    ///
    /// Returns `None` when the task cannot be scheduled (zero period or no
    /// timer available); the caller simply gets no ticks.
    fn schedule_repeating(&self, period: Duration, task: Task) -> Option<TaskId>;

    /// Cancel a task. Returns false if it was not active.
    fn cancel(&self, id: TaskId) -> bool;

    /// Number of tasks currently scheduled.
    fn active_tasks(&self) -> usize;
}

// =============================================================================
// TASK TABLE
// =============================================================================

struct Entry {
    period: Duration,
    next_due: Duration,
    task: Rc<RefCell<Task>>,
}

/// Task storage shared by the scheduler implementations.
///
/// Times are offsets from the scheduler's own epoch. Tasks are invoked with
/// no table borrow held, so a task may cancel itself or schedule others.
#[derive(Default)]
pub(crate) struct TaskTable {
    next_id: Cell<u64>,
    entries: RefCell<BTreeMap<TaskId, Entry>>,
}

impl TaskTable {
    pub(crate) fn insert(&self, now: Duration, period: Duration, task: Task) -> Option<TaskId> {
        if period.is_zero() {
            warn!("refusing to schedule a task with a zero period");
            return None;
        }

        let id = TaskId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        self.entries.borrow_mut().insert(
            id,
            Entry {
                period,
                next_due: now + period,
                task: Rc::new(RefCell::new(task)),
            },
        );
        debug!(%id, ?period, "scheduled");
        Some(id)
    }

    pub(crate) fn remove(&self, id: TaskId) -> bool {
        let removed = self.entries.borrow_mut().remove(&id).is_some();
        if removed {
            debug!(%id, "cancelled");
        }
        removed
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Earliest deadline among all tasks.
    pub(crate) fn earliest_due(&self) -> Option<Duration> {
        self.entries.borrow().values().map(|e| e.next_due).min()
    }

    /// Earliest task due at or before `limit`. Ties go to the older task.
    fn next_due(&self, limit: Duration) -> Option<(TaskId, Duration)> {
        self.entries
            .borrow()
            .iter()
            .filter(|(_, entry)| entry.next_due <= limit)
            .min_by_key(|(id, entry)| (entry.next_due, **id))
            .map(|(id, entry)| (*id, entry.next_due))
    }

    /// Reschedule `id` and run it once.
    ///
    /// With `skip_missed`, deadlines already behind `now` are dropped instead
    /// of being replayed one by one.
    fn fire(&self, id: TaskId, now: Duration, skip_missed: bool) -> bool {
        let task = {
            let mut entries = self.entries.borrow_mut();
            let Some(entry) = entries.get_mut(&id) else {
                return false;
            };
            entry.next_due += entry.period;
            if skip_missed {
                while entry.next_due <= now {
                    entry.next_due += entry.period;
                }
            }
            entry.task.clone()
        };

        match task.try_borrow_mut() {
            Ok(mut task) => {
                task();
                true
            }
            Err(_) => {
                warn!(%id, "task is already running, tick skipped");
                false
            }
        }
    }

    /// Run every occurrence due up to `limit` in deadline order, reporting
    /// each occurrence's deadline through `set_now` before it runs.
    pub(crate) fn run_until(&self, limit: Duration, set_now: impl Fn(Duration)) -> usize {
        let mut fired = 0;
        while let Some((id, due)) = self.next_due(limit) {
            set_now(due);
            if self.fire(id, due, false) {
                fired += 1;
            }
        }
        fired
    }

    /// Run each task due at `now` at most once.
    pub(crate) fn run_due_once(&self, now: Duration) -> usize {
        let mut due: Vec<(Duration, TaskId)> = self
            .entries
            .borrow()
            .iter()
            .filter(|(_, entry)| entry.next_due <= now)
            .map(|(id, entry)| (entry.next_due, *id))
            .collect();
        due.sort();

        due.into_iter()
            .filter(|(_, id)| self.fire(*id, now, true))
            .count()
    }
}
