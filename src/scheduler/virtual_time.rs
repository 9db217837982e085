//! Virtual-time scheduler for deterministic hosts and tests.

use std::cell::Cell;
use std::time::Duration;

use tracing::trace;

use super::{Scheduler, Task, TaskId, TaskTable};

/// Scheduler whose clock only moves when [`advance`](Self::advance) is called.
///
/// Occurrences run in deadline order; tasks sharing a deadline run in the
/// order they were scheduled. During a task, [`now`](Self::now) reports that
/// occurrence's deadline.
#[derive(Default)]
pub struct VirtualScheduler {
    now: Cell<Duration>,
    tasks: TaskTable,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Move time forward by `by`, running every occurrence that falls due.
    /// Returns how many task runs happened.
    pub fn advance(&self, by: Duration) -> usize {
        self.advance_to(self.now.get() + by)
    }

    /// Move time forward to `target`. Moving backwards is a no-op.
    pub fn advance_to(&self, target: Duration) -> usize {
        if target < self.now.get() {
            return 0;
        }

        let fired = self.tasks.run_until(target, |due| self.now.set(due));
        self.now.set(target);
        trace!(now = ?target, fired, "virtual time advanced");
        fired
    }

    /// Deadline of the next pending occurrence.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.tasks.earliest_due()
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule_repeating(&self, period: Duration, task: Task) -> Option<TaskId> {
        self.tasks.insert(self.now.get(), period, task)
    }

    fn cancel(&self, id: TaskId) -> bool {
        self.tasks.remove(id)
    }

    fn active_tasks(&self) -> usize {
        self.tasks.len()
    }
}
