//! Wall-time scheduler pumped by a host event loop.

use std::time::{Duration, Instant};

use super::{Scheduler, Task, TaskId, TaskTable};

/// Scheduler measured against a monotonic clock.
///
/// The host calls [`pump`](Self::pump) from its event loop, typically after
/// waiting up to [`time_until_next`](Self::time_until_next) for input. A task
/// that fell behind (slow frame, suspended process) runs once and resumes on
/// its period rather than replaying every missed occurrence.
pub struct RealtimeScheduler {
    started: Instant,
    tasks: TaskTable,
}

impl RealtimeScheduler {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            tasks: TaskTable::default(),
        }
    }

    /// Time elapsed since the scheduler was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Run every task whose deadline has passed. Returns how many ran.
    pub fn pump(&self) -> usize {
        self.tasks.run_due_once(self.elapsed())
    }

    /// How long the host may sleep before the next deadline.
    /// `None` when nothing is scheduled.
    pub fn time_until_next(&self) -> Option<Duration> {
        self.tasks
            .earliest_due()
            .map(|due| due.saturating_sub(self.elapsed()))
    }
}

impl Default for RealtimeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for RealtimeScheduler {
    fn schedule_repeating(&self, period: Duration, task: Task) -> Option<TaskId> {
        self.tasks.insert(self.elapsed(), period, task)
    }

    fn cancel(&self, id: TaskId) -> bool {
        self.tasks.remove(id)
    }

    fn active_tasks(&self) -> usize {
        self.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::thread;

    #[test]
    fn test_pump_before_deadline_runs_nothing() {
        let scheduler = RealtimeScheduler::new();
        scheduler.schedule_repeating(Duration::from_secs(60), Box::new(|| {}));

        assert_eq!(scheduler.pump(), 0);
        assert!(scheduler.time_until_next().unwrap() > Duration::from_secs(50));
    }

    #[test]
    fn test_pump_after_deadline_runs_once() {
        let scheduler = RealtimeScheduler::new();
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        scheduler.schedule_repeating(
            Duration::from_millis(5),
            Box::new(move || count_clone.set(count_clone.get() + 1)),
        );

        thread::sleep(Duration::from_millis(30));
        assert_eq!(scheduler.pump(), 1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_cancel() {
        let scheduler = RealtimeScheduler::new();
        let id = scheduler.schedule_repeating(Duration::from_millis(1), Box::new(|| {})).unwrap();

        assert_eq!(scheduler.active_tasks(), 1);
        assert!(scheduler.cancel(id));
        assert_eq!(scheduler.active_tasks(), 0);
        assert_eq!(scheduler.time_until_next(), None);
    }
}
