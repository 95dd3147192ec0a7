use crate::task::Task;
use chrono::{DateTime, Utc};
use std::fmt;

/// Counts shown alongside the task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub overdue: usize,
}

impl Stats {
    /// Counts as of right now.
    pub fn of(tasks: &[Task]) -> Self {
        Self::at(tasks, Utc::now())
    }

    pub fn at(tasks: &[Task], now: DateTime<Utc>) -> Self {
        tasks.iter().fold(Stats::default(), |mut stats, task| {
            stats.total += 1;
            if task.is_completed() {
                stats.completed += 1;
            }
            if task.is_overdue(now) {
                stats.overdue += 1;
            }
            stats
        })
    }

    pub fn open(&self) -> usize {
        self.total - self.completed
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {} | Completed: {} | Overdue: {}",
            self.total, self.completed, self.overdue
        )
    }
}
