use crate::task::{Category, Priority, Task};
use std::fmt;
use std::str::FromStr;

/// Selector value that matches every task.
pub const ALL_SENTINEL: &str = "all";

/// Either every value, or one specific value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector<T> {
    All,
    Only(T),
}

impl<T> Default for Selector<T> {
    fn default() -> Self {
        Selector::All
    }
}

impl<T: PartialEq> Selector<T> {
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(expected) => expected == value,
        }
    }
}

impl<T: FromStr> FromStr for Selector<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(ALL_SENTINEL) {
            Ok(Selector::All)
        } else {
            s.parse().map(Selector::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::All => f.write_str(ALL_SENTINEL),
            Selector::Only(value) => fmt::Display::fmt(value, f),
        }
    }
}

/// Search text plus category and priority selectors, all of which must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub search: String,
    pub category: Selector<Category>,
    pub priority: Selector<Priority>,
}

impl TaskFilter {
    pub fn new(
        search: impl Into<String>,
        category: Selector<Category>,
        priority: Selector<Priority>,
    ) -> Self {
        Self {
            search: search.into(),
            category,
            priority,
        }
    }

    /// Whether the filter lets every task through.
    pub fn is_unrestricted(&self) -> bool {
        self.search.is_empty() && self.category == Selector::All && self.priority == Selector::All
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.matches_text(task)
            && self.category.accepts(&task.category())
            && self.priority.accepts(&task.priority())
    }

    fn matches_text(&self, task: &Task) -> bool {
        self.search.is_empty()
            || task
                .text()
                .to_lowercase()
                .contains(&self.search.to_lowercase())
    }
}

/// The tasks accepted by `criteria`, in their original order.
pub fn filter<'a>(tasks: &'a [Task], criteria: &TaskFilter) -> Vec<&'a Task> {
    tasks.iter().filter(|task| criteria.matches(task)).collect()
}
