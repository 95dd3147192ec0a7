use crate::error::UnknownVariant;
use crate::record::due_date;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a task, unique within its store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    pub const FIRST: TaskId = TaskId(1);

    pub fn new(value: u64) -> Self {
        TaskId(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// The next id, or `None` once the id space is used up.
    pub(crate) fn successor(self) -> Option<TaskId> {
        self.0.checked_add(1).map(TaskId)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TaskId)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    #[default]
    Personal,
    Other,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Work, Category::Personal, Category::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "category",
                value: s.to_string(),
                expected: "work, personal, other",
            })
    }
}

/// Priorities are ordered from `Low` to `High`.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "priority",
                value: s.to_string(),
                expected: "low, medium, high",
            })
    }
}

/// User input for a task that does not exist yet.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub text: String,
    pub category: Category,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn due(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }
}

/// A single to-do record.
///
/// The id is fixed at construction; every other field has a mutator so that
/// [`TaskStore::update`](crate::TaskStore::update) callers can edit a task in
/// place without being able to break id uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    text: String,
    category: Category,
    priority: Priority,
    #[serde(serialize_with = "due_date::serialize")]
    due_date: Option<NaiveDate>,
    completed: bool,
}

impl Task {
    /// Builds a task from user input, or `None` when the text is blank.
    pub(crate) fn new(id: TaskId, new_task: NewTask) -> Option<Self> {
        let text = new_task.text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            id,
            text: text.to_string(),
            category: new_task.category,
            priority: new_task.priority,
            due_date: new_task.due_date,
            completed: false,
        })
    }

    pub(crate) fn restore(
        id: TaskId,
        text: String,
        category: Category,
        priority: Priority,
        due_date: Option<NaiveDate>,
        completed: bool,
    ) -> Self {
        Self {
            id,
            text,
            category,
            priority,
            due_date,
            completed,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Replaces the text with its trimmed form. Blank text is refused and
    /// leaves the task untouched.
    pub fn set_text(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.text = text.to_string();
        true
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    pub fn set_due_date(&mut self, due_date: Option<NaiveDate>) {
        self.due_date = due_date;
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    pub fn toggle_complete(&mut self) {
        self.completed = !self.completed;
    }

    /// A task is overdue once the start of its due date (midnight UTC) has
    /// passed and it is still open.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed
            && self
                .due_date
                .is_some_and(|due| due.and_time(NaiveTime::MIN).and_utc() < now)
    }
}
