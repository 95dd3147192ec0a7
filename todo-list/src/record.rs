//! Wire shape of a task as it appears in the storage slot and in exchange files.
//!
//! Decoding is lenient where older data varies (`id` as a number or a string,
//! `dueDate` empty, `null` or absent, `completed` missing) and strict about
//! everything else.

use crate::error::ParseError;
use crate::task::{Category, Priority, Task, TaskId};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One decoded, validated task record that has not been given an id in a store yet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(default)]
    id: Option<RawId>,
    text: String,
    category: Category,
    priority: Priority,
    #[serde(default, deserialize_with = "due_date::deserialize")]
    due_date: Option<NaiveDate>,
    #[serde(default)]
    completed: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum RawId {
    Integer(u64),
    Fractional(f64),
    Text(String),
}

impl TaskRecord {
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

    /// The id carried by the record, if it is usable as a [`TaskId`].
    ///
    /// Fractional ids and non-numeric strings are not.
    pub fn stored_id(&self) -> Option<TaskId> {
        match self.id.as_ref()? {
            RawId::Integer(value) => Some(TaskId::new(*value)),
            RawId::Fractional(value)
                if value.fract() == 0.0 && *value >= 0.0 && *value < u64::MAX as f64 =>
            {
                Some(TaskId::new(*value as u64))
            }
            RawId::Fractional(_) => None,
            RawId::Text(value) => value.parse().ok(),
        }
    }

    pub(crate) fn into_task(self, id: TaskId) -> Task {
        Task::restore(
            id,
            self.text,
            self.category,
            self.priority,
            self.due_date,
            self.completed,
        )
    }

    fn validated(mut self, index: usize) -> Result<Self, ParseError> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyText { index });
        }
        if trimmed.len() != self.text.len() {
            self.text = trimmed.to_string();
        }
        Ok(self)
    }
}

/// Decodes a JSON array of task records. Any record that fails to decode or
/// validate fails the whole blob.
pub fn decode_records(blob: &[u8]) -> Result<Vec<TaskRecord>, ParseError> {
    parse(blob)?
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.validated(index))
        .collect()
}

/// Decodes the list kept in a storage slot. Structural errors still fail the
/// blob, but records with blank text are dropped so the rest survive.
pub(crate) fn decode_stored(blob: &[u8]) -> Result<Vec<TaskRecord>, ParseError> {
    let records = parse(blob)?
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            record
                .validated(index)
                .inspect_err(|err| warn!(error = %err, "dropping stored task"))
                .ok()
        })
        .collect();
    Ok(records)
}

fn parse(blob: &[u8]) -> Result<Vec<TaskRecord>, serde_json::Error> {
    let blob = blob.strip_prefix(UTF8_BOM).unwrap_or(blob);
    serde_json::from_slice(blob)
}

pub(crate) mod due_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.collect_str(&date.format(FORMAT)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => NaiveDate::parse_from_str(value, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
