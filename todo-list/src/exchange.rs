//! Export to and import from a `tasks.json` document.

use crate::error::ImportError;
use crate::record::{TaskRecord, decode_records};
use crate::task::Task;

pub const EXPORT_FILE_NAME: &str = "tasks.json";
pub const EXPORT_MIME_TYPE: &str = "application/json";

/// Pretty-printed JSON array of the tasks, in list order.
pub fn export(tasks: &[Task]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(tasks)
}

/// Decodes an uploaded document. Any problem rejects the whole document.
pub fn decode_import(blob: &[u8]) -> Result<Vec<TaskRecord>, ImportError> {
    Ok(decode_records(blob)?)
}
