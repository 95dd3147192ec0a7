use crate::task::TaskId;
use thiserror::Error;

/// Failure of the underlying key-value storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("cannot read storage slot `{key}`: {message}")]
    Read { key: String, message: String },
    #[error("cannot write storage slot `{key}`: {message}")]
    Write { key: String, message: String },
}

/// A task list blob that does not decode into task records.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed task list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("task at position {index} has no text")]
    EmptyText { index: usize },
}

/// An imported file was rejected. The whole file is refused, never part of it.
#[derive(Error, Debug)]
#[error("Invalid file format")]
pub struct ImportError(#[from] ParseError);

impl ImportError {
    /// The decoding problem behind the rejection.
    pub fn cause(&self) -> &ParseError {
        &self.0
    }
}

/// A reorder sequence that is not a permutation of the current ids.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReorderError {
    #[error("task {0} does not exist")]
    Unknown(TaskId),
    #[error("task {0} appears more than once")]
    Duplicate(TaskId),
    #[error("task {0} is missing from the new order")]
    Missing(TaskId),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Reorder(#[from] ReorderError),
    #[error("task list could not be serialized: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("no unused task ids are left")]
    IdsExhausted,
}

/// A string that names no variant of a fixed enumeration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} `{value}`, expected one of: {expected}")]
pub struct UnknownVariant {
    pub(crate) kind: &'static str,
    pub(crate) value: String,
    pub(crate) expected: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_error_reads_as_invalid_file_format() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = ImportError::from(ParseError::from(cause));

        assert_eq!(error.to_string(), "Invalid file format");
        assert!(matches!(error.cause(), ParseError::Json(_)));
    }

    #[test]
    fn store_error_is_transparent_over_reorder_error() {
        let error = StoreError::from(ReorderError::Missing(TaskId::new(3)));

        assert_eq!(error.to_string(), "task 3 is missing from the new order");
    }
}
