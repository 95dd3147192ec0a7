//! Core of the task list manager: the task model, the store that owns the
//! ordered list, and the filter, statistics, persistence and exchange logic
//! the front ends build on.
pub mod error;
pub mod exchange;
pub mod filter;
pub mod persistence;
pub mod record;
pub mod stats;
pub mod store;
pub mod task;

pub use error::{ImportError, ParseError, ReorderError, StorageError, StoreError, UnknownVariant};
pub use exchange::{EXPORT_FILE_NAME, EXPORT_MIME_TYPE};
pub use filter::{Selector, TaskFilter, filter};
pub use persistence::{DEFAULT_STORAGE_KEY, KeyValueStore, MemoryStore, Persistence};
pub use record::TaskRecord;
pub use stats::Stats;
pub use store::TaskStore;
pub use task::{Category, NewTask, Priority, Task, TaskId};
