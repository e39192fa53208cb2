//! Script record model and storage backends for reelops.

pub mod conformance;
mod error;
mod file;
mod memory;
mod record;
mod traits;

pub use error::StorageError;
pub use file::JsonFileScriptStore;
pub use memory::InMemoryScriptStore;
pub use record::{
    now_rfc3339, ScriptJson, ScriptPage, ScriptQuery, ScriptRecord, ScriptStatus, ScriptUpdate,
    StatusCounts, UnknownStatus, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
pub use traits::ScriptStore;
