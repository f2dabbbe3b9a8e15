//! Todos: a single-user to-do list with snapshot persistence.
//!
//! The [`Store`] owns an ordered task collection (most recent first), a
//! session-local [`Filter`], and a durable key/value slot it rewrites after
//! every mutation. Presentation code only reads [`Store::view`] and calls the
//! intent operations.
//!
//! # Example
//!
//! ```no_run
//! use todos::{Filter, Store};
//! use std::path::Path;
//!
//! let mut store = Store::init(Path::new(".")).unwrap();
//!
//! let milk = store.add("Buy milk").unwrap().unwrap();
//! store.add("Call mom").unwrap();
//! store.toggle(milk.id).unwrap();
//!
//! store.set_filter(Filter::Active);
//! let view = store.view();
//! assert_eq!(view.tasks.len(), 1);
//! assert_eq!(view.pending, 1);
//! assert_eq!(view.completed, 1);
//!
//! assert_eq!(store.clear_completed().unwrap(), 1);
//! ```

mod id;
mod storage;
mod store;
mod types;

pub mod config;
pub mod render;
pub mod shell;

// Re-export public API
pub use config::Config;
pub use storage::{Backend, BackendParseError, FileStorage, MemoryStorage, STORE_DIR, SqliteStorage, Storage};
pub use store::{SLOT_KEY, Store, StoreError};
pub use types::{Filter, FilterParseError, Task, TaskId, ValidationError, View};
