//! Shared test infrastructure for todos integration tests.
//!
//! Provides TestEnv helper for consistent test setup/teardown.

#![allow(dead_code)]

use std::path::Path;
use tempfile::TempDir;
use todos::{Backend, Filter, Store, Task};

/// Test environment with automatic cleanup.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub store: Store,
    pub backend: Backend,
}

impl TestEnv {
    /// Create a new test environment with an initialized SQLite store.
    pub fn new() -> Self {
        Self::with_backend(Backend::Sqlite)
    }

    /// Create a new test environment with the given backend.
    pub fn with_backend(backend: Backend) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Store::init_with(temp_dir.path(), backend).expect("Failed to init store");
        Self {
            temp_dir,
            store,
            backend,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add a task, panicking if it is rejected.
    pub fn add(&mut self, text: &str) -> Task {
        self.store
            .add(text)
            .expect("Failed to add task")
            .expect("Task text was blank")
    }

    /// Add a task and mark it completed.
    pub fn add_completed(&mut self, text: &str) -> Task {
        let task = self.add(text);
        assert!(self.store.toggle(task.id).expect("Failed to toggle task"));
        self.store.get(task.id).cloned().expect("Task vanished")
    }

    /// Drop the current store and open the directory again, as a new session would.
    pub fn reopen(&mut self) {
        self.store = Store::open_with(self.temp_dir.path(), self.backend).expect("Failed to reopen store");
    }

    /// Texts visible under `filter`, in view order.
    pub fn texts(&mut self, filter: Filter) -> Vec<String> {
        self.store.set_filter(filter);
        self.store.view().tasks.iter().map(|t| t.text.clone()).collect()
    }

    /// Assert the counters agree with the collection size.
    pub fn assert_counts_consistent(&self) {
        let view = self.store.view();
        assert_eq!(
            view.pending + view.completed,
            self.store.len(),
            "pending ({}) + completed ({}) != total ({})",
            view.pending,
            view.completed,
            self.store.len()
        );
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
