//! High-level store API: the task collection, its mutations and its view.

use crate::id::IdGenerator;
use crate::storage::{Backend, MemoryStorage, Storage, init_backend, open_backend};
use crate::types::{Filter, Task, TaskId, View};
use chrono::{SubsecRound, Utc};
use eyre::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Slot key the snapshot is stored under.
pub const SLOT_KEY: &str = "todos";

/// Errors that can occur during store operations.
#[derive(Debug)]
pub enum StoreError {
    /// The snapshot could not be written; the mutation was undone.
    PersistenceFailure(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::PersistenceFailure(reason) => write!(f, "failed to persist tasks: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {}

/// The to-do store.
///
/// Owns the ordered task collection (most recent first) and the session
/// filter. Every mutation writes a full snapshot to the backing slot before
/// it returns.
pub struct Store {
    storage: Box<dyn Storage>,
    tasks: Vec<Task>,
    filter: Filter,
    ids: IdGenerator,
}

impl Store {
    /// Initialize a new store in the given directory.
    pub fn init(root: &Path) -> Result<Self> {
        Self::init_with(root, Backend::default())
    }

    /// Initialize a new store using a specific backend.
    pub fn init_with(root: &Path, backend: Backend) -> Result<Self> {
        let storage = init_backend(root, backend)?;
        Ok(Self::with_storage(storage))
    }

    /// Open an existing store.
    pub fn open(root: &Path) -> Result<Self> {
        Self::open_with(root, Backend::default())
    }

    /// Open an existing store using a specific backend.
    pub fn open_with(root: &Path, backend: Backend) -> Result<Self> {
        let storage = open_backend(root, backend)?;
        Ok(Self::with_storage(storage))
    }

    /// Build a store over any storage and restore its snapshot.
    pub fn with_storage(storage: Box<dyn Storage>) -> Self {
        let mut store = Self {
            storage,
            tasks: Vec::new(),
            filter: Filter::default(),
            ids: IdGenerator::new(),
        };
        store.restore();
        store
    }

    /// A store that keeps its snapshot in memory only.
    pub fn in_memory() -> Self {
        Self::with_storage(Box::new(MemoryStorage::new()))
    }

    /// Give up the store, keeping its storage (e.g. to reopen it later).
    pub fn into_storage(self) -> Box<dyn Storage> {
        self.storage
    }

    /// Add a task at the front of the list.
    ///
    /// Returns `None` without touching storage when `text` is blank.
    pub fn add(&mut self, text: &str) -> Result<Option<Task>> {
        let text = text.trim();
        if text.is_empty() {
            log::debug!("Ignoring blank task text");
            return Ok(None);
        }

        let now = Utc::now().trunc_subsecs(3);
        let id = match self.ids.next_at(now) {
            Some(id) => id,
            None => self.unused_id(),
        };
        let task = Task {
            id,
            text: text.to_string(),
            completed: false,
            created_at: now,
        };

        self.tasks.insert(0, task.clone());
        self.persist_or_undo(|tasks| {
            tasks.remove(0);
        })?;

        log::debug!("Added task {}", task.id);
        Ok(Some(task))
    }

    /// Flip a task's completion flag. Returns false if no task has `id`.
    pub fn toggle(&mut self, id: TaskId) -> Result<bool> {
        let Some(index) = self.position(id) else {
            log::debug!("Toggle ignored, no task {}", id);
            return Ok(false);
        };

        self.tasks[index].completed = !self.tasks[index].completed;
        self.persist_or_undo(|tasks| tasks[index].completed = !tasks[index].completed)?;

        log::debug!("Toggled task {} to completed={}", id, self.tasks[index].completed);
        Ok(true)
    }

    /// Remove a task. Returns whether one was removed.
    pub fn delete(&mut self, id: TaskId) -> Result<bool> {
        let Some(index) = self.position(id) else {
            log::debug!("Delete ignored, no task {}", id);
            return Ok(false);
        };

        let removed = self.tasks.remove(index);
        self.persist_or_undo(move |tasks| tasks.insert(index, removed))?;

        log::debug!("Deleted task {}", id);
        Ok(true)
    }

    /// Remove every completed task. Returns how many were removed.
    pub fn clear_completed(&mut self) -> Result<usize> {
        let removed = self.tasks.iter().filter(|t| t.completed).count();
        if removed == 0 {
            return Ok(0);
        }

        let previous = std::mem::take(&mut self.tasks);
        self.tasks = previous.iter().filter(|t| !t.completed).cloned().collect();
        self.persist_or_undo(move |tasks| *tasks = previous)?;

        log::debug!("Cleared {} completed task(s)", removed);
        Ok(removed)
    }

    /// Select which tasks `view()` shows.
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// Select a filter by name. Unknown names leave the filter unchanged.
    pub fn set_filter_named(&mut self, name: &str) -> bool {
        match name.parse::<Filter>() {
            Ok(filter) => {
                self.set_filter(filter);
                true
            }
            Err(e) => {
                log::debug!("Filter unchanged: {}", e);
                false
            }
        }
    }

    /// The current session filter.
    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Compute the filtered view and the counters over the full collection.
    pub fn view(&self) -> View<'_> {
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        View {
            tasks: self.tasks.iter().filter(|t| self.filter.matches(t)).collect(),
            pending: self.tasks.len() - completed,
            completed,
            filter: self.filter,
        }
    }

    /// Every task, most recent first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Get a task by ID.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Write the full collection to the backing slot.
    pub fn persist(&mut self) -> Result<()> {
        let snapshot = serde_json::to_string(&self.tasks).context("Failed to serialize tasks")?;

        self.storage.set(SLOT_KEY, &snapshot).map_err(|e| {
            let reason = e.chain().map(|c| c.to_string()).collect::<Vec<_>>().join(": ");
            log::error!("Persisting {} task(s) failed: {}", self.tasks.len(), reason);
            eyre::eyre!(StoreError::PersistenceFailure(reason))
        })
    }

    /// Reload the collection from the backing slot.
    ///
    /// A missing, unreadable or malformed snapshot leaves the store empty.
    pub fn restore(&mut self) {
        self.tasks = match self.storage.get(SLOT_KEY) {
            Ok(Some(raw)) => parse_snapshot(&raw),
            Ok(None) => {
                log::info!("No saved tasks, starting empty");
                Vec::new()
            }
            Err(e) => {
                log::warn!("Failed to read saved tasks, starting empty: {}", e);
                Vec::new()
            }
        };

        self.ids = IdGenerator::new();
        for task in &self.tasks {
            self.ids.observe(task.id);
        }
    }

    /// Smallest id not taken by any task, for when the generator is exhausted.
    fn unused_id(&self) -> TaskId {
        let taken: HashSet<u64> = self.tasks.iter().map(|t| t.id.get()).collect();
        // More ids than tasks exist, so the scan always finds a gap.
        let id = (1..=u64::MAX).find(|id| !taken.contains(id)).unwrap_or(0);
        log::warn!("Task ids exhausted, reusing free id {}", id);
        TaskId(id)
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn persist_or_undo(&mut self, undo: impl FnOnce(&mut Vec<Task>)) -> Result<()> {
        if let Err(e) = self.persist() {
            undo(&mut self.tasks);
            return Err(e);
        }
        Ok(())
    }
}

/// Decode a snapshot, dropping records that break the store invariants.
///
/// Records are decoded one at a time so a single bad entry does not cost
/// the rest of the list.
fn parse_snapshot(raw: &str) -> Vec<Task> {
    let records: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(e) => {
            log::warn!("Saved tasks are malformed, starting empty: {}", e);
            return Vec::new();
        }
    };

    let total = records.len();
    let mut seen = HashSet::new();
    let tasks: Vec<Task> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Task>(record) {
            Ok(task) => Some(task),
            Err(e) => {
                log::warn!("Skipping saved task at index {}: {}", index, e);
                None
            }
        })
        .filter_map(|mut task| {
            task.text = task.text.trim().to_string();
            if task.validate().is_err() || !seen.insert(task.id) {
                return None;
            }
            Some(task)
        })
        .collect();

    if tasks.len() != total {
        log::warn!("Dropped {} invalid or duplicate saved task(s)", total - tasks.len());
    }
    log::info!("Restored {} task(s)", tasks.len());
    tasks
}
