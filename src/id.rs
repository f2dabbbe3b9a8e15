//! ID generation for tasks.

use crate::types::TaskId;
use chrono::{DateTime, Utc};

/// Hands out strictly increasing task ids.
///
/// Ids are the creation time in Unix milliseconds, bumped past the last id
/// issued or observed, so two tasks created within the same millisecond
/// still get distinct ids. Once `u64::MAX` has been handed out or observed
/// the generator is exhausted and returns `None`.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an id that already exists so later ids sort after it.
    pub fn observe(&mut self, id: TaskId) {
        self.last = self.last.max(id.get());
    }

    /// Next id for a task created at `now`, or `None` when no larger id is left.
    pub fn next_at(&mut self, now: DateTime<Utc>) -> Option<TaskId> {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = millis.max(self.last.checked_add(1)?);
        self.last = id;
        Some(TaskId(id))
    }
}
