//! Core data types for the to-do store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric task identifier.
///
/// Serialized as a bare JSON number so snapshots written by earlier
/// timestamp-keyed versions of the list load unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl TaskId {
    /// Returns the raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TaskId)
    }
}

impl From<u64> for TaskId {
    fn from(value: u64) -> Self {
        TaskId(value)
    }
}

/// A single to-do entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique within the store
    pub id: TaskId,

    /// Trimmed, never empty
    pub text: String,

    /// Completion flag, false at creation
    #[serde(default)]
    pub completed: bool,

    /// When created (millisecond precision)
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

/// Validation errors for task data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyText,
    UntrimmedText,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyText => write!(f, "text cannot be empty"),
            ValidationError::UntrimmedText => write!(f, "text has leading or trailing whitespace"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl Task {
    /// Check the invariants every stored task must hold.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if self.text.trim() != self.text {
            return Err(ValidationError::UntrimmedText);
        }
        Ok(())
    }
}

/// Session-local selector over the task collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    /// Every filter, in display order.
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    /// Whether a task is visible under this filter.
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a filter name is not one of `all`, `active`, `completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParseError(pub String);

impl fmt::Display for FilterParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown filter '{}' (expected all, active or completed)", self.0)
    }
}

impl std::error::Error for FilterParseError {}

impl FromStr for Filter {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" => Ok(Filter::Completed),
            other => Err(FilterParseError(other.to_string())),
        }
    }
}

/// Read model handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View<'a> {
    /// Tasks visible under `filter`, in collection order
    pub tasks: Vec<&'a Task>,

    /// Incomplete tasks across the whole collection
    pub pending: usize,

    /// Completed tasks across the whole collection
    pub completed: usize,

    /// Filter the view was computed with
    pub filter: Filter,
}

impl View<'_> {
    /// Size of the full collection the view was computed from.
    pub fn total(&self) -> usize {
        self.pending + self.completed
    }
}

/// `createdAt` as ISO-8601 with milliseconds and a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
