//! Terminal rendering of the store's view.

use crate::config::{Config, DEFAULT_CLOCK_FORMAT, DEFAULT_TIME_FORMAT};
use crate::types::{Filter, Task, View};
use chrono::{DateTime, TimeZone};
use colored::*;
use std::fmt::{Display, Write};

/// Make user text safe to print: control characters are shown as escapes
/// so task text cannot move the cursor or emit terminal colour codes.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_control() {
            out.extend(c.escape_debug());
        } else {
            out.push(c);
        }
    }
    out
}

/// Format a timestamp with a strftime layout, falling back to `fallback`
/// when the layout contains an invalid specifier.
fn format_with<Tz>(at: &DateTime<Tz>, layout: &str, fallback: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    if write!(out, "{}", at.format(layout)).is_ok() {
        return out;
    }
    log::warn!("Invalid time layout '{}', using '{}'", layout, fallback);
    at.format(fallback).to_string()
}

/// Message shown when nothing matches the filter.
pub fn empty_message(filter: Filter) -> &'static str {
    match filter {
        Filter::All => "No tasks yet",
        Filter::Active => "No active tasks",
        Filter::Completed => "No completed tasks",
    }
}

/// Turns views into terminal text.
#[derive(Debug, Clone)]
pub struct Renderer {
    clock_format: String,
    time_format: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Renderer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            clock_format: config.clock_format.clone(),
            time_format: config.time_format.clone(),
        }
    }

    /// The clock line for `now`.
    pub fn clock<Tz>(&self, now: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        format_with(now, &self.clock_format, DEFAULT_CLOCK_FORMAT)
    }

    /// One task line. Times are shown in the time zone of `tz_of`.
    pub fn task_line<Tz>(&self, task: &Task, tz_of: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let created = task.created_at.with_timezone(&tz_of.timezone());
        let time = format_with(&created, &self.time_format, DEFAULT_TIME_FORMAT);
        let text = escape_text(&task.text);

        if task.completed {
            format!(
                "{} {}  {}  {}",
                "[x]".green(),
                task.id.to_string().cyan(),
                text.strikethrough().dimmed(),
                time.dimmed()
            )
        } else {
            format!("{} {}  {}  {}", "[ ]", task.id.to_string().cyan(), text, time.dimmed())
        }
    }

    /// Full screen: clock, counters, then the filtered tasks.
    pub fn view<Tz>(&self, view: &View<'_>, now: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let mut lines = vec![
            self.clock(now).bold().to_string(),
            format!(
                "{} pending · {} completed  {}",
                view.pending.to_string().yellow(),
                view.completed.to_string().green(),
                format!("[{}]", view.filter).dimmed()
            ),
        ];

        if view.tasks.is_empty() {
            lines.push(empty_message(view.filter).dimmed().to_string());
        } else {
            lines.extend(view.tasks.iter().map(|task| self.task_line(task, now)));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskId;
    use chrono::Utc;

    fn plain() {
        colored::control::set_override(false);
    }

    fn task(id: u64, text: &str, completed: bool) -> Task {
        Task {
            id: TaskId(id),
            text: text.to_string(),
            completed,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("plain text"), "plain text");
        assert_eq!(escape_text("two\nlines"), "two\\nlines");
        assert_eq!(escape_text("tab\there"), "tab\\there");
        assert_eq!(escape_text("\u{1b}[31mred"), "\\u{1b}[31mred");
        assert_eq!(escape_text("中文任务 🚀"), "中文任务 🚀");
    }

    #[test]
    fn test_clock_default_layout() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 0).unwrap();
        assert_eq!(Renderer::default().clock(&now), "Friday, March 1, 2024 09:05");
    }

    #[test]
    fn test_invalid_layout_falls_back() {
        let config = Config {
            clock_format: "%Q broken".to_string(),
            ..Config::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 0).unwrap();
        assert_eq!(Renderer::from_config(&config).clock(&now), "Friday, March 1, 2024 09:05");
    }

    #[test]
    fn test_task_lines() {
        plain();
        let renderer = Renderer::default();
        let now = Utc::now();

        assert_eq!(renderer.task_line(&task(7, "Buy milk", false), &now), "[ ] 7  Buy milk  09:30");
        assert_eq!(renderer.task_line(&task(8, "Call\nmom", true), &now), "[x] 8  Call\\nmom  09:30");
    }

    #[test]
    fn test_view_lists_tasks() {
        plain();
        let a = task(1, "a", false);
        let b = task(2, "b", true);
        let view = View {
            tasks: vec![&b, &a],
            pending: 1,
            completed: 1,
            filter: Filter::All,
        };
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();

        let screen = Renderer::default().view(&view, &now);
        let lines: Vec<&str> = screen.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Friday, March 1, 2024 10:00",
                "1 pending · 1 completed  [all]",
                "[x] 2  b  09:30",
                "[ ] 1  a  09:30",
            ]
        );
    }

    #[test]
    fn test_view_empty_state_per_filter() {
        plain();
        let now = Utc::now();
        for (filter, message) in [
            (Filter::All, "No tasks yet"),
            (Filter::Active, "No active tasks"),
            (Filter::Completed, "No completed tasks"),
        ] {
            let view = View {
                tasks: vec![],
                pending: 0,
                completed: 0,
                filter,
            };
            let screen = Renderer::default().view(&view, &now);
            assert_eq!(screen.lines().last(), Some(message));
        }
    }
}
