//! Integration tests for edge cases.
//!
//! Tests unicode handling, whitespace, and unusual inputs.

mod common;

use common::TestEnv;
use todos::Filter;
use todos::render::escape_text;

// =============================================================================
// Empty store
// =============================================================================

#[test]
fn test_empty_store_view() {
    let env = TestEnv::new();
    let view = env.store.view();

    assert!(view.tasks.is_empty());
    assert_eq!(view.pending, 0);
    assert_eq!(view.completed, 0);
    assert_eq!(view.filter, Filter::All);
}

#[test]
fn test_empty_store_every_filter() {
    let mut env = TestEnv::new();
    for filter in Filter::ALL {
        assert!(env.texts(filter).is_empty());
    }
}

// =============================================================================
// Unicode and special characters
// =============================================================================

#[test]
fn test_unicode_text_emoji() {
    let mut env = TestEnv::new();

    let task = env.add("Task with emoji: \u{1F680}");
    env.reopen();

    assert_eq!(env.store.get(task.id).unwrap().text, "Task with emoji: \u{1F680}");
}

#[test]
fn test_unicode_text_chinese() {
    let mut env = TestEnv::new();

    let task = env.add("\u{4E70}\u{725B}\u{5976}"); // Chinese characters
    env.reopen();

    assert_eq!(env.store.get(task.id).unwrap().text, "\u{4E70}\u{725B}\u{5976}");
}

#[test]
fn test_unicode_whitespace_trimmed() {
    let mut env = TestEnv::new();

    // Ideographic space and no-break space count as whitespace
    let task = env.add("\u{3000}note\u{00A0}");
    assert_eq!(task.text, "note");

    assert!(env.store.add("\u{3000}\u{2003}").unwrap().is_none());
}

#[test]
fn test_markup_is_stored_verbatim() {
    let mut env = TestEnv::new();

    let task = env.add("<script>alert('x')</script>");
    assert_eq!(task.text, "<script>alert('x')</script>");
}

#[test]
fn test_control_characters_escaped_for_display() {
    let mut env = TestEnv::new();

    let task = env.add("line one\nline two\u{1b}[2J");

    assert_eq!(task.text, "line one\nline two\u{1b}[2J");
    assert_eq!(escape_text(&task.text), "line one\\nline two\\u{1b}[2J");
}

// =============================================================================
// Size
// =============================================================================

#[test]
fn test_very_long_text() {
    let mut env = TestEnv::new();

    let task = env.add(&"x".repeat(10_000));
    env.reopen();

    assert_eq!(env.store.get(task.id).unwrap().text.len(), 10_000);
}

#[test]
fn test_many_tasks_added_quickly() {
    let mut env = TestEnv::new();

    for i in 0..100 {
        env.add(&format!("Task {}", i));
    }
    env.reopen();

    assert_eq!(env.store.len(), 100);
    assert_eq!(env.store.tasks()[0].text, "Task 99");
    assert_eq!(env.store.tasks()[99].text, "Task 0");
}
