//! Interactive session: parses typed commands into store intents and
//! re-renders the view after each one.

use crate::render::Renderer;
use crate::store::Store;
use crate::types::TaskId;
use chrono::{DateTime, TimeZone};
use colored::*;
use eyre::{Context, Result};
use std::fmt::{self, Display};
use std::io::{BufRead, Write};

pub const HELP: &str = "\
Commands:
  add <text>        add a task
  toggle <id>       mark a task done / not done
  delete <id>       remove a task
  clear             remove all completed tasks
  filter <name>     show all, active or completed tasks
  list              redraw the list
  help              show this help
  quit              leave the shell";

/// A user intent typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Add(String),
    Toggle(TaskId),
    Delete(TaskId),
    ClearCompleted,
    Filter(String),
    List,
    Help,
    Quit,
}

/// Why a typed line could not be turned into an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentError {
    UnknownCommand(String),
    MissingArgument(&'static str),
    InvalidId(String),
}

impl Display for IntentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntentError::UnknownCommand(cmd) => write!(f, "unknown command '{}' (try 'help')", cmd),
            IntentError::MissingArgument(what) => write!(f, "missing {}", what),
            IntentError::InvalidId(raw) => write!(f, "'{}' is not a task id", raw),
        }
    }
}

impl std::error::Error for IntentError {}

impl Intent {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Intent>, IntentError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let intent = match command {
            "add" | "a" => Intent::Add(rest.to_string()),
            "toggle" | "t" | "done" => Intent::Toggle(parse_id(rest)?),
            "delete" | "del" | "rm" => Intent::Delete(parse_id(rest)?),
            "clear" => Intent::ClearCompleted,
            "filter" | "f" => {
                if rest.is_empty() {
                    return Err(IntentError::MissingArgument("filter name"));
                }
                Intent::Filter(rest.to_string())
            }
            "list" | "ls" => Intent::List,
            "help" | "?" => Intent::Help,
            "quit" | "exit" | "q" => Intent::Quit,
            other => return Err(IntentError::UnknownCommand(other.to_string())),
        };

        Ok(Some(intent))
    }
}

fn parse_id(raw: &str) -> Result<TaskId, IntentError> {
    if raw.is_empty() {
        return Err(IntentError::MissingArgument("task id"));
    }
    raw.parse().map_err(|_| IntentError::InvalidId(raw.to_string()))
}

/// What the session should do after an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Keep going; print `note` if any, then redraw when `redraw` is set.
    Continue { note: Option<String>, redraw: bool },
    Quit,
}

impl Step {
    fn redraw(note: Option<String>) -> Self {
        Step::Continue { note, redraw: true }
    }
}

/// One interactive session over a store.
pub struct Session<'a> {
    store: &'a mut Store,
    renderer: Renderer,
}

impl<'a> Session<'a> {
    pub fn new(store: &'a mut Store, renderer: Renderer) -> Self {
        Self { store, renderer }
    }

    /// Forward an intent to the store.
    pub fn apply(&mut self, intent: Intent) -> Result<Step> {
        let step = match intent {
            Intent::Add(text) => match self.store.add(&text)? {
                Some(_) => Step::redraw(None),
                None => Step::redraw(Some("Nothing to add".to_string())),
            },
            Intent::Toggle(id) => {
                let note = (!self.store.toggle(id)?).then(|| format!("No task {}", id));
                Step::redraw(note)
            }
            Intent::Delete(id) => {
                let note = (!self.store.delete(id)?).then(|| format!("No task {}", id));
                Step::redraw(note)
            }
            Intent::ClearCompleted => {
                let removed = self.store.clear_completed()?;
                Step::redraw(Some(format!("Cleared {} completed task(s)", removed)))
            }
            Intent::Filter(name) => {
                let note = (!self.store.set_filter_named(&name)).then(|| format!("Unknown filter '{}'", name));
                Step::redraw(note)
            }
            Intent::List => Step::redraw(None),
            Intent::Help => Step::Continue {
                note: Some(HELP.to_string()),
                redraw: false,
            },
            Intent::Quit => Step::Quit,
        };

        Ok(step)
    }

    /// The rendered view at `now`.
    pub fn screen<Tz>(&self, now: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.renderer.view(&self.store.view(), now)
    }

    /// Read commands from `input` until it ends or the user quits.
    pub fn run<R, W, Tz, F>(&mut self, input: R, out: &mut W, mut clock: F) -> Result<()>
    where
        R: BufRead,
        W: Write,
        Tz: TimeZone,
        Tz::Offset: Display,
        F: FnMut() -> DateTime<Tz>,
    {
        writeln!(out, "{}", self.screen(&clock())).context("Failed to write output")?;

        for line in input.lines() {
            let line = line.context("Failed to read input")?;

            let step = match Intent::parse(&line) {
                Ok(None) => continue,
                Ok(Some(intent)) => {
                    log::debug!("Shell intent: {:?}", intent);
                    match self.apply(intent) {
                        Ok(step) => step,
                        Err(e) => {
                            writeln!(out, "{} {}", "Error:".red().bold(), e).context("Failed to write output")?;
                            continue;
                        }
                    }
                }
                Err(e) => Step::Continue {
                    note: Some(e.to_string()),
                    redraw: false,
                },
            };

            match step {
                Step::Quit => break,
                Step::Continue { note, redraw } => {
                    if let Some(note) = note {
                        writeln!(out, "{}", note.dimmed()).context("Failed to write output")?;
                    }
                    if redraw {
                        writeln!(out, "{}", self.screen(&clock())).context("Failed to write output")?;
                    }
                }
            }
        }

        Ok(())
    }
}
