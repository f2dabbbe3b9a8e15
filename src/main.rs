//! todos CLI - a small to-do list for the terminal.

use chrono::Local;
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use todos::render::Renderer;
use todos::shell::{HELP, Session};
use todos::{Config, Store};

mod cli;

use cli::{Cli, Command};

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("todos")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("todos.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn get_store_dir(cli: &Cli) -> PathBuf {
    cli.dir
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn open_store(store_dir: &Path, config: &Config, ephemeral: bool) -> Result<Store> {
    if ephemeral {
        info!("Using an in-memory store");
        return Ok(Store::in_memory());
    }
    Store::open_with(store_dir, config.backend).context("Failed to open store")
}

fn print_view(store: &Store, renderer: &Renderer) {
    println!("{}", renderer.view(&store.view(), &Local::now()));
}

async fn run_clock(renderer: &Renderer) -> Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut stdout = io::stdout();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                write!(stdout, "\r{}", renderer.clock(&Local::now())).context("Failed to write clock")?;
                stdout.flush().context("Failed to flush stdout")?;
            }
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl-C")?;
                writeln!(stdout).context("Failed to write clock")?;
                break;
            }
        }
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let store_dir = get_store_dir(&cli);
    let config = Config::load().context("Failed to load config")?.with_backend(cli.backend);
    let renderer = Renderer::from_config(&config);

    match cli.command {
        Command::Init if cli.ephemeral => {
            println!("{}", "Nothing to initialize for an in-memory store".dimmed());
        }

        Command::Init => {
            Store::init_with(&store_dir, config.backend).context("Failed to initialize store")?;
            println!(
                "{} Initialized {} store in {}",
                "✓".green(),
                config.backend,
                store_dir.display()
            );
        }

        Command::Add { text } => {
            let mut store = open_store(&store_dir, &config, cli.ephemeral)?;

            match store.add(&text.join(" ")).context("Failed to add task")? {
                Some(task) => println!(
                    "{} Added: {} {}",
                    "✓".green(),
                    task.id.to_string().cyan(),
                    todos::render::escape_text(&task.text)
                ),
                None => println!("{}", "Nothing to add".dimmed()),
            }
        }

        Command::Toggle { id } => {
            let mut store = open_store(&store_dir, &config, cli.ephemeral)?;

            if store.toggle(id).context("Failed to toggle task")? {
                let done = store.get(id).is_some_and(|t| t.completed);
                let state = if done { "done".green() } else { "not done".yellow() };
                println!("{} {} is now {}", "✓".green(), id.to_string().cyan(), state);
            } else {
                println!("{}", format!("No task {}", id).dimmed());
            }
        }

        Command::Delete { id } => {
            let mut store = open_store(&store_dir, &config, cli.ephemeral)?;

            if store.delete(id).context("Failed to delete task")? {
                println!("{} Deleted: {}", "✓".green(), id.to_string().cyan());
            } else {
                println!("{}", format!("No task {}", id).dimmed());
            }
        }

        Command::Clear => {
            let mut store = open_store(&store_dir, &config, cli.ephemeral)?;
            let removed = store.clear_completed().context("Failed to clear completed tasks")?;

            println!("{} Cleared {} completed task(s)", "✓".green(), removed);
        }

        Command::List { filter } => {
            let mut store = open_store(&store_dir, &config, cli.ephemeral)?;
            store.set_filter(filter);
            print_view(&store, &renderer);
        }

        Command::Shell => {
            let mut store = open_store(&store_dir, &config, cli.ephemeral)?;
            println!("{}", HELP.dimmed());

            let stdin = io::stdin();
            let mut stdout = io::stdout();
            Session::new(&mut store, renderer)
                .run(stdin.lock(), &mut stdout, Local::now)
                .context("Shell session failed")?;
        }

        Command::Clock { once } => {
            if once {
                println!("{}", renderer.clock(&Local::now()));
            } else {
                let rt = tokio::runtime::Runtime::new().context("Failed to create runtime")?;
                rt.block_on(run_clock(&renderer)).context("Clock error")?;
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    info!("Command: {:?}", cli.command);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ephemeral_flag_parses_globally() {
        let cli = Cli::try_parse_from(["td", "list", "--ephemeral"]).unwrap();
        assert!(cli.ephemeral);

        let cli = Cli::try_parse_from(["td", "shell"]).unwrap();
        assert!(!cli.ephemeral);
    }

    #[test]
    fn test_ephemeral_store_needs_no_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::default();

        assert!(open_store(temp_dir.path(), &config, false).is_err());

        let mut store = open_store(temp_dir.path(), &config, true).unwrap();
        store.add("scratch").unwrap();
        assert_eq!(store.len(), 1);
        assert!(!temp_dir.path().join(todos::STORE_DIR).exists());
    }
}
