use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use tasklist::{Config, FileStorage, Filter, KeyValueStore, Task, TaskStore};

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "tasklist - Local-first personal task list")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding the task list (overrides the config file)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// Mark a task completed, or active again
    Toggle { id: String },

    /// Delete a task
    Delete { id: String },

    /// Change a task's title
    Edit {
        id: String,
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// Remove all completed tasks
    ClearCompleted,

    /// Show tasks
    List {
        /// all, active or completed
        #[arg(short, long, default_value = "all")]
        filter: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    // Setup tracing on stderr so listings stay clean
    let level: tracing::Level = config.log_level.parse()?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    // Open store
    let store_path = config.resolve_store_path(cli.store_path.as_deref());
    let mut store = TaskStore::load(FileStorage::open(&store_path)?);

    let mut filter = Filter::All;

    match cli.command {
        Commands::Add { title } => {
            if store.add(&title.join(" ")).is_none() {
                println!("Nothing added: title is empty");
            }
        }
        Commands::Toggle { id } => {
            let id = resolve_id(&store, &id);
            if !store.toggle(&id) {
                println!("No task with id {}", id);
            }
        }
        Commands::Delete { id } => {
            let id = resolve_id(&store, &id);
            if !store.delete(&id) {
                println!("No task with id {}", id);
            }
        }
        Commands::Edit { id, title } => {
            let id = resolve_id(&store, &id);
            if !store.contains(&id) {
                println!("No task with id {}", id);
            } else if !store.update_title(&id, &title.join(" ")) {
                println!("Title unchanged");
            }
        }
        Commands::ClearCompleted => {
            if store.counts().completed == 0 {
                println!("No completed tasks to clear");
            } else {
                let removed = store.clear_completed();
                println!("Cleared {} completed task(s)", removed);
            }
        }
        Commands::List { filter: name } => {
            filter = name.parse()?;
        }
    }

    if !store.last_persist_ok() {
        eprintln!("{}", "Warning: change could not be saved and will be lost on exit".yellow());
    }

    render(&store, filter);
    Ok(())
}

/// Accept a unique id prefix as shorthand for the full id
fn resolve_id<S: KeyValueStore>(store: &TaskStore<S>, input: &str) -> String {
    if store.contains(input) {
        return input.to_string();
    }

    let mut matches = store.tasks().iter().filter(|t| t.id.starts_with(input));
    match (matches.next(), matches.next()) {
        (Some(task), None) => task.id.clone(),
        _ => input.to_string(),
    }
}

fn render<S: KeyValueStore>(store: &TaskStore<S>, filter: Filter) {
    let tasks = store.filtered(filter);

    if tasks.is_empty() {
        println!("{}", format!("No {} tasks", filter).dimmed());
    }

    for task in tasks {
        println!("{}", render_task(task));
    }

    let counts = store.counts();
    println!(
        "{} remaining, {} completed",
        counts.remaining.to_string().bold(),
        counts.completed
    );
}

fn render_task(task: &Task) -> String {
    let created = chrono::DateTime::from_timestamp_millis(task.created_at)
        .map(|dt| dt.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    if task.completed {
        format!(
            "{} {} {} {}",
            "[x]".green(),
            task.title.strikethrough().dimmed(),
            task.id.dimmed(),
            created.dimmed()
        )
    } else {
        format!("[ ] {} {} {}", task.title, task.id.dimmed(), created.dimmed())
    }
}
