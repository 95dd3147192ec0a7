//! Terminal front end for the task list.
pub mod file_store;
pub mod settings;

use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use todo_list::{
    Category, EXPORT_FILE_NAME, KeyValueStore, NewTask, Priority, Selector, StoreError, Task,
    TaskFilter, TaskId, TaskStore,
};

pub use file_store::FileStore;
pub use settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "task-cli", version, about = "Keep a personal task list")]
pub struct Cli {
    /// Directory holding the task list, overriding the configured one
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Add a task to the end of the list
    Add {
        text: String,
        #[arg(short, long, default_value_t)]
        category: Category,
        #[arg(short, long, default_value_t)]
        priority: Priority,
        /// Due date as YYYY-MM-DD
        #[arg(short, long)]
        due: Option<NaiveDate>,
    },
    /// Show tasks, optionally filtered
    List {
        /// Case-insensitive text to look for
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(short, long, default_value_t)]
        category: Selector<Category>,
        #[arg(short, long, default_value_t)]
        priority: Selector<Priority>,
    },
    /// Mark a task done, or open again
    Toggle { id: TaskId },
    /// Replace the text of a task
    Edit { id: TaskId, text: String },
    /// Remove a task
    Delete { id: TaskId },
    /// Move a task to a 1-based position in the list
    Move { id: TaskId, position: usize },
    /// Put every task in the given order
    Reorder {
        #[arg(required = true)]
        ids: Vec<TaskId>,
    },
    /// Show total, completed and overdue counts
    Stats,
    /// Write all tasks to a JSON file
    Export {
        #[arg(default_value = EXPORT_FILE_NAME)]
        path: PathBuf,
    },
    /// Append the tasks of a previously exported JSON file
    Import { path: PathBuf },
}

/// Runs one command against the store, writing what the user should see to `out`.
pub fn run<S: KeyValueStore>(
    command: Commands,
    store: &mut TaskStore<S>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Commands::Add {
            text,
            category,
            priority,
            due,
        } => {
            let new_task = NewTask::new(text)
                .category(category)
                .priority(priority)
                .due(due);
            match store.create(new_task)? {
                Some(task) => writeln!(out, "Task added with ID {}", task.id())?,
                None => writeln!(out, "Nothing added: task text is empty")?,
            }
        }
        Commands::List {
            search,
            category,
            priority,
        } => {
            let criteria = TaskFilter::new(search, category, priority);
            let visible = store.filtered(&criteria);
            if visible.is_empty() {
                writeln!(out, "No tasks")?;
            }
            for task in visible {
                writeln!(out, "{}", format_task(task))?;
            }
            writeln!(out, "{}", store.stats())?;
        }
        Commands::Toggle { id } => {
            if store.toggle_complete(id)? {
                let done = store.get(id).is_some_and(Task::is_completed);
                writeln!(
                    out,
                    "Task {id} marked {}",
                    if done { "done" } else { "open" }
                )?;
            } else {
                writeln!(out, "No task with ID {id}")?;
            }
        }
        Commands::Edit { id, text } => {
            if store.rename(id, &text)? {
                writeln!(out, "Task {id} updated")?;
            } else if store.get(id).is_some() {
                writeln!(out, "Nothing changed: task text is empty")?;
            } else {
                writeln!(out, "No task with ID {id}")?;
            }
        }
        Commands::Delete { id } => {
            if store.delete(id)? {
                writeln!(out, "Task {id} deleted")?;
            } else {
                writeln!(out, "No task with ID {id}")?;
            }
        }
        Commands::Move { id, position } => {
            if store.move_to(id, position.saturating_sub(1))? {
                writeln!(out, "Task {id} moved")?;
            } else {
                writeln!(out, "No task with ID {id}")?;
            }
        }
        Commands::Reorder { ids } => {
            store.reorder(&ids)?;
            writeln!(out, "Tasks reordered")?;
        }
        Commands::Stats => {
            writeln!(out, "{}", store.stats())?;
        }
        Commands::Export { path } => {
            let document = store.export()?;
            fs::write(&path, document)
                .with_context(|| format!("cannot write {}", path.display()))?;
            writeln!(out, "Exported {} tasks to {}", store.len(), path.display())?;
        }
        Commands::Import { path } => {
            let blob =
                fs::read(&path).with_context(|| format!("cannot read {}", path.display()))?;
            match store.import_append(&blob) {
                Ok(imported) => writeln!(out, "Imported {} tasks", imported.len())?,
                Err(StoreError::Import(err)) => {
                    tracing::warn!(path = %path.display(), cause = %err.cause(), "rejected import");
                    bail!("{err}.");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
    Ok(())
}

/// One list line: id, completion box, text and metadata.
pub fn format_task(task: &Task) -> String {
    let due = task
        .due_date()
        .map_or_else(|| "None".to_string(), |date| date.to_string());
    format!(
        "{:>3}. [{}] {}  (Category: {} | Priority: {} | Due: {})",
        task.id(),
        if task.is_completed() { "x" } else { " " },
        task.text(),
        task.category(),
        task.priority(),
        due
    )
}
