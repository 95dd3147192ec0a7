use anyhow::Context;
use clap::Parser;
use task_cli::{Cli, FileStore, Settings};
use todo_list::TaskStore;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let mut settings = Settings::load().context("cannot load settings")?;
    if let Some(data_dir) = args.data_dir {
        settings.data_dir = data_dir;
    }

    tracing_subscriber::fmt()
        .with_max_level(settings.log_level())
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?settings, "loaded settings");

    let storage = FileStore::new(&settings.data_dir);
    let mut tasks = TaskStore::open_with_key(storage, settings.storage_key.as_str());

    let stdout = std::io::stdout();
    task_cli::run(args.command, &mut tasks, &mut stdout.lock())
}
