use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use todo_list::DEFAULT_STORAGE_KEY;

/// Optional settings file looked up in the working directory (`task-cli.toml`, `.yaml`, ...).
pub const CONFIG_FILE: &str = "task-cli";
pub const ENV_PREFIX: &str = "TASK_CLI";
pub const DEFAULT_DATA_DIR: &str = ".task-cli";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub log_level: String,
}

impl Settings {
    /// Built-in defaults, then the optional settings file, then `TASK_CLI_*`
    /// environment variables.
    pub fn load() -> anyhow::Result<Self> {
        let s = config::Config::builder()
            .set_default("data_dir", DEFAULT_DATA_DIR)?
            .set_default("storage_key", DEFAULT_STORAGE_KEY)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Ok(s.try_deserialize()?)
    }

    /// The configured level, falling back to `warn` when it does not parse.
    pub fn log_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::WARN)
    }
}
