//! Settings of the `tallybook` binary.
//!
//! Layered, last wins: `settings.toml` (or the file given with `--config`),
//! `TALLYBOOK__<SECTION>__<KEY>` environment variables, command line flags.

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "settings.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("database kind `{0}` requires `database.{1}`")]
    MissingDatabaseField(&'static str, &'static str),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    #[default]
    Memory,
    Sqlite,
    Url,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Database {
    pub kind: DatabaseKind,
    /// File path, used when `kind = "sqlite"`.
    pub path: Option<String>,
    /// Full connection URL, used when `kind = "url"`.
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    /// Extra attempts after a failed connect.
    pub connect_retries: u32,
    pub retry_delay_secs: u64,
    pub sqlx_logging: bool,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            kind: DatabaseKind::Memory,
            path: None,
            url: None,
            max_connections: None,
            connect_retries: 3,
            retry_delay_secs: 5,
            sqlx_logging: false,
        }
    }
}

impl Database {
    pub fn connection_url(&self) -> Result<String, SettingsError> {
        match self.kind {
            DatabaseKind::Memory => Ok("sqlite::memory:".to_string()),
            DatabaseKind::Sqlite => self
                .path
                .as_ref()
                .map(|path| format!("sqlite:{path}?mode=rwc"))
                .ok_or(SettingsError::MissingDatabaseField("sqlite", "path")),
            DatabaseKind::Url => self
                .url
                .clone()
                .ok_or(SettingsError::MissingDatabaseField("url", "url")),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub database: Database,
}

#[derive(Debug, Parser)]
#[command(name = "tallybook", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the log level (e.g. debug).
    #[arg(long)]
    level: Option<String>,
    /// Override the bind address.
    #[arg(long)]
    bind: Option<String>,
    /// Override the listening port.
    #[arg(long)]
    port: Option<u16>,
}

impl Settings {
    /// Reads the config file (if present) and the environment.
    pub fn from_sources(config_path: &str) -> Result<Self, SettingsError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("TALLYBOOK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

pub fn load() -> Result<Settings, SettingsError> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut settings = Settings::from_sources(config_path)?;

    if let Some(level) = args.level {
        settings.app.level = level;
    }
    if let Some(bind) = args.bind {
        settings.server.bind = bind;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }

    Ok(settings)
}
