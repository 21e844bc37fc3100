use anyhow::Result;
use serde::Deserialize;
use std::{fs::File, str::FromStr};
use tracing::Level;
use tracing_subscriber::{
    filter::EnvFilter,
    fmt::{self, writer::MakeWriterExt},
    prelude::*,
    Registry,
};

/// Defines the format for log messages.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    Json,
    #[default]
    Plain,
}

/// Defines the destination for log output.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogOutput {
    #[default]
    Stdout,
    File,
}

/// Logging configuration, typically deserialized from the application's
/// config file alongside the connector settings.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct LogConfig {
    /// Log level, e.g. "info", "debug", "trace".
    pub level: String,
    /// Log output format.
    pub format: LogFormat,
    /// Log output destination.
    pub output: LogOutput,
    /// Path to the log file, required if output is "file".
    pub file_path: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Plain,
            output: LogOutput::Stdout,
            file_path: None,
        }
    }
}

/// Installs the global tracing subscriber described by `config`.
///
/// A `RUST_LOG` environment variable, when present, takes precedence over the
/// configured level.
pub fn init(config: &LogConfig) -> Result<()> {
    let log_level = Level::from_str(&config.level).unwrap_or(Level::INFO);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let subscriber = Registry::default().with(env_filter);

    match config.output {
        LogOutput::File => {
            let file_path = config.file_path.as_deref().ok_or_else(|| {
                anyhow::anyhow!("Log output is 'file' but 'file-path' is not specified")
            })?;
            let log_file = File::create(file_path)?;
            let file_writer = log_file.with_max_level(log_level);

            match config.format {
                LogFormat::Json => subscriber
                    .with(fmt::layer().with_writer(file_writer).json())
                    .init(),
                LogFormat::Plain => subscriber
                    .with(fmt::layer().with_writer(file_writer).pretty())
                    .init(),
            }
        }
        LogOutput::Stdout => {
            let stdout_writer = std::io::stdout.with_max_level(log_level);
            match config.format {
                LogFormat::Json => subscriber
                    .with(fmt::layer().with_writer(stdout_writer).json())
                    .init(),
                LogFormat::Plain => subscriber
                    .with(fmt::layer().with_writer(stdout_writer).pretty())
                    .init(),
            }
        }
    };

    Ok(())
}
