use anyhow::{Context, Result};
use horizon_logger::LogConfig;
use serde::Deserialize;

/// The top-level configuration for the connector.
///
/// Aggregates the upstream endpoint settings, channel capacities, and the
/// logging configuration. Typically deserialized from a TOML file via
/// [`load_config`] and handed to [`crate::StreamClient::new`].
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ConnectorConfig {
    #[serde(default)]
    pub horizon: Horizon,
    #[serde(default)]
    pub channels: ChannelConfig,
    /// Logging configuration, consumed by the binary only.
    #[serde(default)]
    pub log: LogConfig,
}

/// Connection settings for the upstream ledger/indexing service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Horizon {
    /// Base URL of the service, e.g. `https://horizon.example.org`.
    /// A trailing slash is tolerated and stripped.
    pub base_url: String,
    /// TCP connect timeout for streaming requests, in seconds.
    pub connect_timeout_secs: u64,
    /// Optional paging token to start streaming from. When absent the feed
    /// starts wherever the server decides (usually "now").
    #[serde(default)]
    pub start_cursor: Option<String>,
}

/// Defines capacities for the channels used around the connector.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChannelConfig {
    /// Buffer capacity between the stream handler and the record consumer.
    pub record_buffer: usize,
}

impl Default for Horizon {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout_secs: 10,
            start_cursor: None,
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { record_buffer: 256 }
    }
}

/// Loads the connector configuration from a TOML file.
///
/// Values can be overridden through `HORIZON__`-prefixed environment
/// variables, e.g. `HORIZON__HORIZON__BASE-URL`.
pub fn load_config(path: &str) -> Result<ConnectorConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(config::Environment::with_prefix("HORIZON").separator("__"));

    let settings: ConnectorConfig = builder
        .build()
        .context(format!("Failed to build configuration from '{}'", path))?
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_logger::LogFormat;

    #[test]
    fn defaults_point_at_local_service() {
        let cfg = ConnectorConfig::default();
        assert_eq!(cfg.horizon.base_url, "http://127.0.0.1:8000");
        assert_eq!(cfg.horizon.connect_timeout_secs, 10);
        assert!(cfg.horizon.start_cursor.is_none());
        assert_eq!(cfg.channels.record_buffer, 256);
    }

    #[test]
    fn deserializes_from_toml() {
        let toml = r#"
            [horizon]
            base-url = "https://horizon.example.org"
            connect-timeout-secs = 5
            start-cursor = "12884905984-1"

            [channels]
            record-buffer = 64

            [log]
            level = "debug"
            format = "json"
            output = "stdout"
        "#;

        let cfg: ConnectorConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.horizon.base_url, "https://horizon.example.org");
        assert_eq!(cfg.horizon.connect_timeout_secs, 5);
        assert_eq!(cfg.horizon.start_cursor.as_deref(), Some("12884905984-1"));
        assert_eq!(cfg.channels.record_buffer, 64);
        assert_eq!(cfg.log.level, "debug");
        assert_eq!(cfg.log.format, LogFormat::Json);
    }
}
