//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Function hosting settings (name, custom domain routing).
    pub function: FunctionConfig,

    /// Reference data location.
    pub data: DataConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Chat notification settings.
    pub notify: NotifyConfig,
}

impl ServiceConfig {
    /// The `host:port` pair the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listener.host, self.listener.port)
    }

    /// Resolve the directory holding the reference data files.
    ///
    /// A relative data directory is looked up under the platform's uploaded
    /// source directory when that directory exists in the working directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data.resolve_in(Path::new("."))
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Port to listen on.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// How the function is hosted behind the platform.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FunctionConfig {
    /// Function name; also the path prefix the function is served under.
    pub name: String,

    /// When true, the full request path reaches the function unstripped.
    pub custom_domain: bool,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            name: "doiliveinademocracy".to_string(),
            custom_domain: false,
        }
    }
}

/// Reference data location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the JSON tables.
    pub dir: PathBuf,

    /// Country code to country name table.
    pub countries_file: String,

    /// Democracy index table.
    pub democracies_file: String,

    /// Directory the hosting platform unpacks uploaded sources into.
    pub source_dir_hint: String,
}

impl DataConfig {
    /// Resolve `dir` relative to `base`, preferring the uploaded source directory.
    pub fn resolve_in(&self, base: &Path) -> PathBuf {
        if self.dir.is_absolute() || self.source_dir_hint.is_empty() {
            return self.dir.clone();
        }
        let hinted = base.join(&self.source_dir_hint);
        if hinted.is_dir() {
            tracing::info!(directory = %hinted.display(), "Found top-level source directory");
            hinted.join(&self.dir)
        } else {
            base.join(&self.dir)
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            countries_file: "countries.json".to_string(),
            democracies_file: "democracies.json".to_string(),
            source_dir_hint: "serverless_function_source_code".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Prometheus exporter address.
    pub metrics_address: String,

    /// Cloud project used to qualify trace ids.
    pub cloud_project: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Text,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
            cloud_project: None,
        }
    }
}

/// Chat notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Bot token. Notifications are off unless both token and channel are set.
    pub slack_token: Option<String>,

    /// Channel to post to.
    pub slack_channel: Option<String>,

    /// Minimum level forwarded to the channel.
    pub slack_level: String,

    /// Log every outgoing post to stderr.
    pub slack_debug: bool,

    /// Base URL of the chat API.
    pub api_base: String,
}

impl NotifyConfig {
    /// True when both a token and a channel are configured.
    pub fn is_enabled(&self) -> bool {
        matches!(
            (&self.slack_token, &self.slack_channel),
            (Some(token), Some(channel)) if !token.is_empty() && !channel.is_empty()
        )
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            slack_token: None,
            slack_channel: None,
            slack_level: "error".to_string(),
            slack_debug: false,
            api_base: "https://slack.com/api".to_string(),
        }
    }
}
