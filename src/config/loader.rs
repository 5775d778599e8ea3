//! Configuration loading from disk and the environment.

use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::{LogFormat, ServiceConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServiceConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Settings taken from the command line or environment.
///
/// Anything set here wins over the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// Port to listen on.
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Function name, also the path prefix.
    #[arg(long, env = "FUNCTION")]
    pub function: Option<String>,

    /// Pass full request paths through to the function.
    #[arg(long, env = "CUSTOM_DOMAIN", value_parser = parse_bool)]
    pub custom_domain: Option<bool>,

    /// Directory holding the reference data files.
    #[arg(long, env = "DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log format (text or json).
    #[arg(long, env = "LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Cloud project used to qualify trace ids.
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    pub cloud_project: Option<String>,

    /// Chat bot token.
    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true)]
    pub slack_token: Option<String>,

    /// Chat channel for notifications.
    #[arg(long, env = "SLACK_CHANNEL")]
    pub slack_channel: Option<String>,

    /// Minimum level forwarded to chat.
    #[arg(long, env = "SLACK_LEVEL")]
    pub slack_level: Option<String>,

    /// Trace outgoing chat posts.
    #[arg(long, env = "SLACK_DEBUG", value_parser = parse_bool)]
    pub slack_debug: Option<bool>,
}

impl ConfigOverrides {
    /// Apply the overrides on top of `config`.
    pub fn apply(self, config: &mut ServiceConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(function) = self.function.filter(|f| !f.is_empty()) {
            config.function.name = function;
        }
        if let Some(custom_domain) = self.custom_domain {
            config.function.custom_domain = custom_domain;
        }
        if let Some(dir) = self.data_dir {
            config.data.dir = dir;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
        if let Some(project) = self.cloud_project.filter(|p| !p.is_empty()) {
            config.observability.cloud_project = Some(project);
        }
        if let Some(token) = self.slack_token.filter(|t| !t.is_empty()) {
            config.notify.slack_token = Some(token);
        }
        if let Some(channel) = self.slack_channel.filter(|c| !c.is_empty()) {
            config.notify.slack_channel = Some(channel);
        }
        if let Some(level) = self.slack_level.filter(|l| !l.is_empty()) {
            config.notify.slack_level = level;
        }
        if let Some(debug) = self.slack_debug {
            config.notify.slack_debug = debug;
        }
    }
}

/// Build the effective configuration: optional file, then overrides, then validation.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a boolean the way platform environment flags are usually written.
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        other => Err(format!("invalid boolean: {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("1"), Ok(true));
        assert_eq!(parse_bool("True"), Ok(true));
        assert_eq!(parse_bool("F"), Ok(false));
        assert!(parse_bool("yes").is_err());
        assert!(parse_bool("").is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[function]\nname = \"democracy\"\ncustom_domain = true").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.function.name, "democracy");
        assert!(config.function.custom_domain);
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nport = 0").unwrap();

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors, vec![ValidationError::ZeroPort]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_example_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config.example.toml");
        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.observability.log_format, LogFormat::Text);
        assert!(!config.notify.is_enabled());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Path::new("/nonexistent/democracy.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_overrides_win() {
        let overrides = ConfigOverrides {
            port: Some(9000),
            function: Some("fn".into()),
            custom_domain: Some(true),
            slack_level: Some("warn".into()),
            ..Default::default()
        };
        let config = resolve_config(None, overrides).unwrap();
        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.function.name, "fn");
        assert!(config.function.custom_domain);
        assert_eq!(config.notify.slack_level, "warn");
    }

    #[test]
    fn test_empty_overrides_are_ignored() {
        let overrides = ConfigOverrides {
            function: Some(String::new()),
            ..Default::default()
        };
        let config = resolve_config(None, overrides).unwrap();
        assert_eq!(config.function.name, "doiliveinademocracy");
    }
}
