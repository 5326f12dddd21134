//! Server configuration.
//!
//! Layers, later wins: built-in defaults, optional TOML file, environment,
//! command line.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;
use trafficwatch_core::ExtractorConfig;

pub const DEFAULT_WEBHOOK_PATH: &str = "/waze/webhook";

/// Paths served by the query side, which the webhook may not shadow
const RESERVED_PATHS: [&str; 3] = ["/api/traffic", "/api/stats", "/health"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Root of the batch store
    pub data_dir: PathBuf,
    pub webhook_path: String,
    /// Shared secret expected in `X-Secret-Token`; webhook calls are refused
    /// while unset
    pub secret_token: Option<String>,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
    pub max_body_bytes: usize,
    pub route: ExtractorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            data_dir: PathBuf::from("data"),
            webhook_path: DEFAULT_WEBHOOK_PATH.to_string(),
            secret_token: None,
            request_timeout_secs: 30,
            max_concurrent_requests: 64,
            max_body_bytes: 10 * 1024 * 1024,
            route: ExtractorConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Configured secret, with an empty value treated as unset
    pub fn secret(&self) -> Option<&str> {
        self.secret_token.as_deref().filter(|s| !s.is_empty())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.webhook_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "webhook_path must start with '/', got '{}'",
                self.webhook_path
            )));
        }
        if self.webhook_path.contains(['{', '}'])
            || self
                .webhook_path
                .split('/')
                .any(|segment| segment.starts_with([':', '*']))
        {
            return Err(ConfigError::Invalid(format!(
                "webhook_path '{}' must be a literal path without captures or wildcards",
                self.webhook_path
            )));
        }
        if RESERVED_PATHS.contains(&self.webhook_path.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "webhook_path '{}' clashes with a query endpoint",
                self.webhook_path
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_requests must be positive".to_string(),
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Route-filtered traffic feed webhook
#[derive(Parser, Debug)]
#[command(name = "trafficwatch-server", version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Address to listen on
    #[arg(long, env = "TRAFFICWATCH_BIND")]
    pub bind: Option<SocketAddr>,
    /// Directory holding raw and processed batches
    #[arg(long, env = "TRAFFICWATCH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
    /// Path the feed posts to
    #[arg(long, env = "WEBHOOK_URL")]
    pub webhook_path: Option<String>,
    /// Shared secret expected in the X-Secret-Token header
    #[arg(long, env = "SECRET_TOKEN", hide_env_values = true)]
    pub secret_token: Option<String>,
}

impl Cli {
    /// Builds the effective configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or the result is
    /// invalid
    pub fn resolve(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(webhook_path) = self.webhook_path {
            config.webhook_path = webhook_path;
        }
        if let Some(secret_token) = self.secret_token {
            config.secret_token = Some(secret_token);
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_feed_setup() {
        let config = ServerConfig::default();
        assert_eq!(config.webhook_path, "/waze/webhook");
        assert_eq!(config.bind.port(), 5000);
        assert_eq!(config.route.corridor_meters, 500.0);
        assert_eq!(config.route.points.len(), 3);
        assert!(config.secret().is_none());
        config.validate().unwrap();
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let config = ServerConfig::from_toml_str(
            r#"
            bind = "127.0.0.1:8080"
            webhook_path = "/feed"
            secret_token = "abc"

            [route]
            points = [[-99.0, 19.0], [-99.1, 19.1]]
            free_flow_speed_kmh = 60.0
            "#,
        )
        .unwrap();

        assert_eq!(config.bind, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.webhook_path, "/feed");
        assert_eq!(config.secret(), Some("abc"));
        assert_eq!(config.route.points, vec![[-99.0, 19.0], [-99.1, 19.1]]);
        assert_eq!(config.route.free_flow_speed_kmh, 60.0);
        assert_eq!(config.route.corridor_meters, 500.0);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ServerConfig::from_toml_str("secret = \"typo\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn empty_secret_counts_as_unset() {
        let config = ServerConfig {
            secret_token: Some(String::new()),
            ..ServerConfig::default()
        };
        assert!(config.secret().is_none());
    }

    #[test]
    fn bad_webhook_paths_are_rejected() {
        for path in [
            "waze/webhook",
            "/api/stats",
            "/:hook",
            "/waze/*rest",
            "/waze/{id}",
            "/waze/hook}",
        ] {
            let config = ServerConfig {
                webhook_path: path.to_string(),
                ..ServerConfig::default()
            };
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))), "{path}");
        }
    }

    #[test]
    fn command_line_wins_over_defaults() {
        let cli = Cli::try_parse_from([
            "trafficwatch-server",
            "--bind",
            "127.0.0.1:9000",
            "--data-dir",
            "/tmp/traffic",
            "--webhook-path",
            "/hooks/waze",
            "--secret-token",
            "t0k3n",
        ])
        .unwrap();
        let config = cli.resolve().unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/traffic"));
        assert_eq!(config.webhook_path, "/hooks/waze");
        assert_eq!(config.secret(), Some("t0k3n"));
    }
}
