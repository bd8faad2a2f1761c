use std::{
    io,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use todo_core::query::{QueryOptions, DEFAULT_RETRY, DEFAULT_RETRY_DELAY};
use url::Url;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "TODO_CONFIG";

pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Host settings. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Origin that relative API paths are resolved against.
    pub origin: Url,
    /// Retries after a failed read before the error is shown.
    pub retry: u32,
    /// Milliseconds before the first retry, doubled for each following one.
    pub retry_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            retry: DEFAULT_RETRY,
            retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
        }
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .parse()
    }

    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            retry: self.retry,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

/// Loads the config from `path`, else from `$TODO_CONFIG`, else defaults.
#[tracing::instrument]
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    match path {
        Some(path) => Config::from_file(&path),
        None => {
            tracing::debug!("no config file, using defaults");
            Ok(Config::default())
        }
    }
}

fn default_origin() -> Url {
    Url::parse(DEFAULT_ORIGIN).expect("default origin is a valid URL")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = "".parse().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.origin.as_str(), "http://127.0.0.1:3000/");
        assert_eq!(config.retry, 3);
        assert_eq!(config.query_options(), QueryOptions::default());
    }

    #[test]
    fn parses_all_keys() {
        let config: Config = r#"
origin = "http://todo.internal:8080"
retry = 2
retry_delay_ms = 250
"#
        .parse()
        .unwrap();
        assert_eq!(config.origin.host_str(), Some("todo.internal"));
        assert_eq!(config.origin.port(), Some(8080));
        assert_eq!(
            config.query_options(),
            QueryOptions {
                retry: 2,
                retry_delay: Duration::from_millis(250),
            }
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = "base_url = \"x\"".parse::<Config>().unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_invalid_origin() {
        assert!("origin = \"not a url\"".parse::<Config>().is_err());
    }

    #[test]
    fn loads_from_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "retry = 1\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.retry, 1);
        assert_eq!(config.origin, Config::default().origin);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }
}
