//! Configuration loading (§4.11, ambient). Loads a [`Settings`] — daemon
//! connection parameters plus the ordered [`ConfigFile`] of render targets —
//! from a TOML file, with a handful of environment variable overrides.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_PATH: &str = "/etc/docker-gen/config.toml";

/// One render target (§3).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub dest: PathBuf,
    /// Handlebars template path, consumed by `HandlebarsRenderer` (§4.10).
    pub template: PathBuf,
    pub watch: bool,
    /// Seconds; `0` disables periodic regeneration.
    pub interval: u64,
    pub wait: Option<Wait>,
    pub notify_cmd: String,
    pub notify_output: bool,
    pub notify_containers: HashMap<String, String>,
    pub notify_services: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dest: PathBuf::new(),
            template: PathBuf::new(),
            watch: false,
            interval: 0,
            wait: None,
            notify_cmd: String::new(),
            notify_output: false,
            notify_containers: HashMap::new(),
            notify_services: HashMap::new(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), String> {
        if self.dest.as_os_str().is_empty() {
            return Err("config.dest must not be empty".to_string());
        }
        if let Some(wait) = &self.wait {
            if wait.max < wait.min {
                return Err(format!(
                    "config for {:?}: wait.max must be >= wait.min",
                    self.dest
                ));
            }
        }
        Ok(())
    }
}

/// Debounce window (§4.7). `Max >= Min >= 0`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Wait {
    #[serde(with = "humantime_serde")]
    pub min: Duration,
    #[serde(with = "humantime_serde")]
    pub max: Duration,
}

/// Ordered sequence of [`Config`] (§3).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ConfigFile {
    pub configs: Vec<Config>,
}

impl ConfigFile {
    pub fn filter_watches(&self) -> Vec<&Config> {
        self.configs.iter().filter(|c| c.watch).collect()
    }

    pub fn filter_intervals(&self) -> Vec<&Config> {
        self.configs.iter().filter(|c| c.interval > 0).collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.configs.is_empty() {
            return Err("at least one config is required".to_string());
        }
        for config in &self.configs {
            config.validate()?;
        }
        Ok(())
    }
}

/// Top-level settings: daemon connection parameters plus the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Empty string means "use the platform default socket".
    pub docker_endpoint: String,
    pub all: bool,
    pub configs: ConfigFile,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            docker_endpoint: String::new(),
            all: false,
            configs: ConfigFile::default(),
        }
    }
}

impl Settings {
    /// Load from `GENERATOR_CONFIG_FILE` (default `/etc/docker-gen/config.toml`),
    /// then apply environment variable overrides, then validate.
    pub fn load() -> Result<Self, String> {
        let config_path = std::env::var("GENERATOR_CONFIG_FILE")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut settings = if Path::new(&config_path).exists() {
            tracing::info!(path = %config_path, "loading configuration");
            Self::from_file(&config_path)?
        } else {
            tracing::warn!(path = %config_path, "config file not found, using defaults");
            Settings::default()
        };

        if let Ok(endpoint) = std::env::var("GENERATOR_DOCKER_ENDPOINT") {
            settings.docker_endpoint = endpoint;
        }
        if let Ok(all) = std::env::var("GENERATOR_ALL") {
            settings.all = all.parse().unwrap_or(settings.all);
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &str) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {path}: {e}"))?;
        toml::from_str(&contents).map_err(|e| format!("failed to parse {path}: {e}"))
    }

    pub fn validate(&self) -> Result<(), String> {
        self.configs.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_dest(dest: &str) -> Config {
        Config {
            dest: PathBuf::from(dest),
            ..Config::default()
        }
    }

    #[test]
    fn validate_rejects_empty_dest() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_max_less_than_min() {
        let mut config = config_with_dest("/tmp/out.conf");
        config.wait = Some(Wait {
            min: Duration::from_secs(5),
            max: Duration::from_secs(1),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_equal_min_max() {
        let mut config = config_with_dest("/tmp/out.conf");
        config.wait = Some(Wait {
            min: Duration::from_secs(5),
            max: Duration::from_secs(5),
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn filter_watches_returns_only_watching_configs() {
        let file = ConfigFile {
            configs: vec![
                Config {
                    watch: true,
                    ..config_with_dest("/tmp/a")
                },
                config_with_dest("/tmp/b"),
            ],
        };
        assert_eq!(file.filter_watches().len(), 1);
    }

    #[test]
    fn filter_intervals_returns_only_positive_interval_configs() {
        let file = ConfigFile {
            configs: vec![
                Config {
                    interval: 30,
                    ..config_with_dest("/tmp/a")
                },
                config_with_dest("/tmp/b"),
            ],
        };
        assert_eq!(file.filter_intervals().len(), 1);
    }

    #[test]
    fn config_file_validate_rejects_empty() {
        let file = ConfigFile::default();
        assert!(file.validate().is_err());
    }
}
