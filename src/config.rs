use crate::permissions::Permissions;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SERVER_ADDRESS: &str = "http://localhost:31416";
const CONFIG_DIR_NAME: &str = ".ptsl-client";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Client settings. Missing file fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PtslConfig {
    pub server_address: String,
    pub company_name: String,
    pub application_name: String,
    /// `ALLOW_WRITES` syntax: empty, `all`, or comma-separated groups.
    pub allow_writes: String,
    /// Upper bound on any single wait for the host; unset waits forever.
    pub call_timeout_ms: Option<u64>,
    pub poll_interval_ms: u64,
}

impl Default for PtslConfig {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            company_name: "PTSL".to_string(),
            application_name: "ptsl-cli".to_string(),
            allow_writes: String::new(),
            call_timeout_ms: None,
            poll_interval_ms: 500,
        }
    }
}

impl PtslConfig {
    /// Defaults, then the user config file, then `.env` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (for development)
        dotenvy::dotenv().ok();

        let mut config = match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }
        let data = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, data).map_err(io_err)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(address) = env::var("PTSL_SERVER_ADDRESS") {
            self.server_address = address;
        }
        if let Ok(company) = env::var("PTSL_COMPANY_NAME") {
            self.company_name = company;
        }
        if let Ok(app) = env::var("PTSL_APPLICATION_NAME") {
            self.application_name = app;
        }
        if let Ok(allow) = env::var("ALLOW_WRITES") {
            self.allow_writes = allow;
        }
        if let Some(timeout) = parse_env_u64("PTSL_CALL_TIMEOUT_MS")? {
            self.call_timeout_ms = Some(timeout);
        }
        if let Some(interval) = parse_env_u64("PTSL_POLL_INTERVAL_MS")? {
            self.poll_interval_ms = interval;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.server_address.starts_with("http://")
            || self.server_address.starts_with("https://"))
        {
            return Err(ConfigError::InvalidValue {
                var: "server_address".to_string(),
                reason: format!(
                    "'{}' must start with http:// or https://",
                    self.server_address
                ),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                var: "poll_interval_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn permissions(&self) -> Permissions {
        Permissions::parse(&self.allow_writes)
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// `~/.ptsl-client/config.json`, when a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn parse_env_u64(var: &str) -> Result<Option<u64>, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "PTSL_SERVER_ADDRESS",
            "PTSL_COMPANY_NAME",
            "PTSL_APPLICATION_NAME",
            "ALLOW_WRITES",
            "PTSL_CALL_TIMEOUT_MS",
            "PTSL_POLL_INTERVAL_MS",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = PtslConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.call_timeout(), None);
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        env::set_var("PTSL_SERVER_ADDRESS", "http://studio.local:31416");
        env::set_var("ALLOW_WRITES", "memory");
        env::set_var("PTSL_CALL_TIMEOUT_MS", "2500");

        let mut config = PtslConfig::default();
        config.apply_env().unwrap();
        assert_eq!(config.server_address, "http://studio.local:31416");
        assert_eq!(config.allow_writes, "memory");
        assert_eq!(config.call_timeout(), Some(Duration::from_millis(2500)));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_env_number() {
        clear_env();
        env::set_var("PTSL_POLL_INTERVAL_MS", "soon");
        let mut config = PtslConfig::default();
        let err = config.apply_env().unwrap_err();
        assert!(err.to_string().contains("PTSL_POLL_INTERVAL_MS"));
        clear_env();
    }

    #[test]
    fn test_file_roundtrip_with_partial_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = PtslConfig {
            allow_writes: "all".to_string(),
            call_timeout_ms: Some(1000),
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(PtslConfig::from_file(&path).unwrap(), config);

        std::fs::write(&path, r#"{"server_address":"http://10.0.0.2:31416"}"#).unwrap();
        let partial = PtslConfig::from_file(&path).unwrap();
        assert_eq!(partial.server_address, "http://10.0.0.2:31416");
        assert_eq!(partial.poll_interval_ms, 500);
    }

    #[test]
    fn test_rejects_bare_address() {
        let config = PtslConfig {
            server_address: "localhost:31416".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
