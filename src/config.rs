//! Client configuration: a JSON file in the platform config directory,
//! with a couple of environment overrides on top.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

const CONFIG_FILE_NAME: &str = "config.json";
const SESSION_FILE_NAME: &str = "session.json";
const LOG_FILE_NAME: &str = "taskdeck.log";

const MIN_TIMEOUT_SECS: u64 = 1;
const MAX_TIMEOUT_SECS: u64 = 300;
const MAX_FLASH_MILLIS: u64 = 600_000;

pub const ENV_API_URL: &str = "TASKDECK_API_URL";
pub const ENV_SESSION_FILE: &str = "TASKDECK_SESSION_FILE";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "taskdeck")
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    project_dirs()
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// How long a success banner stays up.
    pub flash_millis: u64,
    pub session_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            request_timeout_secs: 15,
            flash_millis: 3000,
            session_file: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Reads the file at `path`; a missing or blank file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_str(trimmed).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.clamped())
    }

    /// Pulls durations back into a usable range. A zero timeout would fail
    /// every request and a huge flash overflows the banner deadline.
    pub fn clamped(mut self) -> Self {
        let timeout = self
            .request_timeout_secs
            .clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);
        if timeout != self.request_timeout_secs {
            tracing::warn!(
                configured = self.request_timeout_secs,
                used = timeout,
                "request_timeout_secs out of range"
            );
            self.request_timeout_secs = timeout;
        }
        if self.flash_millis > MAX_FLASH_MILLIS {
            tracing::warn!(
                configured = self.flash_millis,
                used = MAX_FLASH_MILLIS,
                "flash_millis too large"
            );
            self.flash_millis = MAX_FLASH_MILLIS;
        }
        self
    }

    /// Loads from `path` (or the default location) and applies the
    /// process environment.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };
        Ok(Self::load(&path)?.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            self.api_base_url = url;
        }
        if let Some(file) = lookup(ENV_SESSION_FILE).filter(|v| !v.is_empty()) {
            self.session_file = Some(PathBuf::from(file));
        }
        self
    }

    /// Writes a default config to `path`. Returns `false` when one is
    /// already there.
    pub fn init(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut content = serde_json::to_string_pretty(&Self::default()).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        content.push('\n');
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(true)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS),
        )
    }

    pub fn flash_delay(&self) -> Duration {
        Duration::from_millis(self.flash_millis.min(MAX_FLASH_MILLIS))
    }

    pub fn session_path(&self) -> Option<PathBuf> {
        self.session_file
            .clone()
            .or_else(|| project_dirs().map(|d| d.data_dir().join(SESSION_FILE_NAME)))
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| project_dirs().map(|d| d.data_dir().join(LOG_FILE_NAME)))
    }
}
