//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/slotz/config.toml` by default:
//!
//! ```toml
//! debug = false
//! seed_file = "/home/me/.local/share/slotz/seed.toml"
//!
//! [calendar]
//! work_hours = "09:00-17:00"
//! granularity_minutes = 15
//!
//! [server]
//! socket_path = "/run/user/1000/slotz.sock"
//! timeout = 5
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use slotz_core::WorkingHours;

use crate::error::{ClientError, ClientResult};

/// Configuration for the slotz CLI and the server it starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Seed data loaded into the in-memory repository.
    pub seed_file: Option<PathBuf>,

    /// Working calendar settings.
    pub calendar: CalendarSettings,

    /// Server/connection settings.
    pub server: ServerSettings,
}

/// Working calendar settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Working day in UTC, `HH:MM-HH:MM`.
    pub work_hours: String,

    /// Step between candidate slot starts.
    pub granularity_minutes: i64,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            work_hours: "09:00-17:00".to_string(),
            granularity_minutes: 15,
        }
    }
}

impl CalendarSettings {
    /// Builds the working calendar, rejecting malformed hours or a
    /// non-positive step.
    pub fn working_hours(&self) -> ClientResult<WorkingHours> {
        let granularity = chrono::Duration::try_minutes(self.granularity_minutes)
            .ok_or_else(|| {
                ClientError::Config(format!(
                    "granularity_minutes {} is out of range",
                    self.granularity_minutes
                ))
            })?;
        WorkingHours::parse(&self.work_hours)
            .and_then(|hours| hours.with_granularity(granularity))
            .map_err(|e| ClientError::Config(format!("[calendar] {}", e)))
    }
}

/// Server/connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Path to the server socket.
    pub socket_path: Option<PathBuf>,

    /// Client request timeout in seconds.
    pub timeout: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            socket_path: None,
            timeout: 5,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> ClientResult<Self> {
        toml::from_str(content)
            .map_err(|e| ClientError::Config(format!("failed to parse config: {}", e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("slotz")
    }

    /// Socket path: explicit override, then config, then the per-user default.
    pub fn socket_path(&self, cli_override: Option<&Path>) -> PathBuf {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.server.socket_path.clone())
            .unwrap_or_else(slotz_server::default_socket_path)
    }

    /// Request timeout: explicit override in seconds, then config.
    pub fn timeout(&self, cli_override: Option<u64>) -> Duration {
        Duration::from_secs(cli_override.unwrap_or(self.server.timeout))
    }
}
