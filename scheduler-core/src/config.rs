//! Application configuration and the persisted login session.
//!
//! Both live in `~/.config/thws-scheduler/`: `config.toml` for settings and
//! `session.toml` for the API token.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{
    APP_DIR_NAME, DEFAULT_API_BASE_URL, DEFAULT_DISPLAY_NAME, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_TIMEZONE,
};
use crate::error::{ScheduleError, ScheduleResult};
use crate::state::FailurePolicy;

/// Prefix of environment variables overriding config keys,
/// e.g. `THWS_SCHEDULER_TIMEZONE`.
pub const ENV_PREFIX: &str = "THWS_SCHEDULER";

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_keep_results_on_error() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// IANA name of the zone offset-less timestamps are read in
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Where exports are written unless `--out` is given
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Keep the previous result set when a fetch fails
    #[serde(default = "default_keep_results_on_error")]
    pub keep_results_on_error: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_base_url: default_api_base_url(),
            timezone: default_timezone(),
            output_dir: default_output_dir(),
            request_timeout_secs: default_request_timeout_secs(),
            keep_results_on_error: default_keep_results_on_error(),
        }
    }
}

/// `~/.config/thws-scheduler`
pub fn config_dir() -> ScheduleResult<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| ScheduleError::Config("Could not determine config directory".into()))?
        .join(APP_DIR_NAME))
}

impl AppConfig {
    pub fn config_path() -> ScheduleResult<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from the default location, creating a commented config file on
    /// first run.
    pub fn load() -> ScheduleResult<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            Self::create_default_config(&path)?;
        }

        Self::load_from(&path)
    }

    /// Layer defaults, the file at `path` (if present) and the environment.
    pub fn load_from(path: &Path) -> ScheduleResult<Self> {
        Self::build(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn build(path: &Path, env: Environment) -> ScheduleResult<Self> {
        debug!(path = %path.display(), "loading config");

        let config: AppConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// The configured time zone.
    pub fn tz(&self) -> ScheduleResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ScheduleError::Config(format!("Unknown time zone '{}'", self.timezone)))
    }

    /// Output directory with `~` expanded.
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.output_dir.to_string_lossy()).into_owned())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        if self.keep_results_on_error {
            FailurePolicy::Retain
        } else {
            FailurePolicy::Clear
        }
    }

    /// Create a config file with all options commented out.
    pub fn create_default_config(path: &Path) -> ScheduleResult<()> {
        let contents = format!(
            "\
# thws-scheduler configuration
# Every key can also be set through THWS_SCHEDULER_<KEY> environment variables.

# Schedule API:
# api_base_url = \"{}\"

# Time zone for timestamps without an offset:
# timezone = \"{}\"

# Where exported files are written:
# output_dir = \".\"

# Seconds before a request to the API is abandoned:
# request_timeout_secs = {}

# Keep the last schedule when a new fetch fails:
# keep_results_on_error = true
",
            DEFAULT_API_BASE_URL, DEFAULT_TIMEZONE, DEFAULT_REQUEST_TIMEOUT_SECS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ScheduleError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ScheduleError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

/// A successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>, username: Option<String>) -> Self {
        Session {
            token: token.into(),
            username: username.filter(|u| !u.trim().is_empty()),
        }
    }

    pub fn path() -> ScheduleResult<PathBuf> {
        Ok(config_dir()?.join("session.toml"))
    }

    pub fn load() -> ScheduleResult<Option<Self>> {
        Self::load_from(&Self::path()?)
    }

    /// `None` when nobody is logged in.
    pub fn load_from(path: &Path) -> ScheduleResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)?;
        let session: Session = toml::from_str(&contents)?;

        if session.token.is_empty() {
            return Ok(None);
        }
        Ok(Some(session))
    }

    pub fn save(&self) -> ScheduleResult<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> ScheduleResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Remove the stored session. Returns whether one existed.
    pub fn clear() -> ScheduleResult<bool> {
        Self::clear_at(&Self::path()?)
    }

    pub fn clear_at(path: &Path) -> ScheduleResult<bool> {
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(path)?;
        Ok(true)
    }

    /// Name to greet the user with.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(DEFAULT_DISPLAY_NAME)
    }
}
