//! Application-level configuration loading: club identity, schedule offset,
//! expiry timing, session lifetime and the identity gateway key.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use time::UtcOffset;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PADEL_ROSTER_CONFIG_PATH";

const DEFAULT_CLUB_NAME: &str = "Padel Group";
const DEFAULT_CLEANUP_GRACE_SECS: u64 = 300;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Club name printed in shared line-ups.
    pub club_name: String,
    /// Offset used to interpret match dates and times.
    pub utc_offset: UtcOffset,
    /// Delay after a match starts before the sweeper deletes it.
    pub cleanup_grace: Duration,
    /// Period of the sweeper's safety tick.
    pub sweep_interval: Duration,
    /// Shared secret the identity gateway must present, when set.
    pub identity_gateway_key: Option<String>,
    /// Accept session hand-overs without a gateway key. Local development only.
    pub allow_open_sessions: bool,
    /// Lifetime of a bearer token.
    pub session_ttl: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        club = %app_config.club_name,
                        offset = %app_config.utc_offset,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a configuration document; absent keys take their defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    club_name: String,
    utc_offset_minutes: i32,
    cleanup_grace_secs: u64,
    sweep_interval_secs: u64,
    identity_gateway_key: Option<String>,
    allow_open_sessions: bool,
    session_ttl_secs: u64,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            club_name: DEFAULT_CLUB_NAME.to_string(),
            utc_offset_minutes: 0,
            cleanup_grace_secs: DEFAULT_CLEANUP_GRACE_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            identity_gateway_key: None,
            allow_open_sessions: false,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let utc_offset = value
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(|seconds| UtcOffset::from_whole_seconds(seconds).ok())
            .unwrap_or_else(|| {
                warn!(
                    minutes = value.utc_offset_minutes,
                    "utc offset out of range; using UTC"
                );
                UtcOffset::UTC
            });

        Self {
            club_name: value.club_name,
            utc_offset,
            cleanup_grace: Duration::from_secs(value.cleanup_grace_secs),
            sweep_interval: Duration::from_secs(value.sweep_interval_secs.max(1)),
            identity_gateway_key: value.identity_gateway_key.filter(|key| !key.is_empty()),
            allow_open_sessions: value.allow_open_sessions,
            session_ttl: Duration::from_secs(value.session_ttl_secs.max(1)),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
