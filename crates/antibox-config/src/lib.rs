//! Optional configuration file and credential resolution for antibox.
//!
//! Everything here can also be given as flags or environment variables;
//! the file only fills in what those leave unset. Credentials are never
//! taken from flags: they come from `ALTIBOX_USER` / `ALTIBOX_PASS`, the
//! system keyring, or (last) plaintext in the file.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use antibox_core::{Credentials, Entry};

/// Keyring service name. Passwords are stored under `<username>/password`.
pub const KEYRING_SERVICE: &str = "antibox";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Altibox account username.
    pub username: Option<String>,

    /// Altibox account password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Location whose gateway is managed.
    pub site_id: Option<String>,

    /// API root override.
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// `ERROR`, `INFO` or `DEBUG`.
    pub verbosity: Option<String>,

    /// Directory that receives `antibox.log`.
    pub logpath: Option<PathBuf>,

    /// Device/rule pairs reconciled when no target is given otherwise.
    #[serde(default)]
    pub entries: Vec<Entry>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("no", "antibox", "antibox").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("antibox");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from `path` (missing file is fine) plus the
/// `ALTIBOX_USER` / `ALTIBOX_PASS` environment variables.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(credential_env());

    let config: Config = figment.extract()?;

    if let Some(ref url) = config.base_url {
        if url.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "base_url".into(),
                reason: "must not be empty".into(),
            });
        }
    }

    Ok(config)
}

/// `ALTIBOX_USER` → `username`, `ALTIBOX_PASS` → `password`.
fn credential_env() -> Env {
    Env::prefixed("ALTIBOX_")
        .only(&["user", "pass"])
        .map(|key| match key.as_str().to_ascii_lowercase().as_str() {
            "user" => "username".into(),
            "pass" => "password".into(),
            other => other.to_owned().into(),
        })
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve account credentials.
///
/// The username comes from the environment or the file. The password is
/// looked up in order: environment, system keyring, plaintext in the file.
/// Returns `None` when either half is missing.
pub fn resolve_credentials(config: &Config) -> Option<Credentials> {
    let username = config.username.clone().filter(|u| !u.is_empty())?;

    // `load_config` already folded ALTIBOX_PASS over the file value, so a
    // password here came from the environment or plaintext in the file.
    // The keyring sits between the two.
    let from_env = std::env::var("ALTIBOX_PASS").ok().filter(|p| !p.is_empty());
    let password = from_env
        .or_else(|| keyring_password(&username))
        .or_else(|| config.password.clone().filter(|p| !p.is_empty()))?;

    Some(Credentials {
        username,
        password: SecretString::from(password),
    })
}

fn keyring_password(username: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{username}/password"))
        .ok()?
        .get_password()
        .ok()
}
