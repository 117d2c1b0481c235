//! Settings resolution: flags and their env fallbacks first, then the
//! config file, then built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{error, info};
use url::Url;

use antibox_api::DEFAULT_BASE_URL;
use antibox_config::Config;
use antibox_core::{Entry, ReconcileConfig, parse_entries};

use crate::cli::Cli;
use crate::error::CliError;
use crate::logging::Verbosity;

/// Location managed when neither a flag nor the file names one.
pub const DEFAULT_SITE_ID: &str = "2373251";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Load `--config` (or the platform default). A missing file is not an error.
pub fn load_file(cli: &Cli) -> Result<Config, CliError> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(antibox_config::config_path);
    antibox_config::load_config(&path).map_err(|source| CliError::Config {
        path: path.display().to_string(),
        source,
    })
}

// ── Logging ─────────────────────────────────────────────────────────

/// Verbosity and log directory, with any fallback taken on the way.
#[derive(Debug)]
pub struct LogSettings {
    pub verbosity: Verbosity,
    pub dir: PathBuf,
    rejected_verbosity: Option<String>,
    rejected_dir: Option<PathBuf>,
}

impl LogSettings {
    pub fn resolve(cli: &Cli, file: &Config) -> Self {
        let raw = non_empty(cli.verbosity.as_deref()).or(non_empty(file.verbosity.as_deref()));
        let (verbosity, rejected_verbosity) = match raw.map(|r| (r, r.parse::<Verbosity>())) {
            Some((_, Ok(v))) => (v, None),
            Some((r, Err(()))) => (Verbosity::default(), Some(r.to_owned())),
            None => (Verbosity::default(), None),
        };

        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let requested = cli
            .logpath
            .clone()
            .or_else(|| file.logpath.clone())
            .filter(|p| !p.as_os_str().is_empty());
        let (dir, rejected_dir) = match requested {
            Some(path) if path.is_dir() => (path, None),
            Some(path) => (cwd, Some(path)),
            None => (cwd, None),
        };

        Self {
            verbosity,
            dir,
            rejected_verbosity,
            rejected_dir,
        }
    }

    /// Log the fallbacks taken by [`resolve`](Self::resolve). Call once the
    /// subscriber is installed.
    pub fn report(&self) {
        if let Some(ref raw) = self.rejected_verbosity {
            info!("LOG => Unknown verbosity `{raw}`. Using {}.", self.verbosity);
        }
        if let Some(ref path) = self.rejected_dir {
            error!(
                "LOG => `{}` is not a directory. Writing the log to {}.",
                path.display(),
                self.dir.display()
            );
        }
    }
}

// ── Targets ─────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
pub enum Targets {
    Single(Entry),
    Batch(Vec<Entry>),
}

/// A non-empty `--all` list wins, then the file's `entries`, then the
/// single `-h`/`-m` + `-r` target.
pub fn resolve_targets(cli: &Cli, file: &Config) -> Result<Targets, CliError> {
    if let Some(list) = non_empty(cli.all.as_deref()) {
        let entries = parse_entries(list);
        if !entries.is_empty() {
            return Ok(Targets::Batch(entries));
        }
    }
    if !file.entries.is_empty() {
        return Ok(Targets::Batch(file.entries.clone()));
    }

    let entry = Entry::new(
        cli.hostname.as_deref(),
        cli.mac.as_deref(),
        cli.rule.as_deref(),
    );
    entry
        .target()
        .map_err(|source| CliError::MissingTarget { source })?;
    Ok(Targets::Single(entry))
}

// ── Connection ──────────────────────────────────────────────────────

pub fn reconcile_config(cli: &Cli, file: &Config) -> Result<ReconcileConfig, CliError> {
    let raw_url = non_empty(cli.base_url.as_deref())
        .or(file.base_url.as_deref())
        .unwrap_or(DEFAULT_BASE_URL);
    let base_url = Url::parse(raw_url).map_err(|e| CliError::Validation {
        field: "base_url".into(),
        reason: format!("`{raw_url}`: {e}"),
    })?;

    let site_id = non_empty(cli.site_id.as_deref())
        .or(non_empty(file.site_id.as_deref()))
        .unwrap_or(DEFAULT_SITE_ID)
        .to_owned();

    let timeout = cli
        .timeout
        .or(file.timeout)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout == 0 {
        return Err(CliError::Validation {
            field: "timeout".into(),
            reason: "must be at least one second".into(),
        });
    }

    Ok(ReconcileConfig {
        base_url,
        site_id,
        credentials: antibox_config::resolve_credentials(file),
        timeout: Duration::from_secs(timeout),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        crate::cli::parse_flags(std::iter::once("antibox").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn single_target_from_flags() {
        let targets = resolve_targets(&cli(&["-h", "myhost", "-r", "vpn_rule"]), &Config::default());
        assert_eq!(
            targets.unwrap(),
            Targets::Single(Entry::new(Some("myhost"), None, Some("vpn_rule")))
        );
    }

    #[test]
    fn batch_beats_single_target() {
        let targets = resolve_targets(
            &cli(&["-h", "myhost", "-r", "vpn_rule", "-a", "srv||rule1,|AA:BB:CC:DD:EE:FF|rule2"]),
            &Config::default(),
        );
        assert_eq!(
            targets.unwrap(),
            Targets::Batch(vec![
                Entry::new(Some("srv"), None, Some("rule1")),
                Entry::new(None, Some("AA:BB:CC:DD:EE:FF"), Some("rule2")),
            ])
        );
    }

    #[test]
    fn unusable_batch_falls_back_to_single_target() {
        let targets = resolve_targets(
            &cli(&["-m", "AA:BB:CC:DD:EE:FF", "-r", "vpn_rule", "-a", "garbage"]),
            &Config::default(),
        );
        assert!(matches!(targets.unwrap(), Targets::Single(_)));
    }

    #[test]
    fn file_entries_are_a_batch() {
        let file = Config {
            entries: vec![Entry::new(Some("nas"), None, Some("smb"))],
            ..Config::default()
        };
        let targets = resolve_targets(&cli(&[]), &file).unwrap();
        assert_eq!(targets, Targets::Batch(file.entries.clone()));
    }

    #[test]
    fn rule_alone_is_not_a_target() {
        let err = resolve_targets(&cli(&["-r", "vpn_rule"]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::MissingTarget { .. }), "got {err:?}");
    }

    #[test]
    fn unknown_verbosity_falls_back_to_info() {
        let settings = LogSettings::resolve(&cli(&["-v", "CHATTY"]), &Config::default());
        assert_eq!(settings.verbosity, Verbosity::Info);
        assert_eq!(settings.rejected_verbosity.as_deref(), Some("CHATTY"));
    }

    #[test]
    fn flag_verbosity_beats_file() {
        let file = Config {
            verbosity: Some("ERROR".into()),
            ..Config::default()
        };
        assert_eq!(LogSettings::resolve(&cli(&[]), &file).verbosity, Verbosity::Error);
        assert_eq!(
            LogSettings::resolve(&cli(&["-v", "DEBUG"]), &file).verbosity,
            Verbosity::Debug
        );
    }

    #[test]
    fn missing_log_dir_falls_back_to_cwd() {
        let settings = LogSettings::resolve(&cli(&["-l", "/definitely/not/here"]), &Config::default());
        assert_eq!(settings.dir, std::env::current_dir().unwrap());
        assert_eq!(
            settings.rejected_dir,
            Some(PathBuf::from("/definitely/not/here"))
        );
    }

    #[test]
    fn existing_log_dir_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LogSettings::resolve(
            &cli(&["-l", dir.path().to_str().unwrap()]),
            &Config::default(),
        );
        assert_eq!(settings.dir, dir.path());
        assert!(settings.rejected_dir.is_none());
    }

    #[test]
    fn connection_defaults() {
        let config = reconcile_config(&cli(&[]), &Config::default()).unwrap();
        assert_eq!(config.base_url.as_str(), "https://www.altibox.no/api");
        assert_eq!(config.site_id, DEFAULT_SITE_ID);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn flags_override_file_connection_settings() {
        let file = Config {
            site_id: Some("1".into()),
            timeout: Some(5),
            base_url: Some("http://file.invalid/api".into()),
            ..Config::default()
        };
        let config = reconcile_config(
            &cli(&["--site-id", "2", "--base-url", "http://127.0.0.1:9/api"]),
            &file,
        )
        .unwrap();
        assert_eq!(config.site_id, "2");
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:9/api");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let err = reconcile_config(&cli(&["--base-url", "not a url"]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "base_url"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = reconcile_config(&cli(&["--timeout", "0"]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "timeout"));
    }
}
