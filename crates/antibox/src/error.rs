//! CLI error types with miette diagnostics.
//!
//! Every handled failure exits with status 2, the same code clap uses for
//! usage errors.

use miette::Diagnostic;
use thiserror::Error;

use antibox_config::ConfigError;
use antibox_core::CoreError;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 2;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("MAIN => No targets found. Did you specify a target?")]
    #[diagnostic(
        code(antibox::missing_target),
        help(
            "Pass -h <HOSTNAME> or -m <MAC_ADDRESS> together with -r <RULE_NAME>,\n\
             or a batch list with -a 'host|mac|rule,...'."
        )
    )]
    MissingTarget {
        #[source]
        source: CoreError,
    },

    #[error("Failed to load config file {path}")]
    #[diagnostic(
        code(antibox::config),
        help("Fix the file or point --config / ANTIBOX_CONFIG at another one.")
    )]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },

    #[error("invalid {field}: {reason}")]
    #[diagnostic(code(antibox::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(antibox::setup))]
    Setup(#[from] CoreError),

    #[error("{failed} of {total} rule update(s) failed")]
    #[diagnostic(code(antibox::update_failed))]
    UpdateFailed { failed: usize, total: usize },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        exit_code::FAILURE
    }

    /// Per-rule failures are logged as they happen; nothing is left to report.
    pub fn already_reported(&self) -> bool {
        matches!(self, Self::UpdateFailed { .. })
    }
}
