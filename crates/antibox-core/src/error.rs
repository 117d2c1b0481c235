// ── Core error types ──
//
// Domain errors for a reconciliation run. The `From<antibox_api::Error>`
// impl folds transport-layer failures into the same enum so the batch
// driver only ever logs one kind of error.

use antibox_api::Endpoint;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("AUTH => No credentials found. Exiting.")]
    MissingCredentials,

    #[error("Missing attribute(s) `{missing}`")]
    MissingTarget { missing: String },

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("GET_DEVICE => No device found by filter `{key}={value}`.")]
    DeviceNotFound { key: &'static str, value: String },

    #[error("GET_DEVICE => Device has no usable IPv4 address (`{address}`).")]
    InvalidAddress { address: String },

    #[error("GET_RULE => No rule found by filter `name={rule}`.")]
    RuleNotFound { rule: String },

    #[error("GET_CONFIG => Unexpected configuration layout: {message}")]
    MalformedConfig { message: String },

    // ── Consistency ──────────────────────────────────────────────────
    #[error("SET_RULE => The firewall rule IP was not updated properly.")]
    VerificationFailed {
        rule: String,
        expected: String,
        actual: String,
    },

    // ── API errors (wrapped) ─────────────────────────────────────────
    #[error("AUTH => Altibox: {message}.")]
    AuthenticationFailed { message: String },

    #[error("WEB => Missing SessionTicket in cookie.")]
    MissingSession,

    #[error("{endpoint} => Request failed with HTTP {status}.")]
    Http { endpoint: Endpoint, status: u16 },

    #[error("{endpoint} => Altibox: {message}.")]
    Rejected { endpoint: Endpoint, message: String },

    #[error("{endpoint} => No data received from the API.")]
    NoData { endpoint: Endpoint },

    #[error("WEB => {message}")]
    Transport { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<antibox_api::Error> for CoreError {
    fn from(err: antibox_api::Error) -> Self {
        match err {
            antibox_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            antibox_api::Error::MissingSession => CoreError::MissingSession,
            antibox_api::Error::HttpStatus {
                endpoint, status, ..
            } => CoreError::Http { endpoint, status },
            antibox_api::Error::Rejected { endpoint, message } => {
                CoreError::Rejected { endpoint, message }
            }
            antibox_api::Error::EmptyResponse { endpoint } => CoreError::NoData { endpoint },
            antibox_api::Error::Transport(e) => CoreError::Transport {
                message: e.to_string(),
            },
            antibox_api::Error::InvalidUrl(e) => CoreError::Transport {
                message: format!("Invalid URL: {e}"),
            },
            antibox_api::Error::Deserialization { message, body: _ } => CoreError::Transport {
                message: format!("Deserialization error: {message}"),
            },
            antibox_api::Error::Serialization(e) => CoreError::Transport {
                message: format!("Serialization error: {e}"),
            },
        }
    }
}
