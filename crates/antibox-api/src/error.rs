use thiserror::Error;

use crate::client::Endpoint;

/// Top-level error type for the `antibox-api` crate.
///
/// Covers every failure mode of the four vendor endpoints.
/// `antibox-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The vendor rejected the username/password pair.
    #[error("AUTH => Altibox: {message}.")]
    Authentication { message: String },

    /// No session ticket was issued, or an empty one was passed in.
    #[error("WEB => Missing SessionTicket in cookie.")]
    MissingSession,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-2xx response. The body is kept for logging.
    #[error("{endpoint} => Status code is not 200 (HTTP {status})")]
    HttpStatus {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },

    // ── Vendor envelope ─────────────────────────────────────────────
    /// `{"status": "...", "message": "..."}` with a status other than `success`.
    #[error("{endpoint} => Altibox: {message}.")]
    Rejected { endpoint: Endpoint, message: String },

    /// The endpoint answered 200 with nothing in it.
    #[error("{endpoint} => No data received from the API.")]
    EmptyResponse { endpoint: Endpoint },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The outgoing configuration could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
