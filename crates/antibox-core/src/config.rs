// ── Runtime connection configuration ──
//
// Describes *how* to reach the vendor API. Carries credential data and
// connection tuning but never touches disk; the binary builds one and
// hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Account credentials for the vendor's web login.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Everything a [`Reconciler`](crate::Reconciler) needs to talk to the API.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    pub base_url: Url,
    pub site_id: String,
    /// `None` makes every run fail with a missing-credentials error
    /// before any request is sent.
    pub credentials: Option<Credentials>,
    pub timeout: Duration,
}
