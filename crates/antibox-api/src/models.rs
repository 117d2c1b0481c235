// Vendor API response types
//
// Most endpoints wrap their payload as `{ status, message, data }`. The LAN
// device listing is the exception and returns `{ networkClients: [...] }`
// bare. Only the fields the tool reads are modelled; everything else lands
// in `extra` so nothing is lost when a value is echoed back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::Endpoint;
use crate::error::Error;

// ── Response Envelope ────────────────────────────────────────────────

/// Standard vendor response envelope.
///
/// ```json
/// { "status": "success", "message": "optional", "data": { ... } }
/// ```
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: Option<String>,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }

    /// Unwrap `data`, failing on a non-`success` status or a missing payload.
    pub fn into_data(self, endpoint: Endpoint) -> Result<T, Error> {
        if !self.is_success() {
            return Err(Error::Rejected {
                endpoint,
                message: self.message.unwrap_or_default(),
            });
        }
        self.data.ok_or(Error::EmptyResponse { endpoint })
    }
}

// ── Authentication ───────────────────────────────────────────────────

/// `data` payload of a successful authentication.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    #[serde(default)]
    pub session_ticket: Option<SessionTicket>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Deserialize)]
pub struct SessionTicket {
    #[serde(default)]
    pub identifier: Option<String>,
}

/// The authenticated account holder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Catch-all for the rest of the identity object.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// "First Last", skipping whichever half is missing.
    pub fn display_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ── LAN devices ──────────────────────────────────────────────────────

/// Body of `wifi/getlandevices`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanDevices {
    #[serde(default)]
    pub network_clients: Vec<NetworkClient>,
}

/// A client known to the home gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkClient {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
