// Altibox web API HTTP client
//
// Wraps `reqwest::Client` with vendor URL construction, browser-mimicking
// request headers and response decoding. The endpoint modules (auth,
// devices, wifi) are implemented as inherent methods in separate files to
// keep this module focused on transport mechanics.

use std::fmt;

use reqwest::header::REFERER;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://www.altibox.no/api";

/// Referer sent with the credential exchange.
pub(crate) const LOGIN_REFERER: &str = "https://www.altibox.no/login/";

/// Referer sent with every call made from the gateway settings page.
pub(crate) const PORTAL_REFERER: &str =
    "https://www.altibox.no/mine-sider/internett/min-hjemmesentral/";

/// Origin sent with the configuration update.
pub(crate) const PORTAL_ORIGIN: &str = "https://www.altibox.no";

/// The four vendor endpoints the tool talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Authenticate,
    LanDevices,
    GetConfig,
    UpdateConfig,
}

impl Endpoint {
    /// Path relative to the API root.
    pub fn path(self) -> &'static str {
        match self {
            Self::Authenticate => "authentication/authenticate",
            Self::LanDevices => "wifi/getlandevices",
            Self::GetConfig => "wifi/getwifibylocation",
            Self::UpdateConfig => "wifi/updatewififorlocation",
        }
    }

    /// Short tag used as a log prefix.
    pub fn label(self) -> &'static str {
        match self {
            Self::Authenticate => "AUTH",
            Self::LanDevices => "GET_DEVICE",
            Self::GetConfig => "GET_CONFIG",
            Self::UpdateConfig => "SET_RULE",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// HTTP client for the vendor's web API.
///
/// One client per process; sessions are created by
/// [`authenticate`](Self::authenticate) and passed back in explicitly.
#[derive(Debug, Clone)]
pub struct AltiboxClient {
    http: reqwest::Client,
    base_url: Url,
    site_id: String,
}

impl AltiboxClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the API root (normally [`DEFAULT_BASE_URL`]); `site_id`
    /// selects the location whose gateway is managed.
    pub fn new(
        base_url: Url,
        site_id: impl Into<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self::with_client(transport.build_client()?, base_url, site_id))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, site_id: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            site_id: site_id.into(),
        }
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The API root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The managed site (location) identifier.
    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/{endpoint path}`
    pub(crate) fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{}", endpoint.path()))?)
    }

    /// Site-scoped URL: `params`, then the `siteid` and cache-busting `_`
    /// parameters the web frontend appends to every XHR call.
    pub(crate) fn site_url(&self, endpoint: Endpoint, params: &[(&str, &str)]) -> Result<Url, Error> {
        let mut url = self.endpoint_url(endpoint)?;
        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("siteid", &self.site_id)
            .append_pair("_", &chrono::Utc::now().timestamp_millis().to_string());
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Start an XHR-style request as issued from the gateway settings page.
    pub(crate) fn portal_request(
        &self,
        method: reqwest::Method,
        url: Url,
    ) -> reqwest::RequestBuilder {
        debug!("{method} {}", url.path());
        self.http
            .request(method, url)
            .header(REFERER, PORTAL_REFERER)
            .header("X-Requested-With", "XMLHttpRequest")
    }

    /// Check the status and decode the JSON body.
    ///
    /// Non-2xx responses are logged with their body and returned as
    /// [`Error::HttpStatus`]. An empty, `null`, `{}` or `[]` body is
    /// [`Error::EmptyResponse`].
    pub(crate) async fn decode<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("{endpoint} => Status code is not 200:");
            error!("  Status    => {}", status.as_u16());
            error!("  Response  => {body}");
            return Err(Error::HttpStatus {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        trace!(%endpoint, bytes = body.len(), "response received");

        let value: Value = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).map_err(|e| deserialization(&e, &body))?
        };

        let empty = match &value {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        };
        if empty {
            return Err(Error::EmptyResponse { endpoint });
        }

        serde_json::from_value(value).map_err(|e| deserialization(&e, &body))
    }
}

fn deserialization(err: &serde_json::Error, body: &str) -> Error {
    let preview: String = body.chars().take(200).collect();
    Error::Deserialization {
        message: format!("{err} (body preview: {preview:?})"),
        body: body.to_owned(),
    }
}
