// Gateway configuration endpoints
//
// The whole gateway configuration (wifi radios, port forwards, ...) is one
// vendor document keyed by location. It is read with
// `GET wifi/getwifibylocation` and written back in full with
// `POST wifi/updatewififorlocation` as a form field `data=<json>`.

use reqwest::Method;
use reqwest::header::{ACCEPT, ORIGIN};
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{AltiboxClient, Endpoint, PORTAL_ORIGIN};
use crate::error::Error;
use crate::models::Envelope;
use crate::session::Session;

impl AltiboxClient {
    /// Fetch the gateway configuration of the managed site.
    pub async fn get_config(&self, session: &Session) -> Result<Value, Error> {
        let endpoint = Endpoint::GetConfig;
        let url = self.site_url(endpoint, &[])?;

        let request = session.apply(self.portal_request(Method::GET, url))?;
        let resp = request.send().await?;

        let envelope: Envelope<Map<String, Value>> = self.decode(endpoint, resp).await?;
        first_location(endpoint, envelope.into_data(endpoint)?)
    }

    /// Submit a prepared configuration document.
    ///
    /// Returns the configuration as stored by the gateway, which is what
    /// callers should verify against.
    pub async fn update_config(&self, session: &Session, config: &Value) -> Result<Value, Error> {
        let endpoint = Endpoint::UpdateConfig;
        let url = self.endpoint_url(endpoint)?;
        let payload = serde_json::to_string(config)?;

        let request = session
            .apply(self.portal_request(Method::POST, url))?
            .header(ACCEPT, "application/json, text/javascript, */*; q=0.01")
            .header(ORIGIN, PORTAL_ORIGIN)
            .form(&[("data", payload.as_str())]);
        let resp = request.send().await?;

        let envelope: Envelope<Map<String, Value>> = self.decode(endpoint, resp).await?;
        if envelope.is_success() {
            debug!(
                "{endpoint} => Response from API: {}",
                envelope.message.as_deref().unwrap_or_default()
            );
        }
        first_location(endpoint, envelope.into_data(endpoint)?)
    }
}

/// `data` is keyed by location; an account manages exactly one.
fn first_location(endpoint: Endpoint, data: Map<String, Value>) -> Result<Value, Error> {
    data.into_iter()
        .next()
        .map(|(_, config)| config)
        .ok_or(Error::EmptyResponse { endpoint })
}
