// LAN device listing
//
// `GET wifi/getlandevices` returns every client the gateway has seen,
// inactive ones included, as a bare `{ "networkClients": [...] }` object.

use reqwest::Method;
use tracing::debug;

use crate::client::{AltiboxClient, Endpoint};
use crate::error::Error;
use crate::models::{LanDevices, NetworkClient};
use crate::session::Session;

impl AltiboxClient {
    /// List all known network clients, active or not.
    pub async fn list_devices(&self, session: &Session) -> Result<Vec<NetworkClient>, Error> {
        let endpoint = Endpoint::LanDevices;
        let url = self.site_url(endpoint, &[("activeOnly", "false")])?;

        let request = session.apply(self.portal_request(Method::GET, url))?;
        let resp = request.send().await?;

        let devices: LanDevices = self.decode(endpoint, resp).await?;
        debug!(count = devices.network_clients.len(), "listed network clients");
        Ok(devices.network_clients)
    }
}
