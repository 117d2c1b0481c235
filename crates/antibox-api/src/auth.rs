// Credential exchange
//
// `GET authentication/authenticate?method=BY_USERNAME` with HTTP basic
// auth. The only call that does not carry a session.

use reqwest::header::REFERER;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::{AltiboxClient, Endpoint, LOGIN_REFERER};
use crate::error::Error;
use crate::models::{AuthData, Envelope};
use crate::session::Session;

impl AltiboxClient {
    /// Exchange a username/password for a [`Session`].
    ///
    /// A non-2xx answer is logged with its body and returned as
    /// [`Error::HttpStatus`]; a `200` whose envelope status is not
    /// `success` becomes [`Error::Authentication`] with the vendor's message.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Session, Error> {
        let endpoint = Endpoint::Authenticate;
        let mut url = self.endpoint_url(endpoint)?;
        url.query_pairs_mut().append_pair("method", "BY_USERNAME");

        debug!("authenticating at {}", url.path());

        let resp = self
            .http()
            .get(url)
            .header(REFERER, LOGIN_REFERER)
            .basic_auth(username, Some(password.expose_secret()))
            .send()
            .await?;

        let envelope: Envelope<AuthData> = self.decode(endpoint, resp).await?;
        let data = envelope.into_data(endpoint).map_err(|e| match e {
            Error::Rejected { message, .. } => Error::Authentication { message },
            other => other,
        })?;

        let ticket = data
            .session_ticket
            .and_then(|t| t.identifier)
            .filter(|id| !id.is_empty())
            .ok_or(Error::MissingSession)?;
        let user = data.user.unwrap_or_default();

        debug!("{endpoint} => Authentication successful.");
        debug!("  Authenticated as {}.", user.display_name());

        Ok(Session::new(SecretString::from(ticket), user))
    }
}
