// Vendor session context
//
// Replaces the process-wide cookie/header maps of a browser session with
// an explicit value: created once by `authenticate`, then borrowed by
// every later call of the same run.

use reqwest::RequestBuilder;
use reqwest::header::COOKIE;
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;
use crate::models::User;

/// An authenticated session: the vendor's session ticket plus the identity
/// object it was issued for.
#[derive(Debug, Clone)]
pub struct Session {
    ticket: SecretString,
    user: User,
}

impl Session {
    pub fn new(ticket: SecretString, user: User) -> Self {
        Self { ticket, user }
    }

    pub fn ticket(&self) -> &SecretString {
        &self.ticket
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Fail with [`Error::MissingSession`] if no usable ticket is held.
    pub fn ensure(&self) -> Result<(), Error> {
        if self.ticket.expose_secret().is_empty() {
            return Err(Error::MissingSession);
        }
        Ok(())
    }

    /// `Cookie` header value: `sessionTicketApi=<ticket>; user=<urlencoded json>`.
    pub fn cookie_header(&self) -> Result<String, Error> {
        let user_json = serde_json::to_string(&self.user)?;
        let user: String = url::form_urlencoded::byte_serialize(user_json.as_bytes()).collect();
        Ok(format!(
            "sessionTicketApi={}; user={user}",
            self.ticket.expose_secret()
        ))
    }

    /// Attach the session cookie and `SessionTicket` header to a request.
    pub(crate) fn apply(&self, builder: RequestBuilder) -> Result<RequestBuilder, Error> {
        self.ensure()?;
        Ok(builder
            .header(COOKIE, self.cookie_header()?)
            .header("SessionTicket", self.ticket.expose_secret()))
    }
}
