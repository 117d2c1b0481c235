// ── Reconciliation ──
//
// One run per entry: authenticate, resolve the device, fetch the gateway
// configuration, compare the rule's bound octet with the device's, and
// patch + verify when they differ. Every run gets its own session.

use antibox_api::{AltiboxClient, NetworkClient, Session, TransportConfig};
use tracing::{debug, error, info};

use crate::STATUS_TARGET;
use crate::config::{Credentials, ReconcileConfig};
use crate::document::{RouterConfig, last_octet};
use crate::entry::{DeviceSelector, Entry};
use crate::error::CoreError;

/// Result of a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The rule already pointed at the device; nothing was written.
    Unchanged { octet: String },
    /// The rule was rebound and the stored configuration confirms it.
    Updated { from: String, to: String },
}

/// Per-entry results of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<(Entry, Result<Outcome, CoreError>)>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn failures(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_err()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }
}

/// Drives reconciliation runs against one API client.
#[derive(Debug, Clone)]
pub struct Reconciler {
    client: AltiboxClient,
    credentials: Option<Credentials>,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let client = AltiboxClient::new(config.base_url, config.site_id, &transport)?;
        Ok(Self::with_client(client, config.credentials))
    }

    pub fn with_client(client: AltiboxClient, credentials: Option<Credentials>) -> Self {
        Self {
            client,
            credentials,
        }
    }

    pub fn client(&self) -> &AltiboxClient {
        &self.client
    }

    // ── Steps ────────────────────────────────────────────────────────

    /// Open a fresh session with the configured credentials.
    pub async fn authenticate(&self) -> Result<Session, CoreError> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(CoreError::MissingCredentials)?;
        Ok(self
            .client
            .authenticate(&creds.username, &creds.password)
            .await?)
    }

    /// First client matching the selector.
    pub async fn resolve_device(
        &self,
        session: &Session,
        selector: &DeviceSelector,
    ) -> Result<NetworkClient, CoreError> {
        let clients = self.client.list_devices(session).await?;
        let device = clients
            .into_iter()
            .find(|c| selector.matches(c))
            .ok_or_else(|| CoreError::DeviceNotFound {
                key: selector.key(),
                value: selector.value().to_owned(),
            })?;

        debug!("GET_DEVICE => Found client (src={selector}).");
        debug!("  {device:?}");
        Ok(device)
    }

    pub async fn fetch_config(&self, session: &Session) -> Result<RouterConfig, CoreError> {
        Ok(RouterConfig::new(self.client.get_config(session).await?))
    }

    /// Bind `rule` to `octet` in `config` and submit it.
    ///
    /// Returns the configuration as stored by the gateway.
    pub async fn patch_rule(
        &self,
        session: &Session,
        config: &mut RouterConfig,
        rule: &str,
        octet: &str,
    ) -> Result<RouterConfig, CoreError> {
        {
            let current = config.find_rule(rule)?;
            debug!("SET_RULE => Found rule (src=name:{rule}).");
            debug!("  {current}");
        }
        config.set_rule_ip(rule, octet)?;

        let stored = self
            .client
            .update_config(session, &config.to_payload())
            .await?;
        Ok(RouterConfig::new(stored))
    }

    // ── Runs ─────────────────────────────────────────────────────────

    /// Reconcile one entry.
    pub async fn reconcile(&self, entry: &Entry) -> Result<Outcome, CoreError> {
        let (selector, rule) = entry.target()?;

        let session = self.authenticate().await?;
        let device = self.resolve_device(&session, &selector).await?;
        let address = device.ip_address.as_deref().unwrap_or_default();
        let device_octet = last_octet(address)?;

        let mut config = self.fetch_config(&session).await?;
        let current = {
            let found = config.find_rule(rule)?;
            debug!("GET_RULE => Found rule (src=name:{rule}).");
            debug!("  {found}");
            found.int_ip()
        };

        if current == device_octet {
            debug!("SET_RULE => Firewall rule IP already up to date.");
            return Ok(Outcome::Unchanged {
                octet: device_octet,
            });
        }

        debug!("Device IP ({device_octet}) does not match rule IP ({current}). Updating..");
        let stored = self
            .patch_rule(&session, &mut config, rule, &device_octet)
            .await?;

        let applied = stored.rule_ip(rule)?;
        if applied != device_octet {
            return Err(CoreError::VerificationFailed {
                rule: rule.to_owned(),
                expected: device_octet,
                actual: applied,
            });
        }

        debug!("RULE => Firewall rule `{rule}` was updated successfully.");
        Ok(Outcome::Updated {
            from: current,
            to: device_octet,
        })
    }

    /// Reconcile one entry, logging the outcome instead of propagating it.
    pub async fn run(&self, entry: &Entry) -> Result<Outcome, CoreError> {
        let rule = entry.rule.as_deref().unwrap_or_default();
        debug!("MAIN => Running update for {rule}.");

        let result = self.reconcile(entry).await;
        match &result {
            Ok(_) => info!(target: STATUS_TARGET, "OK {rule}"),
            Err(e) => error!("{e}"),
        }
        result
    }

    /// Reconcile every entry in order. A failure never stops the batch.
    pub async fn run_all(&self, entries: &[Entry]) -> BatchReport {
        debug!("MAIN => Updating rules for {} entries.", entries.len());

        let mut report = BatchReport::default();
        for entry in entries {
            let result = self.run(entry).await;
            report.results.push((entry.clone(), result));
        }

        debug!("MAIN => Finished updating {} entries.", entries.len());
        report
    }
}
