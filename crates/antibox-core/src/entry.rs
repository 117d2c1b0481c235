// ── Reconciliation targets ──
//
// An entry pairs a device selector with a rule name. Single-target runs
// build one entry from flags; batch runs parse a list of them.

use std::fmt;

use antibox_api::NetworkClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::CoreError;

/// How to pick a device out of the gateway's client list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    Hostname(String),
    Mac(String),
}

impl DeviceSelector {
    /// Vendor field name the selector matches on.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Hostname(_) => "hostname",
            Self::Mac(_) => "macAddress",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Hostname(v) | Self::Mac(v) => v,
        }
    }

    /// Exact, case-sensitive match.
    pub fn matches(&self, client: &NetworkClient) -> bool {
        let field = match self {
            Self::Hostname(_) => client.hostname.as_deref(),
            Self::Mac(_) => client.mac_address.as_deref(),
        };
        field == Some(self.value())
    }
}

impl fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key(), self.value())
    }
}

/// One device/rule pair to reconcile. Empty fields are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl Entry {
    pub fn new(hostname: Option<&str>, mac: Option<&str>, rule: Option<&str>) -> Self {
        let field = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_owned);
        Self {
            hostname: field(hostname),
            mac: field(mac),
            rule: field(rule),
        }
    }

    /// Hostname wins when both a hostname and a MAC are present.
    pub fn selector(&self) -> Option<DeviceSelector> {
        self.hostname
            .clone()
            .map(DeviceSelector::Hostname)
            .or_else(|| self.mac.clone().map(DeviceSelector::Mac))
    }

    /// Selector and rule, or the list of what is missing.
    pub fn target(&self) -> Result<(DeviceSelector, &str), CoreError> {
        match (self.selector(), self.rule.as_deref()) {
            (Some(selector), Some(rule)) => Ok((selector, rule)),
            (selector, rule) => {
                let mut missing = Vec::new();
                if selector.is_none() {
                    missing.push("hostname or mac");
                }
                if rule.is_none() {
                    missing.push("rule");
                }
                Err(CoreError::MissingTarget {
                    missing: missing.join(", "),
                })
            }
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}",
            self.hostname.as_deref().unwrap_or_default(),
            self.mac.as_deref().unwrap_or_default(),
            self.rule.as_deref().unwrap_or_default(),
        )
    }
}

/// Parse `hostname|mac|rule` triples separated by commas.
///
/// Triples without exactly three `|`-separated fields are logged and
/// skipped. An empty input yields no entries.
pub fn parse_entries(list: &str) -> Vec<Entry> {
    if list.is_empty() {
        return Vec::new();
    }

    let raw: Vec<&str> = list.split(',').collect();
    debug!("MULTI => Found {} entries.", raw.len());

    raw.into_iter()
        .filter_map(|item| {
            let fields: Vec<&str> = item.split('|').collect();
            if let [hostname, mac, rule] = fields.as_slice() {
                Some(Entry::new(Some(*hostname), Some(*mac), Some(*rule)))
            } else {
                error!("MULTI => Entry {fields:?} does not follow the required format. Skipping.");
                None
            }
        })
        .collect()
}
