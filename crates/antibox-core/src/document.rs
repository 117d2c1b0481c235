// ── Gateway configuration document ──
//
// The vendor owns this schema. Only `router.routes` and `wifis` are ever
// read or written; every other field is carried through untouched, in its
// original key order.

use std::fmt;
use std::net::Ipv4Addr;

use serde_json::{Map, Value};

use crate::error::CoreError;

/// The gateway configuration as fetched from the API.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterConfig(Value);

impl RouterConfig {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    fn routes(&self) -> Result<&Map<String, Value>, CoreError> {
        self.0
            .get("router")
            .and_then(|router| router.get("routes"))
            .and_then(Value::as_object)
            .ok_or_else(|| CoreError::MalformedConfig {
                message: "`router.routes` is missing or not an object".into(),
            })
    }

    /// First route whose `name` equals `name` exactly.
    pub fn find_rule(&self, name: &str) -> Result<Rule<'_>, CoreError> {
        self.routes()?
            .iter()
            .find_map(|(key, route)| {
                let fields = route.as_object()?;
                (fields.get("name").and_then(Value::as_str) == Some(name))
                    .then_some(Rule {
                        key: key.as_str(),
                        fields,
                    })
            })
            .ok_or_else(|| CoreError::RuleNotFound { rule: name.into() })
    }

    /// The last octet currently bound to the rule, as the vendor renders it.
    pub fn rule_ip(&self, name: &str) -> Result<String, CoreError> {
        Ok(self.find_rule(name)?.int_ip())
    }

    /// Bind the rule to a new last octet. No other field is touched.
    pub fn set_rule_ip(&mut self, name: &str, octet: &str) -> Result<(), CoreError> {
        let key = self.find_rule(name)?.key().to_owned();
        let route = self
            .0
            .pointer_mut(&format!("/router/routes/{}", escape_pointer(&key)))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| CoreError::RuleNotFound { rule: name.into() })?;
        route.insert("int_ip".into(), Value::String(octet.into()));
        Ok(())
    }

    /// The document as the vendor's update form expects it.
    ///
    /// - `wifiBand2IsSet` / `wifiBand5IsSet` forced to `true`
    /// - every route field except `id` coerced to a string
    /// - every wifi entry gets `currentChannelIsOver48 = false` and
    ///   `hasMultipleWifi = true`
    pub fn to_payload(&self) -> Value {
        let mut payload = self.0.clone();
        let Some(root) = payload.as_object_mut() else {
            return payload;
        };

        root.insert("wifiBand2IsSet".into(), Value::Bool(true));
        root.insert("wifiBand5IsSet".into(), Value::Bool(true));

        if let Some(routes) = root
            .get_mut("router")
            .and_then(|router| router.get_mut("routes"))
            .and_then(Value::as_object_mut)
        {
            for route in routes.values_mut().filter_map(Value::as_object_mut) {
                for (field, value) in route.iter_mut() {
                    if field != "id" && !value.is_string() {
                        *value = Value::String(scalar_string(value));
                    }
                }
            }
        }

        if let Some(wifis) = root.get_mut("wifis").and_then(Value::as_object_mut) {
            for wifi in wifis.values_mut().filter_map(Value::as_object_mut) {
                wifi.insert("currentChannelIsOver48".into(), Value::Bool(false));
                wifi.insert("hasMultipleWifi".into(), Value::Bool(true));
            }
        }

        payload
    }
}

/// A borrowed port-forwarding rule inside a [`RouterConfig`].
#[derive(Debug, Clone, Copy)]
pub struct Rule<'a> {
    key: &'a str,
    fields: &'a Map<String, Value>,
}

impl<'a> Rule<'a> {
    /// Key of the rule inside `router.routes`.
    pub fn key(&self) -> &'a str {
        self.key
    }

    pub fn fields(&self) -> &'a Map<String, Value> {
        self.fields
    }

    fn field(&self, name: &str) -> String {
        self.fields.get(name).map(scalar_string).unwrap_or_default()
    }

    /// Bound last octet. Numbers and strings compare alike.
    pub fn int_ip(&self) -> String {
        self.field("int_ip")
    }
}

/// `tcp://8080-8080 => X.X.X.10:80-80`
impl fmt::Display for Rule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}-{} => X.X.X.{}:{}-{}",
            self.field("type"),
            self.field("ext_from"),
            self.field("ext_to"),
            self.field("int_ip"),
            self.field("int_from"),
            self.field("int_to"),
        )
    }
}

/// Last octet of a dotted-quad address.
pub fn last_octet(address: &str) -> Result<String, CoreError> {
    let ip: Ipv4Addr = address
        .trim()
        .parse()
        .map_err(|_| CoreError::InvalidAddress {
            address: address.into(),
        })?;
    let [_, _, _, last] = ip.octets();
    Ok(last.to_string())
}

/// Render a JSON value the way a web form would submit it.
fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// RFC 6901 escaping for a single JSON pointer segment.
fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
