//! Reconciliation logic between `antibox-api` and the `antibox` binary.
//!
//! - **[`RouterConfig`]**: loosely typed view over the vendor's gateway
//!   configuration document. Finds rules by name, rewrites a rule's bound
//!   octet and prepares the payload the vendor's form validation expects.
//!
//! - **[`Entry`]**: one (hostname-or-MAC, rule) pair, parsed from the
//!   `host|mac|rule,...` batch syntax by [`parse_entries`].
//!
//! - **[`Reconciler`]**: runs authenticate → resolve device → fetch config
//!   → compare → patch → verify for one entry, and drives a batch of them
//!   without letting one failure halt the rest.

pub mod config;
pub mod document;
pub mod entry;
pub mod error;
pub mod reconcile;

pub use config::{Credentials, ReconcileConfig};
pub use document::{Rule, RouterConfig, last_octet};
pub use entry::{DeviceSelector, Entry, parse_entries};
pub use error::CoreError;
pub use reconcile::{BatchReport, Outcome, Reconciler};

/// Tracing target for the terse per-rule status line (`OK <rule>`).
///
/// Subscribers should let events on this target through regardless of the
/// configured verbosity.
pub const STATUS_TARGET: &str = "antibox::status";
