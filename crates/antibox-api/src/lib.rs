// antibox-api: Async Rust client for the Altibox home-gateway web API

pub mod auth;
pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;
pub mod wifi;

pub use client::{AltiboxClient, DEFAULT_BASE_URL, Endpoint};
pub use error::Error;
pub use models::{NetworkClient, User};
pub use session::Session;
pub use transport::TransportConfig;
