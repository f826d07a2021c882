// E37 Collector - Library root

pub mod auth;
pub mod config;
pub mod error;
pub mod http_client;
pub mod utils;

pub use auth::E37Options;
pub use error::{E37Error, Result};
pub use http_client::{E37Client, Liveness};

/// Exporter name shown on the landing page
pub const NAME: &str = "e37_exporter";

/// Prefix for every exported metric name
pub const NAMESPACE: &str = "e37";

/// Exporter name
pub fn name() -> &'static str {
    NAME
}
