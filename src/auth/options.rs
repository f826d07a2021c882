// Connection options for an E37 device

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::time::Duration;

use crate::error::{E37Error, Result};

/// Default number of concurrent requests during collection
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default timeout on HTTP requests to the device
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1600);

/// Everything needed to log in to an E37 device
///
/// The password can be set but never read back through the public API.
#[derive(Clone)]
pub struct E37Options {
    /// Base URL of the E37 server, e.g. `https://172.38.30.2:8443`
    pub url: String,
    pub username: String,
    password: SecretString,

    /// Advisory bound on simultaneous in-flight requests, not enforced here
    pub concurrency: usize,

    /// Request timeout; zero disables it
    pub timeout: Duration,

    /// Skip TLS certificate verification
    pub insecure: bool,
}

impl E37Options {
    /// Create options with default concurrency, timeout and TLS policy
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: SecretString::from(password.into()),
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            insecure: true,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub(crate) fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for E37Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("E37Options")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("concurrency", &self.concurrency)
            .field("timeout", &self.timeout)
            .field("insecure", &self.insecure)
            .finish()
    }
}

/// Parse and validate the configured server address
///
/// A value without `://` is treated as a plain `host:port` and gets `http://`
/// prepended. Only http and https URLs with a non-empty host and no query
/// or fragment are accepted.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let uri = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    let url = Url::parse(&uri)
        .map_err(|e| E37Error::ConfigError(format!("invalid E37 URL {}: {}", uri, e)))?;

    let has_host = url.host_str().is_some_and(|h| !h.is_empty());
    if !has_host || !matches!(url.scheme(), "http" | "https") {
        return Err(E37Error::ConfigError(format!("invalid E37 URL: {}", uri)));
    }

    // Endpoints are appended to the base, so it must end in a path
    if url.query().is_some() || url.fragment().is_some() {
        return Err(E37Error::ConfigError(format!(
            "invalid E37 URL {}: query and fragment are not allowed",
            uri
        )));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = E37Options::new("https://172.38.30.2:8443", "admin", "admin");
        assert_eq!(opts.concurrency, 10);
        assert_eq!(opts.timeout, Duration::from_millis(1600));
        assert!(opts.insecure);
        assert_eq!(opts.password(), "admin");
    }

    #[test]
    fn test_builders() {
        let opts = E37Options::new("host", "admin", "admin")
            .with_concurrency(4)
            .with_timeout(Duration::from_secs(5))
            .with_insecure(false);
        assert_eq!(opts.concurrency, 4);
        assert_eq!(opts.timeout, Duration::from_secs(5));
        assert!(!opts.insecure);
    }

    #[test]
    fn test_debug_redacts_password() {
        let opts = E37Options::new("host", "admin", "hunter2");
        let printed = format!("{:?}", opts);
        assert!(printed.contains("[REDACTED]"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_parse_base_url_prepends_scheme() {
        let url = parse_base_url("172.38.30.2:8443").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_str(), Some("172.38.30.2"));
        assert_eq!(url.port(), Some(8443));
    }

    #[test]
    fn test_parse_base_url_keeps_https() {
        let url = parse_base_url("https://e37.example.com:8443").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("e37.example.com"));
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        let err = parse_base_url("ftp://e37.example.com").unwrap_err();
        assert!(matches!(err, E37Error::ConfigError(_)));
    }

    #[test]
    fn test_parse_base_url_rejects_missing_host() {
        assert!(parse_base_url("http://").is_err());
        assert!(parse_base_url("").is_err());
        assert!(parse_base_url("http:// bad host").is_err());
    }

    #[test]
    fn test_parse_base_url_rejects_query_and_fragment() {
        let err = parse_base_url("http://127.0.0.1:8443/?tenant=a").unwrap_err();
        assert!(matches!(err, E37Error::ConfigError(_)));
        assert!(parse_base_url("https://e37.example.com/#top").is_err());
        assert!(parse_base_url("e37.example.com:8443?x=1").is_err());
    }
}
