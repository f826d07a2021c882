use anyhow::Result;
use clap::Parser;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::time::Duration;

use crate::auth::E37Options;

/// E37 Collector - authenticated client for E37 devices
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// HTTP API address of an E37 server (prefix with https:// to connect over HTTPS)
    #[arg(
        long = "e37-server",
        env = "E37_SERVER",
        default_value = "https://172.38.30.2:8443"
    )]
    pub server: String,

    /// E37 username
    #[arg(long = "e37-user", env = "E37_USER", default_value = "admin")]
    pub username: String,

    /// E37 password
    #[arg(
        long = "e37-pass",
        env = "E37_PASS",
        default_value = "admin",
        hide_default_value = true,
        hide_env_values = true
    )]
    pub password: String,

    /// Number of concurrent requests during collection
    #[arg(long = "concurrent", env = "E37_CONCURRENCY", default_value = "10")]
    pub concurrency: usize,

    /// Timeout on HTTP requests to the E37 API, e.g. 1600ms, 2s, 1m30s (0 disables it)
    #[arg(
        long = "time-out",
        env = "E37_TIMEOUT",
        default_value = "1600ms",
        value_parser = parse_duration
    )]
    pub timeout: Duration,

    /// Disable TLS host verification
    #[arg(
        long,
        env = "E37_INSECURE",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub insecure: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    // E37 connection
    pub e37_server: String,
    pub e37_username: String,
    pub e37_password: SecretString,

    // HTTP client
    pub concurrency: usize,
    pub request_timeout: Duration,
    pub insecure: bool,

    // Logging
    pub log_level: String,
}

impl Config {
    /// Load configuration with priority: CLI > ENV > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Self::from_args(CliArgs::parse()))
    }

    pub fn from_args(args: CliArgs) -> Self {
        Config {
            e37_server: args.server,
            e37_username: args.username,
            e37_password: SecretString::from(args.password),
            concurrency: args.concurrency,
            request_timeout: args.timeout,
            insecure: args.insecure,
            log_level: args.log_level,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.e37_server.trim().is_empty() {
            anyhow::bail!("E37_SERVER must not be empty");
        }
        if self.e37_username.is_empty() {
            anyhow::bail!("E37_USER must not be empty");
        }
        if self.concurrency == 0 {
            anyhow::bail!("E37_CONCURRENCY must be at least 1");
        }

        Ok(())
    }

    /// Connection options for the E37 client
    pub fn options(&self) -> E37Options {
        E37Options::new(
            &self.e37_server,
            &self.e37_username,
            self.e37_password.expose_secret(),
        )
        .with_concurrency(self.concurrency)
        .with_timeout(self.request_timeout)
        .with_insecure(self.insecure)
    }
}

impl fmt::Debug for CliArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliArgs")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("concurrency", &self.concurrency)
            .field("timeout", &self.timeout)
            .field("insecure", &self.insecure)
            .field("log_level", &self.log_level)
            .finish()
    }
}

/// Parse a Go-style duration such as `1600ms`, `1.5s` or `1m30s`
///
/// A bare number is taken as milliseconds.
fn parse_duration(raw: &str) -> std::result::Result<Duration, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty duration".to_string());
    }
    if let Ok(ms) = raw.parse::<u64>() {
        return Ok(Duration::from_millis(ms));
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut total = Duration::ZERO;
    let mut rest = raw;
    while !rest.is_empty() {
        let unit_start = rest
            .find(|c: char| !is_number(c))
            .ok_or_else(|| format!("missing unit in duration {:?}", raw))?;
        let (number, tail) = rest.split_at(unit_start);
        let unit_end = tail.find(is_number).unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);

        let value: f64 = number
            .parse()
            .map_err(|_| format!("invalid duration {:?}", raw))?;
        let secs = match unit {
            "ms" => value / 1000.0,
            "s" => value,
            "m" => value * 60.0,
            "h" => value * 3600.0,
            _ => return Err(format!("unknown unit {:?} in duration {:?}", unit, raw)),
        };
        total += Duration::from_secs_f64(secs);
        rest = next;
    }

    Ok(total)
}
