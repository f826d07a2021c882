use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{tls, Body, Client, Method, StatusCode};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::auth::{self, CheckRequest, E37Options, CHECK_PATH};
use crate::error::{E37Error, Result};
use crate::utils::mask_token;

/// Outcome of a session liveness check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// The device still accepts the current token
    Valid,
    /// The token was rejected and a new one has been stored
    Refreshed,
}

/// Current token plus the number of re-authentications since construction
#[derive(Clone)]
struct Session {
    token: String,
    generation: u64,
}

/// Authenticated HTTP client for an E37 device
///
/// Holds the configured transport and the current bearer token. The token
/// sits behind a lock: requests read a snapshot, re-authentication swaps it
/// under the write lock so concurrent refreshes serialize. Every swap bumps
/// a generation counter, so checks that saw the same session log in once.
pub struct E37Client {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Validated base URL without trailing slash
    base_url: String,

    /// Current bearer token and its generation
    session: RwLock<Session>,

    /// Connection options the session was built from
    opts: E37Options,
}

impl E37Client {
    /// Create a new client and log in
    ///
    /// Fails on an invalid URL, a transport that cannot be built, or a
    /// failed initial login. There is no deferred or retried startup.
    pub async fn new(opts: E37Options) -> Result<Self> {
        let url = auth::parse_base_url(&opts.url)?;
        let base_url = url.as_str().trim_end_matches('/').to_string();

        let mut builder = Client::builder()
            .min_tls_version(tls::Version::TLS_1_2)
            .danger_accept_invalid_certs(opts.insecure);
        if !opts.timeout.is_zero() {
            builder = builder.timeout(opts.timeout);
        }
        let client = builder.build()?;

        tracing::info!(
            url = %base_url,
            insecure = opts.insecure,
            timeout_ms = opts.timeout.as_millis() as u64,
            "Connecting to E37"
        );

        let token = auth::fetch_token(&client, &base_url, &opts).await?;

        Ok(Self {
            client,
            base_url,
            session: RwLock::new(Session {
                token,
                generation: 0,
            }),
            opts,
        })
    }

    /// Send an authenticated request and return the raw response body
    ///
    /// Any status other than 200 is an error; the body of a failed response
    /// is discarded. No retry and no token refresh happen on this path.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Body>,
    ) -> Result<Bytes> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(method = %method, url = %url, "Sending E37 request");

        let token = self.token().await;
        let mut request = self
            .client
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", token));
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(status = %status, url = %url, "E37 request failed");
            return Err(E37Error::E37ApiError {
                endpoint: endpoint.to_string(),
                status,
            });
        }

        let body = response.bytes().await?;
        tracing::trace!(
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&body),
            "E37 response"
        );
        Ok(body)
    }

    /// GET an endpoint
    pub async fn get(&self, endpoint: &str) -> Result<Bytes> {
        self.request(Method::GET, endpoint, None).await
    }

    /// POST a JSON-serialized payload to an endpoint
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &T,
    ) -> Result<Bytes> {
        let body = serde_json::to_vec(payload)?;
        self.request(Method::POST, endpoint, Some(Body::from(body)))
            .await
    }

    /// Check that the device still accepts the current token
    ///
    /// A JSON answer carrying a `username` means the token is valid. Any
    /// other JSON answer triggers exactly one login and the new token
    /// replaces the old one. A body that is not JSON is an error and leaves
    /// the token untouched.
    pub async fn check_session(&self) -> Result<Liveness> {
        let url = format!("{}{}", self.base_url, CHECK_PATH);
        tracing::debug!(method = "POST", url = %url, "Checking E37 session before scrape");

        let seen = self.session.read().await.clone();
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&CheckRequest { token: &seen.token })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        let data: serde_json::Value = serde_json::from_slice(&body)?;

        if data.get("username").and_then(|v| v.as_str()).is_some() {
            return Ok(Liveness::Valid);
        }

        tracing::error!(status = %status, "E37 token check failed, requesting a new token");
        self.reauthenticate(seen.generation).await.map_err(|e| {
            E37Error::AuthError(format!(
                "failed to re-acquire token after check returned {}: {}",
                status, e
            ))
        })?;

        Ok(Liveness::Refreshed)
    }

    /// Liveness check run before each scrape cycle
    ///
    /// Returns `true` both when the token was valid and when it was just
    /// refreshed; use [`E37Client::check_session`] to tell them apart.
    pub async fn ping(&self) -> Result<bool> {
        self.check_session().await.map(|_| true)
    }

    /// Log in again and store the new token
    ///
    /// If another caller already logged in since `seen` was read, its token
    /// is kept and no second login is made.
    async fn reauthenticate(&self, seen: u64) -> Result<()> {
        let mut session = self.session.write().await;
        if session.generation != seen {
            tracing::debug!("E37 token already refreshed by a concurrent check");
            return Ok(());
        }

        let fresh = auth::fetch_token(&self.client, &self.base_url, &self.opts).await?;
        tracing::info!(token = %mask_token(&fresh), "E37 token refreshed");
        session.token = fresh;
        session.generation += 1;
        Ok(())
    }

    /// Current bearer token
    pub async fn token(&self) -> String {
        self.session.read().await.token.clone()
    }

    /// Number of re-authentications since construction
    pub async fn generation(&self) -> u64 {
        self.session.read().await.generation
    }

    /// Advisory concurrency limit from the options
    pub fn concurrency(&self) -> usize {
        self.opts.concurrency
    }

    /// Validated base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Connection options the session was built from
    pub fn options(&self) -> &E37Options {
        &self.opts
    }
}
