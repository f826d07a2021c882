// Login exchange: credentials -> bearer token

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use super::options::E37Options;
use super::types::{LoginRequest, LoginResponse};
use super::AUTH_PATH;
use crate::error::{E37Error, Result};
use crate::utils::mask_token;

/// Log in to the E37 device and return a fresh bearer token
///
/// `base_url` is the validated server address without a trailing slash.
/// No retries: every failure goes straight back to the caller.
pub async fn fetch_token(client: &Client, base_url: &str, opts: &E37Options) -> Result<String> {
    let url = format!("{}{}", base_url, AUTH_PATH);
    tracing::debug!(url = %url, username = %opts.username, "Requesting E37 token");

    let request = LoginRequest {
        username: &opts.username,
        password: opts.password(),
    };

    let response = client
        .post(&url)
        .header(CONTENT_TYPE, "application/json")
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(E37Error::AuthError(format!(
            "login failed: {} - {}",
            status, error_text
        )));
    }

    let body = response.bytes().await?;
    let data: LoginResponse = serde_json::from_slice(&body)?;

    let token = match data.token {
        Some(token) if !token.is_empty() => token,
        _ => {
            return Err(E37Error::AuthError(
                "login response does not contain token".to_string(),
            ))
        }
    };

    tracing::debug!(token = %mask_token(&token), "Got E37 token");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_token_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"username": "admin", "password": "admin"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"token":"abc"}"#)
            .expect(1)
            .create_async()
            .await;

        let opts = E37Options::new(server.url(), "admin", "admin");
        let token = fetch_token(&Client::new(), &server.url(), &opts)
            .await
            .unwrap();

        assert_eq!(token, "abc");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_token_missing_token_key() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth")
            .with_status(200)
            .with_body(r#"{"msg":"ok"}"#)
            .create_async()
            .await;

        let opts = E37Options::new(server.url(), "admin", "admin");
        let err = fetch_token(&Client::new(), &server.url(), &opts)
            .await
            .unwrap_err();

        assert!(err.is_auth());
        assert!(err.to_string().contains("does not contain token"));
    }

    #[tokio::test]
    async fn test_fetch_token_empty_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth")
            .with_status(200)
            .with_body(r#"{"token":""}"#)
            .create_async()
            .await;

        let opts = E37Options::new(server.url(), "admin", "admin");
        let result = fetch_token(&Client::new(), &server.url(), &opts).await;
        assert!(matches!(result, Err(E37Error::AuthError(_))));
    }

    #[tokio::test]
    async fn test_fetch_token_rejected_credentials() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth")
            .with_status(401)
            .with_body("<html>Unauthorized</html>")
            .create_async()
            .await;

        let opts = E37Options::new(server.url(), "admin", "wrong");
        let err = fetch_token(&Client::new(), &server.url(), &opts)
            .await
            .unwrap_err();

        // The status is reported, not a JSON parse failure of the error page
        assert!(err.is_auth());
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_fetch_token_malformed_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let opts = E37Options::new(server.url(), "admin", "admin");
        let result = fetch_token(&Client::new(), &server.url(), &opts).await;
        assert!(matches!(result, Err(E37Error::DecodeError(_))));
    }

    #[tokio::test]
    async fn test_fetch_token_unreachable_server() {
        let opts = E37Options::new("http://127.0.0.1:1", "admin", "admin");
        let result = fetch_token(&Client::new(), "http://127.0.0.1:1", &opts).await;
        assert!(matches!(result, Err(E37Error::HttpError(_))));
    }
}
