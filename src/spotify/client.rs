use std::sync::Arc;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{QuizError, Result, management::TokenStore};

/// The single egress point for Spotify Web API calls.
///
/// Attaches the current bearer token and maps responses: `204` is `None`,
/// any other non-2xx status is [`QuizError::ApiError`]. There is no retry;
/// callers interpret failures themselves.
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: Arc<TokenStore>,
}

impl ApiClient {
    /// Creates a client for `base_url`, e.g. `https://api.spotify.com/v1`.
    ///
    /// A trailing slash on the base URL is ignored.
    pub fn new(base_url: impl Into<String>, tokens: Arc<TokenStore>) -> Self {
        Self::with_http_client(base_url, tokens, Client::new())
    }

    pub fn with_http_client(base_url: impl Into<String>, tokens: Arc<TokenStore>, http: Client) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Sends one authenticated request.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `path` - Path below the base URL, starting with `/`
    /// * `body` - Optional JSON body
    ///
    /// # Returns
    ///
    /// The parsed JSON body, or `None` for `204 No Content` and empty bodies.
    ///
    /// # Errors
    ///
    /// - [`QuizError::Unauthenticated`] if no valid token exists; no
    ///   request is sent
    /// - [`QuizError::ApiError`] with status and body for any non-2xx answer
    /// - [`QuizError::Http`] for transport failures
    ///
    /// # Example
    ///
    /// ```
    /// let body = json!({ "uris": ["spotify:track:4uLU6hMCjMI75M1A2tKUQC"], "position_ms": 0 });
    /// client.request(Method::PUT, "/me/player/play", Some(&body)).await?;
    /// ```
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Option<Value>> {
        let token = self
            .tokens
            .get_access_token()
            .await?
            .ok_or(QuizError::Unauthenticated)?;

        let url = format!("{}{}", self.base_url, path);
        debug!(%method, path, "spotify request");

        let mut req = self.http.request(method, &url).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send().await?;
        let status = res.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = res.text().await?;
        if !status.is_success() {
            return Err(QuizError::ApiError {
                status: status.as_u16(),
                body: text,
            });
        }

        // playback endpoints sometimes answer 200/202 with an empty body
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// `GET` and deserialize the body into `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.request(Method::GET, path, None).await?;
        Ok(serde_json::from_value(value.unwrap_or(Value::Null))?)
    }

    pub async fn put(&self, path: &str, body: Option<&Value>) -> Result<Option<Value>> {
        self.request(Method::PUT, path, body).await
    }
}
