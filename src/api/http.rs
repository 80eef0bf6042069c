use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{expand_path, ApiError, PathParams, RestClient};
use crate::auth::Credentials;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = "gizz";
const ACCEPT: &str = "application/vnd.github+json";

/// `RestClient` over HTTPS using reqwest.
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    #[instrument(skip(self, params, body, credentials), fields(auth = credentials.is_some()))]
    async fn send(
        &self,
        method: Method,
        path: &str,
        params: &PathParams<'_>,
        body: Option<Value>,
        credentials: Option<&Credentials>,
    ) -> Result<Value, ApiError> {
        let location = expand_path(path, params)?;
        let url = format!("{}{}", self.base_url, location);
        debug!(%url, "sending request");

        let mut request = self
            .client
            .request(method, &url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", ACCEPT);
        if let Some(credentials) = credentials {
            request = request.basic_auth(credentials.username(), Some(credentials.secret()));
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "received response");

        if !status.is_success() {
            return Err(ApiError::Remote {
                status: status.as_u16(),
                body: text,
            });
        }

        decode_body(&text)
    }
}

/// Decode a successful response body; an empty body is `null`.
fn decode_body(text: &str) -> Result<Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(text)?)
}

#[async_trait]
impl RestClient for HttpClient {
    async fn get(&self, path: &str, params: &PathParams<'_>) -> Result<Value, ApiError> {
        self.send(Method::GET, path, params, None, None).await
    }

    async fn post(
        &self,
        path: &str,
        params: &PathParams<'_>,
        body: Option<Value>,
        credentials: Option<&Credentials>,
    ) -> Result<Value, ApiError> {
        self.send(Method::POST, path, params, body, credentials).await
    }

    async fn put(
        &self,
        path: &str,
        params: &PathParams<'_>,
        body: Option<Value>,
        credentials: Option<&Credentials>,
    ) -> Result<Value, ApiError> {
        self.send(Method::PUT, path, params, body, credentials).await
    }
}
