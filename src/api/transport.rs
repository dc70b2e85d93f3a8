use crate::utils::{Result, TranslatorError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Authentication scheme for a single request.
///
/// Organization provisioning authenticates with the donor token as a
/// bearer token; every later call uses the API key issued by that step.
#[derive(Debug, Clone)]
pub enum AuthScheme {
    Bearer(String),
    Key(String),
}

impl AuthScheme {
    fn header_value(&self) -> String {
        match self {
            AuthScheme::Bearer(token) => format!("Bearer {}", token),
            AuthScheme::Key(api_key) => format!("Key {}", api_key),
        }
    }
}

/// Join a host and an API path, tolerating stray slashes on either side.
pub fn api_url(host: &str, path: &str) -> String {
    format!(
        "{}/{}",
        host.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Transport seam between the API client and the wire.
///
/// The production implementation is [`HttpTransport`]; tests and offline
/// runs use [`crate::api::MockTransport`].
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn get_json(&self, url: &str, auth: &AuthScheme) -> Result<Value>;

    async fn post_json(&self, url: &str, auth: &AuthScheme, body: Option<&Value>)
        -> Result<Value>;
}

/// reqwest-backed transport with a request timeout.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TranslatorError::Transport)?;

        Ok(Self { client })
    }

    async fn read_json(response: reqwest::Response) -> Result<Value> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TranslatorError::Api { status, body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn get_json(&self, url: &str, auth: &AuthScheme) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .header("Authorization", auth.header_value())
            .send()
            .await?;

        Self::read_json(response).await
    }

    async fn post_json(
        &self,
        url: &str,
        auth: &AuthScheme,
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut request = self
            .client
            .post(url)
            .header("Authorization", auth.header_value());

        if let Some(body) = body {
            request = request
                .header("Content-Type", "application/json")
                .json(body);
        }

        Self::read_json(request.send().await?).await
    }
}
