// HTTP client for the REST collaborator
// One shared wrapper for every resource: base-URL joining, bearer injection
// from the session store, `{data: ...}` envelope decode, and retry on
// transient transport failures. Resource modules build on the typed helpers
// here and map failures into the public error taxonomy at their boundary.

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use url::Url;
use uuid::Uuid;

use crate::models::record::Envelope;
use crate::session::SessionStore;
use crate::utils::logging::mask_authorization;

fn default_base_url() -> String {
    "https://api.rentora.app/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    12
}

fn default_retry_base_delay_ms() -> u64 {
    150
}

fn default_retry_max_attempts() -> usize {
    3
}

/// Backend connection settings. Deserializable so a host can load it from
/// its own configuration file; every field has a working default.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_attempts: default_retry_max_attempts(),
        }
    }
}

/// Shared HTTP wrapper for all backend resources.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    session: Arc<dyn SessionStore>,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig, session: Arc<dyn SessionStore>) -> Result<Self> {
        // A trailing slash makes Url::join treat the last path segment as a
        // directory; without it, joining would drop the segment.
        let mut base_str = config.base_url.trim_end_matches('/').to_string();
        base_str.push('/');
        let base = Url::parse(&base_str)
            .with_context(|| format!("Invalid API base URL: '{}'", config.base_url))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base,
            session,
            config,
        })
    }

    /// GET a resource and unwrap its `{data: ...}` envelope.
    pub async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.join(path, query)?;
        let resp = self.send_with_retry(Method::GET, url, None).await?;
        let envelope: Envelope<T> = resp.json().await.context("Malformed response body")?;
        Ok(envelope.data)
    }

    /// POST a JSON body and unwrap the enveloped response.
    pub async fn post_data<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.join(path, &[])?;
        let body = serde_json::to_value(body).context("Failed to encode request body")?;
        let resp = self.send_with_retry(Method::POST, url, Some(body)).await?;
        let envelope: Envelope<T> = resp.json().await.context("Malformed response body")?;
        Ok(envelope.data)
    }

    /// PUT a JSON body and unwrap the enveloped response.
    pub async fn put_data<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.join(path, &[])?;
        let body = serde_json::to_value(body).context("Failed to encode request body")?;
        let resp = self.send_with_retry(Method::PUT, url, Some(body)).await?;
        let envelope: Envelope<T> = resp.json().await.context("Malformed response body")?;
        Ok(envelope.data)
    }

    /// DELETE a resource. The backend acknowledges with 204/2xx and no body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.join(path, &[])?;
        self.send_with_retry(Method::DELETE, url, None).await?;
        Ok(())
    }

    fn join(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self
            .base
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("Invalid request path: '{}'", path))?;
        for (key, value) in query {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }

    async fn send_with_retry(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let correlation_id = Uuid::new_v4().simple().to_string();
        let auth_header = self
            .session
            .bearer_token()
            .map(|token| format!("Bearer {}", token));

        match &auth_header {
            Some(header) => debug!(
                "[STEP: request] [{}] {} {} (auth: {})",
                correlation_id,
                method,
                url.path(),
                mask_authorization(header)
            ),
            None => warn!(
                "[STEP: request] [{}] {} {} without a session token",
                correlation_id,
                method,
                url.path()
            ),
        }

        let attempt = || {
            let method = method.clone();
            let url = url.clone();
            let body = body.clone();
            let auth_header = auth_header.clone();
            async move {
                let mut req = self.http.request(method, url);
                if let Some(header) = auth_header {
                    req = req.header(reqwest::header::AUTHORIZATION, header);
                }
                if let Some(body) = body {
                    req = req.json(&body);
                }

                let resp = req.send().await?;
                if !resp.status().is_success() {
                    return Err(anyhow::anyhow!("HTTP {}", resp.status()));
                }
                Ok(resp)
            }
        };

        let retry_strategy = ExponentialBackoff::from_millis(self.config.retry_base_delay_ms)
            .factor(2)
            .max_delay(Duration::from_secs(2))
            .take(self.config.retry_max_attempts)
            .map(jitter);

        let result = RetryIf::spawn(retry_strategy, attempt, |e: &anyhow::Error| {
            let msg = e.to_string().to_ascii_lowercase();
            msg.contains("timeout")
                || msg.contains("timed out")
                || msg.contains("network")
                || msg.contains("connection")
        })
        .await;

        if let Err(e) = &result {
            warn!(
                "[STEP: request] [{}] Request failed after retries: {}",
                correlation_id, e
            );
        }
        result
    }
}
