use crate::error::SourceError;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SourceError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Minimal http surface the hosted api and explorer adapters need. Status codes
/// are returned as is, only transport failures are errors here.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, SourceError>;
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, SourceError>;
}

pub type HttpTransportRef = Arc<dyn HttpTransport>;

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn read(&self, url: &str, resp: reqwest::Response) -> Result<HttpResponse, SourceError> {
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| {
            SourceError::unavailable(format!("Failed to read response from {}: {}", url, e))
        })?;

        Ok(HttpResponse { status, body })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, SourceError> {
        let full_url = Url::parse_with_params(url, query)
            .map_err(|e| SourceError::config(format!("Invalid url {}: {}", url, e)))?;

        // Only the bare url is logged, the query may carry an api key
        let resp = self.client.get(full_url).send().await.map_err(|e| {
            SourceError::unavailable(format!("Failed to send request to {}: {}", url, e.without_url()))
        })?;

        self.read(url, resp).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, SourceError> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                SourceError::unavailable(format!("Failed to send request to {}: {}", url, e.without_url()))
            })?;

        self.read(url, resp).await
    }
}
