use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;
use tracing::{debug, info};

use crate::{
    error::{ForecastError, TransportError},
    model::ForecastResponse,
    request::ForecastRequest,
};

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// The single GET the pipeline performs. Implemented by [`HttpTransport`] and by test mocks.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                source: Box::new(e),
            })?;

        let status = res.status().as_u16();
        let body = res.text().await.map_err(|e| TransportError::Body {
            url: url.to_string(),
            source: Box::new(e),
        })?;

        Ok(RawResponse { status, body })
    }
}

#[derive(Debug, Clone)]
pub struct ForecastClient<T> {
    transport: T,
}

impl ForecastClient<HttpTransport> {
    pub fn http() -> Self {
        Self::new(HttpTransport::new())
    }
}

impl<T: Transport> ForecastClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// One best-effort attempt: anything but 200 is an API error.
    pub async fn fetch(&self, request: &ForecastRequest) -> Result<ForecastResponse, ForecastError> {
        let url = request.url();
        debug!("GET {url}");

        let raw = self.transport.get(&url).await?;

        if raw.status != 200 {
            return Err(ForecastError::Api {
                status: raw.status,
                body: describe_body(&raw.body),
            });
        }

        let response = ForecastResponse::from_json(&raw.body)?;
        info!("Fetched forecast ({} bytes)", raw.body.len());
        Ok(response)
    }
}

/// Compact JSON when the body decodes, otherwise the raw text on one line, truncated either way.
fn describe_body(body: &str) -> String {
    let text = serde_json::from_str::<serde_json::Value>(body)
        .map(|value| value.to_string())
        .unwrap_or_else(|_| body.split_whitespace().collect::<Vec<_>>().join(" "));
    truncate_body(&text)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
