//! Request dispatching
//!
//! Every request goes to `base_url + path` with the configured timeout.
//! All transport failures are reported as [`Error::Request`].

use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use std::time::Instant;

use super::payload::Payload;
use super::response::ResponseRecord;
use crate::common::{Config, Error, Result};

/// Something that can send a test case's request
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn send(&self, method: &str, url_path: &str, payload: &Payload)
        -> Result<ResponseRecord>;
}

/// HTTP dispatcher backed by reqwest
pub struct Dispatcher {
    client: reqwest::Client,
    config: Arc<Config>,
}

impl Dispatcher {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("apicase/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    /// Absolute URL for a path; plain concatenation, no normalization
    pub fn target_url(&self, url_path: &str) -> Result<String> {
        Ok(format!("{}{}", self.config.base_url()?, url_path))
    }
}

#[async_trait]
impl Dispatch for Dispatcher {
    async fn send(
        &self,
        method: &str,
        url_path: &str,
        payload: &Payload,
    ) -> Result<ResponseRecord> {
        let url = self.target_url(url_path)?;
        let timeout = self.config.timeout()?;
        let method = parse_method(method)?;

        tracing::info!("Request: {} {}", method, url);

        let mut request = self.client.request(method, &url).timeout(timeout);
        for (name, value) in self.config.default_headers() {
            request = request.header(name, value);
        }
        let request = payload.apply(request)?;
        tracing::debug!("Payload: {:?}", payload);

        let started = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| Error::Request(error_chain(&e)))?;
        ResponseRecord::read(response, started).await
    }
}

fn parse_method(method: &str) -> Result<Method> {
    let upper = method.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Err(Error::Request("HTTP method is empty".to_string()));
    }
    Method::from_bytes(upper.as_bytes())
        .map_err(|_| Error::Request(format!("invalid HTTP method '{}'", method)))
}

/// Render an error with its sources, e.g. `error sending request: connection refused`
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
