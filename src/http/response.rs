//! Captured HTTP responses

use reqwest::header::{CONTENT_TYPE, SET_COOKIE};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use crate::common::{Error, Result};

/// Response body, decoded as JSON when the server says it is JSON
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Decode a body according to its content type
    ///
    /// A JSON content type with an unparseable body falls back to text.
    pub fn decode(content_type: Option<&str>, text: String) -> Self {
        let is_json = content_type
            .map(|ct| ct.trim_start().starts_with("application/json"))
            .unwrap_or(false);
        if is_json {
            if let Ok(value) = serde_json::from_str(&text) {
                return ResponseBody::Json(value);
            }
        }
        ResponseBody::Text(text)
    }

    /// Pretty-printed JSON, or the raw text
    pub fn pretty(&self) -> String {
        match self {
            ResponseBody::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            ResponseBody::Text(text) => text.clone(),
        }
    }
}

/// Everything a test case needs to know about one response
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    pub status: u16,
    /// Final URL, after redirects
    pub url: String,
    pub elapsed: Duration,
    pub headers: Vec<(String, String)>,
    pub cookies: BTreeMap<String, String>,
    pub body: ResponseBody,
}

impl ResponseRecord {
    /// Read a reqwest response to completion
    pub(crate) async fn read(response: reqwest::Response, started: Instant) -> Result<Self> {
        let status = response.status().as_u16();
        let url = response.url().to_string();

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(parse_set_cookie)
            .collect();

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let text = response
            .text()
            .await
            .map_err(|e| Error::Request(format!("failed to read response body: {}", e)))?;

        Ok(Self {
            status,
            url,
            elapsed: started.elapsed(),
            headers,
            cookies,
            body: ResponseBody::decode(content_type.as_deref(), text),
        })
    }

    /// Case-insensitive header lookup (first value)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Multi-line summary logged before a case is asserted
    pub fn diagnostics(&self) -> String {
        let headers = self
            .headers
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        let cookies = self
            .cookies
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "\n========== Full response ==========\n\
             Status: {}\n\
             URL: {}\n\
             Elapsed: {:.3}s\n\
             Headers: {{{}}}\n\
             Cookies: {{{}}}\n\
             Body: {}\n\
             ===================================",
            self.status,
            self.url,
            self.elapsed.as_secs_f64(),
            headers,
            cookies,
            self.body.pretty()
        )
    }
}

impl fmt::Display for ResponseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Response [{}] {}>", self.status, self.url)
    }
}

/// Name and value from a `Set-Cookie` header
fn parse_set_cookie(header: &str) -> Option<(String, String)> {
    let pair = header.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().trim_matches('"').to_string()))
}
