//! HTTP transport backed by reqwest.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use std::time::Duration;

use super::{ProbeError, ProbeRequest, ProbeResponse, Transport};
use crate::roster::Verb;

/// Transport that issues real HTTP requests.
///
/// Holds one client so connections are pooled across all workers that
/// share it.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport whose client times out after `timeout` by default.
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

fn build_headers(headers: &[(String, String)]) -> Result<HeaderMap, ProbeError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ProbeError::Request(format!("header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ProbeError::Request(format!("header '{}' value: {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn map_send_error(e: reqwest::Error, timeout: Duration) -> ProbeError {
    if e.is_timeout() {
        ProbeError::Timeout(timeout)
    } else {
        ProbeError::Network(e.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ProbeRequest) -> Result<ProbeResponse, ProbeError> {
        let method = match request.verb {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
        };
        let headers = build_headers(&request.headers)?;

        let mut builder = self
            .client
            .request(method, &request.url)
            .headers(headers)
            .timeout(request.timeout);
        if let (Verb::Post, Some(body)) = (request.verb, request.body) {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_send_error(e, request.timeout))?;
        let status = response.status().as_u16();

        // Read the full body to measure complete transfer time
        response
            .bytes()
            .await
            .map_err(|e| map_send_error(e, request.timeout))?;

        Ok(ProbeResponse { status })
    }
}
