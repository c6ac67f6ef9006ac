//! Probe module for application health checks.
//!
//! A probe is one HTTP request against an application. Workers in
//! [`worker`] issue probes in a loop and publish each completed one.

mod http;
pub mod secrets;
mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use http::*;
pub use worker::*;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::roster::Verb;

/// Value of the `User-Agent` header on every probe request.
pub const USER_AGENT: &str = "Status-Checks";

/// Probe error types.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid request: {0}")]
    Request(String),
}

/// A fully resolved request, ready for a transport.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub verb: Verb,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
}

impl ProbeRequest {
    /// Value of the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response of a request whose body was fully read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
}

/// One completed probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub duration: Duration,
    pub status: u16,
}

impl ProbeOutcome {
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Something that can carry a probe request to an application.
///
/// Implementations must read the whole response body before returning and
/// should honor `request.timeout`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ProbeRequest) -> Result<ProbeResponse, ProbeError>;
}
