//! Roster model types.

use serde::Deserialize;
use std::fmt;

use crate::status::Thresholds;

/// HTTP method used to probe an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verb {
    #[default]
    Get,
    Post,
}

impl Verb {
    /// Parse a verb case-insensitively. An empty string means GET.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "GET" => Some(Verb::Get),
            "POST" => Some(Verb::Post),
            _ => None,
        }
    }
}

/// Where an auth header value comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Sent as written in the roster.
    Literal(String),
    /// Looked up by key on every request, written `env:KEY` in the roster.
    Env(String),
}

impl SecretSource {
    pub const ENV_PREFIX: &'static str = "env:";

    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(Self::ENV_PREFIX) {
            Some(key) => SecretSource::Env(key.to_string()),
            None => SecretSource::Literal(raw.to_string()),
        }
    }
}

// Literal values are credentials, keep them out of logs.
impl fmt::Debug for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretSource::Literal(_) => f.write_str("Literal(<redacted>)"),
            SecretSource::Env(key) => f.debug_tuple("Env").field(key).finish(),
        }
    }
}

/// Header attached to every probe request for an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeader {
    pub name: String,
    pub value: SecretSource,
}

/// One monitored application, validated and ready to probe.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationDescriptor {
    pub name: String,
    pub url: String,
    pub verb: Verb,
    /// Request body, only sent for POST.
    pub body: Option<String>,
    pub auth: Option<AuthHeader>,
    pub thresholds: Thresholds,
}

/// Top-level roster file layout.
#[derive(Debug, Deserialize, Default)]
pub struct RosterFile {
    #[serde(default, rename = "application")]
    pub applications: Vec<ApplicationEntry>,
}

/// One `[[application]]` table as written in the roster file.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationEntry {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub verb: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub auth_header: Option<String>,
    #[serde(default)]
    pub auth_header_value: Option<String>,
    pub error_high_watermark_percentage: f64,
    pub error_medium_watermark_percentage: f64,
    pub error_low_watermark_percentage: f64,
    pub p90_high_watermark_seconds: f64,
    pub p90_medium_watermark_seconds: f64,
    pub p90_low_watermark_seconds: f64,
}
