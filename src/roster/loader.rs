//! Roster loading and validation.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::models::*;
use crate::status::{Thresholds, Watermarks};

/// A single problem found in a roster entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub application: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "application '{}': {}", self.application, self.message)
    }
}

/// Roster error types.
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("failed to read roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse roster: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid roster: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate a roster from a TOML file.
pub fn load_roster(path: &Path) -> Result<Vec<ApplicationDescriptor>, RosterError> {
    let content = fs::read_to_string(path)?;
    parse_roster(&content)
}

/// Parse and validate a roster from TOML text.
pub fn parse_roster(content: &str) -> Result<Vec<ApplicationDescriptor>, RosterError> {
    let file: RosterFile = toml::from_str(content)?;
    validate_roster(&file.applications).map_err(RosterError::Validation)
}

/// Validate roster entries, collecting every problem rather than stopping
/// at the first one.
pub fn validate_roster(
    entries: &[ApplicationEntry],
) -> Result<Vec<ApplicationDescriptor>, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut descriptors = Vec::with_capacity(entries.len());

    for entry in entries {
        let label = if entry.name.trim().is_empty() {
            "<unnamed>".to_string()
        } else {
            entry.name.clone()
        };
        let mut fail = |message: String| {
            errors.push(ValidationError {
                application: label.clone(),
                message,
            })
        };

        if entry.name.trim().is_empty() {
            fail("name must not be empty".to_string());
        } else if !seen.insert(entry.name.as_str()) {
            fail("duplicate application name".to_string());
        }

        match url::Url::parse(&entry.url) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
            Ok(u) => fail(format!("unsupported url scheme '{}'", u.scheme())),
            Err(e) => fail(format!("invalid url '{}': {}", entry.url, e)),
        }

        let verb = Verb::parse(&entry.verb);
        if verb.is_none() {
            fail(format!("unsupported verb '{}', expected GET or POST", entry.verb));
        }

        let auth = match (non_empty(&entry.auth_header), non_empty(&entry.auth_header_value)) {
            (Some(name), Some(value)) => {
                let value = SecretSource::parse(value);
                if matches!(&value, SecretSource::Env(key) if key.is_empty()) {
                    fail("authHeaderValue 'env:' must name a variable".to_string());
                }
                Some(AuthHeader {
                    name: name.to_string(),
                    value,
                })
            }
            (None, None) => None,
            _ => {
                fail("authHeader and authHeaderValue must be set together".to_string());
                None
            }
        };

        let error_percentage = Watermarks::new(
            entry.error_low_watermark_percentage,
            entry.error_medium_watermark_percentage,
            entry.error_high_watermark_percentage,
        );
        let p90_seconds = Watermarks::new(
            entry.p90_low_watermark_seconds,
            entry.p90_medium_watermark_seconds,
            entry.p90_high_watermark_seconds,
        );
        for problem in check_watermarks("error", &error_percentage)
            .into_iter()
            .chain(check_watermarks("p90", &p90_seconds))
        {
            fail(problem);
        }

        let body = match verb {
            Some(Verb::Post) => entry.data.clone(),
            _ => None,
        };

        descriptors.push(ApplicationDescriptor {
            name: entry.name.clone(),
            url: entry.url.clone(),
            verb: verb.unwrap_or_default(),
            body,
            auth,
            thresholds: Thresholds {
                error_percentage,
                p90_seconds,
            },
        });
    }

    if errors.is_empty() {
        Ok(descriptors)
    } else {
        Err(errors)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn check_watermarks(dimension: &str, w: &Watermarks) -> Vec<String> {
    let mut problems = Vec::new();
    for (level, value) in [("low", w.low), ("medium", w.medium), ("high", w.high)] {
        if !value.is_finite() || value < 0.0 {
            problems.push(format!(
                "{} {} watermark must be a non-negative number, got {}",
                dimension, level, value
            ));
        }
    }
    if problems.is_empty() && !(w.low <= w.medium && w.medium <= w.high) {
        problems.push(format!(
            "{} watermarks must satisfy low <= medium <= high, got {}/{}/{}",
            dimension, w.low, w.medium, w.high
        ));
    }
    problems
}
