//! Configuration module for status checks.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::scheduler::{
    PoolSettings, RunSettings, DEFAULT_CHANNEL_CAPACITY, DEFAULT_DEADLINE, DEFAULT_WORKERS,
};

/// Longest accepted value for any duration setting (one week).
pub const MAX_DURATION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Where the report is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "" | "-" => Output::Stdout,
            path => Output::File(PathBuf::from(path)),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Process configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Roster file (default: "applications.toml")
    pub roster_path: PathBuf,
    /// Probing window for each round (default: 10s)
    pub deadline: Duration,
    /// Probers per application (default: 5)
    pub workers: usize,
    /// Outcome channel capacity per application (default: 100)
    pub channel_capacity: usize,
    /// Single request ceiling (default: the deadline)
    pub request_timeout: Option<Duration>,
    /// Report destination (default: stdout)
    pub output: Output,
    /// Run a round at this interval instead of once
    pub interval: Option<Duration>,
    pub log_format: LogFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            roster_path: PathBuf::from("applications.toml"),
            deadline: DEFAULT_DEADLINE,
            workers: DEFAULT_WORKERS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            request_timeout: None,
            output: Output::Stdout,
            interval: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl RunConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STATUS_CHECKS_ROSTER_PATH`: roster file (default: "applications.toml")
    /// - `STATUS_CHECKS_DEADLINE_SECS`: round deadline in seconds (default: 10)
    /// - `STATUS_CHECKS_WORKERS`: probers per application (default: 5)
    /// - `STATUS_CHECKS_CHANNEL_CAPACITY`: outcome buffer (default: 100)
    /// - `STATUS_CHECKS_REQUEST_TIMEOUT_SECS`: per-request ceiling (default: deadline)
    /// - `STATUS_CHECKS_OUTPUT`: `-` for stdout or a file path (default: "-")
    /// - `STATUS_CHECKS_INTERVAL_SECS`: repeat rounds at this interval (default: run once)
    /// - `STATUS_CHECKS_LOG_FORMAT`: `pretty` or `json` (default: "pretty")
    ///
    /// Ignored values are returned as warnings rather than logged, since
    /// logging is set up from the loaded configuration.
    pub fn load() -> (Self, Vec<String>) {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> (Self, Vec<String>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let mut warnings = Vec::new();

        if let Some(path) = lookup("STATUS_CHECKS_ROSTER_PATH").filter(|p| !p.is_empty()) {
            cfg.roster_path = PathBuf::from(path);
        }

        if let Some(deadline) = seconds(&lookup, "STATUS_CHECKS_DEADLINE_SECS", &mut warnings) {
            cfg.deadline = deadline;
        }

        if let Some(workers) = positive(&lookup, "STATUS_CHECKS_WORKERS", &mut warnings) {
            cfg.workers = workers;
        }

        if let Some(capacity) = positive(&lookup, "STATUS_CHECKS_CHANNEL_CAPACITY", &mut warnings) {
            cfg.channel_capacity = capacity;
        }

        cfg.request_timeout =
            seconds(&lookup, "STATUS_CHECKS_REQUEST_TIMEOUT_SECS", &mut warnings);
        cfg.interval = seconds(&lookup, "STATUS_CHECKS_INTERVAL_SECS", &mut warnings);

        if let Some(output) = lookup("STATUS_CHECKS_OUTPUT") {
            cfg.output = Output::parse(&output);
        }

        if let Some(format) = lookup("STATUS_CHECKS_LOG_FORMAT") {
            match format.parse() {
                Ok(f) => cfg.log_format = f,
                Err(e) => warnings.push(format!("Ignoring STATUS_CHECKS_LOG_FORMAT: {}", e)),
            }
        }

        (cfg, warnings)
    }

    /// Settings handed to the scheduler for each round.
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            deadline: self.deadline,
            request_timeout: self.request_timeout.unwrap_or(self.deadline).min(self.deadline),
            pool: PoolSettings {
                workers: self.workers,
                channel_capacity: self.channel_capacity,
            },
        }
    }
}

/// Parse a positive number of seconds no longer than [`MAX_DURATION`].
fn seconds<F>(lookup: &F, key: &str, warnings: &mut Vec<String>) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    let parsed = raw
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .filter(|d| !d.is_zero() && *d <= MAX_DURATION);

    if parsed.is_none() {
        warnings.push(format!(
            "Ignoring {}={:?}: expected a positive number of seconds up to {}",
            key,
            raw,
            MAX_DURATION.as_secs()
        ));
    }
    parsed
}

fn positive<F>(lookup: &F, key: &str, warnings: &mut Vec<String>) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            warnings.push(format!("Ignoring {}={:?}: expected a positive integer", key, raw));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load_pairs(pairs: &[(&str, &str)]) -> (RunConfig, Vec<String>) {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RunConfig::from_lookup(|key| map.get(key).cloned())
    }

    fn from_pairs(pairs: &[(&str, &str)]) -> RunConfig {
        load_pairs(pairs).0
    }

    #[test]
    fn test_default_config() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.roster_path, PathBuf::from("applications.toml"));
        assert_eq!(cfg.deadline, Duration::from_secs(10));
        assert_eq!(cfg.workers, 5);
        assert_eq!(cfg.channel_capacity, 100);
        assert_eq!(cfg.output, Output::Stdout);
        assert_eq!(cfg.interval, None);
        assert_eq!(from_pairs(&[]), cfg);
    }

    #[test]
    fn test_overrides() {
        let cfg = from_pairs(&[
            ("STATUS_CHECKS_ROSTER_PATH", "/etc/status/apps.toml"),
            ("STATUS_CHECKS_DEADLINE_SECS", "2.5"),
            ("STATUS_CHECKS_WORKERS", "8"),
            ("STATUS_CHECKS_CHANNEL_CAPACITY", "16"),
            ("STATUS_CHECKS_REQUEST_TIMEOUT_SECS", "1"),
            ("STATUS_CHECKS_OUTPUT", "/var/lib/status/status.json"),
            ("STATUS_CHECKS_INTERVAL_SECS", "60"),
            ("STATUS_CHECKS_LOG_FORMAT", "JSON"),
        ]);

        assert_eq!(cfg.roster_path, PathBuf::from("/etc/status/apps.toml"));
        assert_eq!(cfg.deadline, Duration::from_millis(2500));
        assert_eq!(cfg.workers, 8);
        assert_eq!(cfg.channel_capacity, 16);
        assert_eq!(cfg.request_timeout, Some(Duration::from_secs(1)));
        assert_eq!(
            cfg.output,
            Output::File(PathBuf::from("/var/lib/status/status.json"))
        );
        assert_eq!(cfg.interval, Some(Duration::from_secs(60)));
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let (cfg, warnings) = load_pairs(&[
            ("STATUS_CHECKS_DEADLINE_SECS", "soon"),
            ("STATUS_CHECKS_WORKERS", "0"),
            ("STATUS_CHECKS_CHANNEL_CAPACITY", "-3"),
            ("STATUS_CHECKS_INTERVAL_SECS", "0"),
            ("STATUS_CHECKS_LOG_FORMAT", "xml"),
        ]);
        assert_eq!(cfg, RunConfig::default());
        assert_eq!(warnings.len(), 5);
        assert!(warnings[0].starts_with("Ignoring STATUS_CHECKS_DEADLINE_SECS=\"soon\""));
        assert!(warnings[4].contains("unknown log format 'xml'"));
    }

    #[test]
    fn test_out_of_range_durations_fall_back() {
        let (cfg, warnings) = load_pairs(&[
            ("STATUS_CHECKS_DEADLINE_SECS", "1e30"),
            ("STATUS_CHECKS_REQUEST_TIMEOUT_SECS", "1e12"),
            ("STATUS_CHECKS_INTERVAL_SECS", "1e-12"),
        ]);
        assert_eq!(cfg, RunConfig::default());
        assert_eq!(warnings.len(), 3);

        let (cfg, warnings) = load_pairs(&[
            ("STATUS_CHECKS_DEADLINE_SECS", "inf"),
            ("STATUS_CHECKS_INTERVAL_SECS", "NaN"),
        ]);
        assert_eq!(cfg, RunConfig::default());
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_duration_upper_bound_is_inclusive() {
        let week = MAX_DURATION.as_secs().to_string();
        let (cfg, warnings) = load_pairs(&[("STATUS_CHECKS_INTERVAL_SECS", week.as_str())]);
        assert_eq!(cfg.interval, Some(MAX_DURATION));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_request_timeout_never_exceeds_deadline() {
        let cfg = from_pairs(&[("STATUS_CHECKS_REQUEST_TIMEOUT_SECS", "30")]);
        assert_eq!(cfg.run_settings().request_timeout, Duration::from_secs(10));

        let cfg = from_pairs(&[("STATUS_CHECKS_REQUEST_TIMEOUT_SECS", "0.5")]);
        let settings = cfg.run_settings();
        assert_eq!(settings.request_timeout, Duration::from_millis(500));
        assert_eq!(settings.deadline, Duration::from_secs(10));
        assert_eq!(settings.pool, PoolSettings::default());
    }

    #[test]
    fn test_output_parse() {
        assert_eq!(Output::parse("-"), Output::Stdout);
        assert_eq!(Output::parse(""), Output::Stdout);
        assert_eq!(
            Output::parse("status.json"),
            Output::File(PathBuf::from("status.json"))
        );
    }
}
