//! Report types produced by a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::Status;

/// Aggregate result for one application over a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSummary {
    pub application: String,
    pub url: String,
    pub total_requests: usize,
    pub success_count: usize,
    pub error_count: usize,
    /// 90th percentile latency in seconds, 0.0 without samples.
    pub p90: f64,
    pub status: Status,
}

/// One run's summaries, sorted by application name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub applications: Vec<ApplicationSummary>,
    pub last_updated: DateTime<Utc>,
}

impl Report {
    /// Build a report, sorting `applications` by name.
    pub fn new(mut applications: Vec<ApplicationSummary>, last_updated: DateTime<Utc>) -> Self {
        applications.sort_by(|a, b| a.application.cmp(&b.application));
        Self {
            applications,
            last_updated,
        }
    }

    pub fn application(&self, name: &str) -> Option<&ApplicationSummary> {
        self.applications.iter().find(|a| a.application == name)
    }
}
