//! Health classification from error and latency watermarks.

use serde::{Deserialize, Serialize};

/// Health of one application over a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Active,
    Degraded,
    Inactive,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Active => "ACTIVE",
            Status::Degraded => "DEGRADED",
            Status::Inactive => "INACTIVE",
        };
        f.write_str(s)
    }
}

/// Three ordered thresholds for one dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Watermarks {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Watermarks {
    pub const fn new(low: f64, medium: f64, high: f64) -> Self {
        Self { low, medium, high }
    }

    /// Tier for `value`, or `None` if it is at or below `low`.
    fn tier(&self, value: f64) -> Option<Status> {
        if value > self.high {
            Some(Status::Inactive)
        } else if value > self.medium {
            Some(Status::Degraded)
        } else if value > self.low {
            Some(Status::Active)
        } else {
            None
        }
    }
}

/// Per-application classification thresholds.
///
/// Error watermarks are percentages of completed requests (0-100);
/// latency watermarks are p90 seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub error_percentage: Watermarks,
    pub p90_seconds: Watermarks,
}

/// What a run measured for one application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub samples: usize,
    pub error_percentage: f64,
    pub p90: f64,
}

/// Classify a measurement. First matching rule wins:
///
/// 1. no samples (or a p90 of exactly 0.0) is `Inactive`;
/// 2. the error percentage against the error watermarks;
/// 3. the p90 against the latency watermarks;
/// 4. otherwise `Active`.
///
/// Comparisons are strict, so a value equal to a watermark falls to the
/// tier below it. Error watermarks are always checked before latency ones.
pub fn classify(measurement: &Measurement, thresholds: &Thresholds) -> Status {
    if measurement.samples == 0 || measurement.p90 == 0.0 {
        return Status::Inactive;
    }

    if let Some(status) = thresholds.error_percentage.tier(measurement.error_percentage) {
        return status;
    }

    thresholds
        .p90_seconds
        .tier(measurement.p90)
        .unwrap_or(Status::Active)
}
