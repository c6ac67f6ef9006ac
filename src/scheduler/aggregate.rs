//! Per-application worker pool and result aggregation.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::probe::{ProbeContext, ProbeOutcome, Prober};
use crate::report::ApplicationSummary;
use crate::roster::ApplicationDescriptor;
use crate::stats::{error_percentage, p90};
use crate::status::{classify, Measurement};

pub const DEFAULT_WORKERS: usize = 5;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Size of the worker pool run for each application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub workers: usize,
    pub channel_capacity: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Running counts for one application.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tally {
    pub success_count: usize,
    pub error_count: usize,
    pub durations: Vec<Duration>,
}

impl Tally {
    pub fn record(&mut self, outcome: ProbeOutcome) {
        if outcome.is_error() {
            self.error_count += 1;
        } else {
            self.success_count += 1;
        }
        self.durations.push(outcome.duration);
    }

    pub fn total(&self) -> usize {
        self.durations.len()
    }

    /// Compute p90 and status and produce the summary for `app`.
    pub fn summarize(&self, app: &ApplicationDescriptor) -> ApplicationSummary {
        let total = self.total();
        let measurement = Measurement {
            samples: total,
            error_percentage: error_percentage(self.error_count, total),
            p90: p90(&self.durations),
        };
        let status = classify(&measurement, &app.thresholds);

        ApplicationSummary {
            application: app.name.clone(),
            url: app.url.clone(),
            total_requests: total,
            success_count: self.success_count,
            error_count: self.error_count,
            p90: measurement.p90,
            status,
        }
    }
}

/// Probe `app` with a pool of workers until the deadline in `ctx` expires,
/// then summarize every outcome they produced.
///
/// The outcome channel closes once the last worker exits and drops its
/// sender, so draining ends exactly when no more outcomes can arrive.
pub async fn collect_results(
    app: Arc<ApplicationDescriptor>,
    pool: PoolSettings,
    ctx: ProbeContext,
) -> ApplicationSummary {
    let workers = pool.workers.max(1);
    let (tx, mut rx) = mpsc::channel(pool.channel_capacity.max(1));

    tracing::debug!("Starting {} probers for {}", workers, app.name);

    let mut probers = JoinSet::new();
    for id in 0..workers {
        let prober = Prober::new(id, app.clone(), ctx.clone());
        probers.spawn(prober.run(tx.clone()));
    }
    drop(tx);

    let mut tally = Tally::default();
    while let Some(outcome) = rx.recv().await {
        tally.record(outcome);
    }

    while let Some(joined) = probers.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Prober for {} exited abnormally: {}", app.name, e);
        }
    }

    let summary = tally.summarize(&app);
    tracing::info!(
        application = %summary.application,
        total = summary.total_requests,
        success = summary.success_count,
        errors = summary.error_count,
        p90 = summary.p90,
        status = %summary.status,
        "Collected results"
    );
    summary
}
