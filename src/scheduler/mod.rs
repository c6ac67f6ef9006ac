//! Scheduler module for running probe rounds across the roster.

mod aggregate;

pub use aggregate::*;

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::probe::secrets::SecretResolver;
use crate::probe::{Deadline, ProbeContext, Transport};
use crate::report::{ApplicationSummary, Report};
use crate::roster::ApplicationDescriptor;
use crate::status::Status;

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Settings for one probe round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSettings {
    /// How long every application is probed.
    pub deadline: Duration,
    /// Ceiling for a single request; never exceeds the time left in the round.
    pub request_timeout: Duration,
    pub pool: PoolSettings,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_DEADLINE,
            request_timeout: DEFAULT_DEADLINE,
            pool: PoolSettings::default(),
        }
    }
}

/// Runs probe rounds over a roster and assembles reports.
pub struct Scheduler {
    transport: Arc<dyn Transport>,
    secrets: Arc<dyn SecretResolver>,
    settings: RunSettings,
}

impl Scheduler {
    pub fn new(
        transport: Arc<dyn Transport>,
        secrets: Arc<dyn SecretResolver>,
        settings: RunSettings,
    ) -> Self {
        Self {
            transport,
            secrets,
            settings,
        }
    }

    /// Probe every application concurrently for one deadline window.
    pub async fn run(&self, roster: &[ApplicationDescriptor]) -> Report {
        self.run_until(roster, &CancellationToken::new()).await
    }

    /// Like [`Scheduler::run`], but cancelling `shutdown` ends the round early.
    /// Requests already in flight still finish and are counted.
    pub async fn run_until(
        &self,
        roster: &[ApplicationDescriptor],
        shutdown: &CancellationToken,
    ) -> Report {
        let last_updated = Utc::now();
        let deadline = Deadline::start_with_parent(shutdown, self.settings.deadline);

        tracing::info!(
            "Starting probe round for {} applications ({:?} deadline, {} workers each)",
            roster.len(),
            self.settings.deadline,
            self.settings.pool.workers
        );

        let ctx = ProbeContext {
            transport: self.transport.clone(),
            secrets: self.secrets.clone(),
            deadline: deadline.clone(),
            request_timeout: self.settings.request_timeout,
        };

        let mut tasks = Vec::with_capacity(roster.len());
        for app in roster {
            let app = Arc::new(app.clone());
            let handle =
                tokio::spawn(collect_results(app.clone(), self.settings.pool, ctx.clone()));
            tasks.push((app, handle));
        }

        // every aggregator is already running; join them in roster order
        let mut summaries = Vec::with_capacity(tasks.len());
        for (app, handle) in tasks {
            match handle.await {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    tracing::error!("Aggregation for {} failed: {}", app.name, e);
                    summaries.push(unreachable_summary(&app));
                }
            }
        }

        // Stop the deadline timer if every application finished early.
        deadline.cancel();

        Report::new(summaries, last_updated)
    }

    /// Run a round every `every` until `shutdown` is cancelled, passing each
    /// report to `on_report`. The first round starts immediately. A zero
    /// `every` runs rounds back to back.
    pub async fn run_every<F>(
        &self,
        roster: &[ApplicationDescriptor],
        every: Duration,
        shutdown: &CancellationToken,
        mut on_report: F,
    ) where
        F: FnMut(&Report),
    {
        let mut interval = tokio::time::interval(every.max(MIN_INTERVAL));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    let report = self.run_until(roster, shutdown).await;
                    if shutdown.is_cancelled() {
                        tracing::info!("Shutdown during probe round, discarding partial report");
                        break;
                    }
                    on_report(&report);
                }
            }
        }
    }
}

fn unreachable_summary(app: &ApplicationDescriptor) -> ApplicationSummary {
    ApplicationSummary {
        application: app.name.clone(),
        url: app.url.clone(),
        total_requests: 0,
        success_count: 0,
        error_count: 0,
        p90: 0.0,
        status: Status::Inactive,
    }
}
