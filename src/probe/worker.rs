//! Probe worker loop.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::secrets::{resolve_source, SecretResolver};
use super::{ProbeOutcome, ProbeRequest, Transport, USER_AGENT};
use crate::roster::{ApplicationDescriptor, Verb};

/// Stand-in for windows too long to represent as an instant (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Shared stop signal for one run.
///
/// Expires when its token is cancelled or its instant passes, whichever
/// comes first.
#[derive(Debug, Clone)]
pub struct Deadline {
    token: CancellationToken,
    at: Instant,
}

impl Deadline {
    /// Start a deadline `window` from now. Must be called inside a runtime.
    pub fn start(window: Duration) -> Self {
        Self::start_with_parent(&CancellationToken::new(), window)
    }

    /// Like [`Deadline::start`], but also expires when `parent` is cancelled.
    pub fn start_with_parent(parent: &CancellationToken, window: Duration) -> Self {
        let token = parent.child_token();
        let now = Instant::now();
        let at = now
            .checked_add(window)
            .unwrap_or_else(|| now + FAR_FUTURE);

        let timer = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep_until(at) => timer.cancel(),
                _ = timer.cancelled() => {}
            }
        });

        Self { token, at }
    }

    pub fn is_expired(&self) -> bool {
        self.token.is_cancelled() || Instant::now() >= self.at
    }

    pub fn remaining(&self) -> Duration {
        if self.token.is_cancelled() {
            return Duration::ZERO;
        }
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait until the deadline expires.
    pub async fn expired(&self) {
        self.token.cancelled().await
    }
}

/// Everything a worker needs besides its application.
#[derive(Clone)]
pub struct ProbeContext {
    pub transport: Arc<dyn Transport>,
    pub secrets: Arc<dyn SecretResolver>,
    pub deadline: Deadline,
    /// Upper bound for a single request, further capped by the deadline.
    pub request_timeout: Duration,
}

/// A single worker issuing requests against one application.
pub struct Prober {
    id: usize,
    app: Arc<ApplicationDescriptor>,
    ctx: ProbeContext,
}

impl Prober {
    pub fn new(id: usize, app: Arc<ApplicationDescriptor>, ctx: ProbeContext) -> Self {
        Self { id, app, ctx }
    }

    /// Issue requests back to back until the deadline expires, sending one
    /// outcome per request that received a response.
    ///
    /// Transport failures are logged and dropped without any backoff.
    pub async fn run(self, tx: mpsc::Sender<ProbeOutcome>) {
        let mut attempts: u64 = 0;

        loop {
            if self.ctx.deadline.is_expired() {
                break;
            }

            let timeout = self.ctx.request_timeout.min(self.ctx.deadline.remaining());
            let request = self.build_request(timeout);
            attempts += 1;

            let start = Instant::now();
            let result = tokio::time::timeout(timeout, self.ctx.transport.execute(request)).await;
            let duration = start.elapsed();

            match result {
                Ok(Ok(response)) => {
                    let outcome = ProbeOutcome {
                        duration,
                        status: response.status,
                    };
                    if tx.send(outcome).await.is_err() {
                        tracing::debug!(
                            "Prober {} for {}: outcome receiver closed",
                            self.id,
                            self.app.name
                        );
                        break;
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        url = %self.app.url,
                        "Request to {} failed: {}",
                        self.app.name,
                        e
                    );
                    tokio::task::yield_now().await;
                }
                Err(_) if self.ctx.deadline.is_expired() => {
                    // the round ended mid-request
                    tracing::debug!(
                        url = %self.app.url,
                        "Request to {} cut off by the deadline after {:?}",
                        self.app.name,
                        duration
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        url = %self.app.url,
                        "Request to {} timed out after {:?}",
                        self.app.name,
                        timeout
                    );
                    tokio::task::yield_now().await;
                }
            }
        }

        tracing::debug!(
            "Prober {} for {} stopped after {} attempts",
            self.id,
            self.app.name,
            attempts
        );
    }

    fn build_request(&self, timeout: Duration) -> ProbeRequest {
        let mut headers = vec![("User-Agent".to_string(), USER_AGENT.to_string())];

        if let Some(auth) = &self.app.auth {
            match resolve_source(&auth.value, self.ctx.secrets.as_ref()) {
                Some(value) => headers.push((auth.name.clone(), value)),
                None => tracing::warn!(
                    "Auth value for {} header of {} is not set, sending without it",
                    auth.name,
                    self.app.name
                ),
            }
        }

        let body = match self.app.verb {
            Verb::Post => self.app.body.clone(),
            Verb::Get => None,
        };

        ProbeRequest {
            verb: self.app.verb,
            url: self.app.url.clone(),
            headers,
            body,
            timeout,
        }
    }
}
