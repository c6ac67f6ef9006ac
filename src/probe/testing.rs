//! Test doubles for probe transports.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use super::{ProbeError, ProbeRequest, ProbeResponse, Transport};
use crate::roster::{ApplicationDescriptor, Verb};
use crate::status::{Thresholds, Watermarks};

/// One scripted transport reply.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Respond { delay: Duration, status: u16 },
    Fail { delay: Duration },
}

impl Step {
    pub fn respond(millis: u64, status: u16) -> Self {
        Step::Respond {
            delay: Duration::from_millis(millis),
            status,
        }
    }

    pub fn fail(millis: u64) -> Self {
        Step::Fail {
            delay: Duration::from_millis(millis),
        }
    }
}

/// Transport that replays a fixed script shared by every caller, then
/// hangs like an unresponsive server.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<ProbeRequest>>,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ProbeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ProbeRequest) -> Result<ProbeResponse, ProbeError> {
        self.requests.lock().unwrap().push(request);
        let step = self.script.lock().unwrap().pop_front();

        match step {
            Some(Step::Respond { delay, status }) => {
                tokio::time::sleep(delay).await;
                Ok(ProbeResponse { status })
            }
            Some(Step::Fail { delay }) => {
                tokio::time::sleep(delay).await;
                Err(ProbeError::Network("connection refused".to_string()))
            }
            None => std::future::pending().await,
        }
    }
}

/// A GET descriptor with generous watermarks.
pub fn descriptor(name: &str) -> ApplicationDescriptor {
    ApplicationDescriptor {
        name: name.to_string(),
        url: format!("http://{}.internal/healthcheck", name),
        verb: Verb::Get,
        body: None,
        auth: None,
        thresholds: Thresholds {
            error_percentage: Watermarks::new(5.0, 20.0, 50.0),
            p90_seconds: Watermarks::new(1.0, 2.0, 5.0),
        },
    }
}
