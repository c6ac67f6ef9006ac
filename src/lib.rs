//! Status Checks - Application Health Monitoring
//!
//! Probes a roster of HTTP applications under a shared deadline and
//! reports p90 latency, error counts and a health status for each.

pub mod config;
pub mod probe;
pub mod publish;
pub mod report;
pub mod roster;
pub mod scheduler;
pub mod stats;
pub mod status;
