//! Status Checks - Application Health Monitoring
//!
//! Runs one probe round (or one per interval) and publishes the report.

use status_checks::config::{LogFormat, RunConfig};
use status_checks::probe::secrets::EnvResolver;
use status_checks::probe::HttpTransport;
use status_checks::publish::publish;
use status_checks::roster::load_roster;
use status_checks::scheduler::Scheduler;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(format: LogFormat) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("status_checks=info".parse()?);

    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (cfg, warnings) = RunConfig::load();
    init_logging(cfg.log_format)?;
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    tracing::info!("Loading roster from {}", cfg.roster_path.display());

    let roster = load_roster(&cfg.roster_path)?;
    tracing::info!("Loaded {} applications", roster.len());

    let settings = cfg.run_settings();
    let transport = Arc::new(HttpTransport::new(settings.request_timeout)?);
    let scheduler = Scheduler::new(transport, Arc::new(EnvResolver), settings);

    let Some(every) = cfg.interval else {
        let report = scheduler.run(&roster).await;
        publish(&report, &cfg.output)?;
        return Ok(());
    };

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl-C, stopping after in-flight requests");
                signal.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    tracing::info!("Running a probe round every {:?}", every);
    scheduler
        .run_every(&roster, every, &shutdown, |report| {
            if let Err(e) = publish(report, &cfg.output) {
                tracing::error!("Failed to publish report: {}", e);
            }
        })
        .await;

    Ok(())
}
