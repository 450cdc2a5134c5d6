//! Herald service binary.
//!
//! Watches a simulated settlement's population and posts roster changes
//! to a chat webhook. The host simulation exports its world to a JSON file
//! that is re-read every tick, and may push lifecycle events as JSON lines
//! on stdin.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `herald-config.yaml` (or defaults)
//! 2. Initialize structured logging (tracing)
//! 3. Stay idle if the webhook is disabled or unconfigured
//! 4. Build the webhook sink and the host event bus
//! 5. Start stdin event intake and the urgent notifier
//! 6. Send the startup announcement
//! 7. Run the tick loop until Ctrl-C

mod error;
mod service;
mod source;
mod urgent;

use std::path::Path;

use herald_core::bus::EventBus;
use herald_core::config::HeraldConfig;
use herald_webhook::{Sink, WebhookSink};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::service::Herald;
use crate::source::{WorldSource, spawn_stdin_events};
use crate::urgent::spawn_urgent_notifier;

const CONFIG_PATH: &str = "herald-config.yaml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    init_logging(&config);

    info!(
        tick_interval_secs = config.schedule.tick_interval_secs,
        full_updates = config.schedule.full_updates,
        max_records = config.report.max_records,
        world_path = %config.source.world_path.display(),
        "Configuration loaded"
    );

    if let Some(reason) = config.inactive_reason() {
        warn!(%reason, "webhook notifications inactive, exiting");
        return Ok(());
    }

    let sink = Sink::Webhook(
        WebhookSink::new(&config.webhook, config.limits.payload_hard_cap).map_err(EngineError::from)?,
    );
    let bus = EventBus::new();

    let urgent = spawn_urgent_notifier(
        bus.subscribe(),
        sink.clone(),
        config.limits,
        config.webhook.username.clone(),
    );
    let intake = config.source.stdin_events.then(|| spawn_stdin_events(bus.clone()));

    let herald = Herald::new(&config, sink);
    herald.announce(&config, chrono::Utc::now());

    let source = WorldSource::File(config.source.world_path.clone());
    herald
        .run(source, bus.subscribe(), async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await;

    if let Some(intake) = intake {
        intake.abort();
    }
    urgent.abort();
    info!("herald-engine stopped");
    Ok(())
}

/// Load configuration from `herald-config.yaml`, falling back to defaults
/// when the file does not exist. Environment overrides apply either way.
fn load_config() -> Result<HeraldConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(HeraldConfig::from_file(config_path)?)
    } else {
        let mut config = HeraldConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}

fn init_logging(config: &HeraldConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
