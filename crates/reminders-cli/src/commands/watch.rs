use std::sync::Arc;

use reminders_core::error::Result;
use reminders_core::{Clock, Config, Event, SystemClock, TickScheduler, TokioScheduler};
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Run the tick scheduler until Ctrl-C, printing each event as a JSON line.
pub async fn run(config: Config) -> Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut registry = super::open_registry(&config, Arc::clone(&clock))?;
    registry.subscribe(|event: &Event| match serde_json::to_string(event) {
        Ok(json) => println!("{json}"),
        Err(e) => error!(error = %e, "failed to render event"),
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = TokioScheduler::new(clock, shutdown_rx);
    let cadence = config.scheduler.cadence();
    let handle = TickScheduler::new(registry.into_shared()).start(&scheduler, cadence);
    info!(?cadence, "watching reminders, press Ctrl-C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl-C");
    }
    info!("shutting down");
    let _ = shutdown_tx.send(true);
    if let Err(e) = handle.await {
        warn!(error = %e, "scheduler task ended abnormally");
    }
    Ok(())
}
