//! Run loop and shutdown signals
//!
//! The loop is single-threaded: one tick at a time, then a wait whose length
//! the tick decided. A [`CancellationToken`] ends it. The token is checked
//! before each tick and raced against every wait, so a signal arriving
//! during a sleep or cooldown ends the run without another tick. An
//! in-flight send is never interrupted.

use crate::orchestrator::engine::{Orchestrator, RunStats};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Tick until cancelled (or until `max_ticks`), then release the channel
pub async fn run_loop(
    orchestrator: &mut Orchestrator,
    token: CancellationToken,
    max_ticks: Option<u64>,
) -> RunStats {
    info!(max_ticks = ?max_ticks, "Generator started");

    let mut ticks = 0u64;
    loop {
        if token.is_cancelled() {
            break;
        }
        if max_ticks.is_some_and(|max| ticks >= max) {
            info!(ticks, "Tick limit reached");
            break;
        }

        let delay = orchestrator.tick().await;
        ticks += 1;

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    orchestrator.shutdown();

    let stats = orchestrator.stats().clone();
    info!(
        ticks = stats.ticks,
        delivered = stats.delivered,
        rejected = stats.rejected,
        failures = stats.failures(),
        fraud_events = stats.fraud_events,
        "Generator stopped"
    );
    stats
}

/// Cancel `token` on SIGINT or SIGTERM
pub fn spawn_signal_listener(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Shutdown signal received");
        token.cancel();
    })
}

/// Resolve when `signal` fires
///
/// A listener that cannot be installed stays pending forever, so a
/// registration failure is never mistaken for a shutdown request.
async fn delivered<F>(signal: F, name: &str)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!("Cannot listen for {}: {}", name, e);
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let terminate = async {
        let mut stream = signal(SignalKind::terminate())?;
        match stream.recv().await {
            Some(()) => Ok::<(), std::io::Error>(()),
            None => Err(std::io::Error::other("SIGTERM stream closed")),
        }
    };

    tokio::select! {
        _ = delivered(tokio::signal::ctrl_c(), "Ctrl-C") => {}
        _ = delivered(terminate, "SIGTERM") => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    delivered(tokio::signal::ctrl_c(), "Ctrl-C").await;
}
