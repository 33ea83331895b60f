use std::time::{Duration, Instant};

use log::*;
use shop_payment_engine::traits::LedgerManagement;
use tokio::task::JoinHandle;

use crate::server::Api;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(300);
// A worker that survived this long before dying gets a fresh backoff on restart.
const STABLE_RUN: Duration = Duration::from_secs(60);

/// Starts the supervised reconciliation sweeper. Do not await the returned JoinHandle, as it runs indefinitely.
///
/// The sweep loop runs on its own task, decoupled from request handling: every `interval` it asks the gateway
/// about pending sessions that have gone quiet, so abandoned checkouts converge to `expired` and payments whose
/// buyer never came back to poll still get delivered. If the loop dies, the supervisor restarts it with
/// exponential backoff; a crash here can never affect checkout or reconciliation requests.
pub fn start_reconcile_sweeper(api: Api, interval: Duration, stale_after: chrono::Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut backoff = INITIAL_BACKOFF;
        loop {
            let started = Instant::now();
            let worker = tokio::spawn(sweep_loop(api.clone(), interval, stale_after));
            match worker.await {
                Ok(()) => warn!("🕰️ Reconciliation sweeper stopped unexpectedly"),
                Err(e) => error!("🕰️ Reconciliation sweeper crashed: {e}"),
            }
            if started.elapsed() > STABLE_RUN {
                backoff = INITIAL_BACKOFF;
            }
            warn!("🕰️ Restarting reconciliation sweeper in {}s", backoff.as_secs());
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    })
}

async fn sweep_loop(api: Api, interval: Duration, stale_after: chrono::Duration) {
    let mut timer = tokio::time::interval(interval);
    info!("🕰️ Reconciliation sweeper started");
    loop {
        timer.tick().await;
        let stale = match api.db().fetch_stale_pending(stale_after).await {
            Ok(stale) => stale,
            Err(e) => {
                error!("🕰️ Could not fetch stale pending sessions: {e}");
                continue;
            },
        };
        if stale.is_empty() {
            continue;
        }
        info!("🕰️ Reconciling {} stale pending session(s)", stale.len());
        for transaction in stale {
            // Per-session failures are logged and skipped; the next sweep picks them up again.
            if let Err(e) = api.reconcile(&transaction.session_id).await {
                warn!("🕰️ Sweep reconciliation of [{}] failed: {e}", transaction.session_id);
            }
        }
    }
}
