//! Periodic discard of draw sessions past their choice deadline.
//!
//! `confirm_choice` already rejects late picks; the reaper makes sure
//! abandoned offers do not pile up in memory.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::engine::GachaEngine;

/// Run the sweep loop until `cancel` is triggered.
pub async fn run_session_reaper(
    engine: Arc<GachaEngine>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = interval.as_secs(), "Session reaper started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session reaper stopping");
                break;
            }
            _ = ticker.tick() => {
                let expired = engine.expire_overdue().await;
                if expired > 0 {
                    tracing::info!(expired, "Session reaper: discarded overdue sessions");
                } else {
                    tracing::trace!("Session reaper: nothing to discard");
                }
            }
        }
    }
}
