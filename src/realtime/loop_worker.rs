use anyhow::{Context, Result};
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::models::{Outcome, PollingStatus};

use super::LoopContext;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

/// Cadence of real-time detection.
pub const DETECTION_INTERVAL_MS: u64 = 1500;

/// Drives repeated detections while polling is live. The first tick fires
/// immediately; ticks that land while a detection is still in flight are
/// skipped outright, never queued or coalesced into a burst.
pub async fn detection_loop(ctx: LoopContext, cancel_token: CancellationToken) {
    let mut ticker = tokio::time::interval(Duration::from_millis(DETECTION_INTERVAL_MS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !run_tick(&ctx).await {
                    break;
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("real-time detection loop shutting down");
                break;
            }
        }
    }
}

/// One tick. Returns `false` when the loop should exit on its own (camera
/// gone or polling no longer live).
async fn run_tick(ctx: &LoopContext) -> bool {
    {
        let mut state = ctx.state.lock().await;
        if !state.camera_active {
            // Camera deactivation implies polling must stop.
            log_info!("camera inactive, stopping real-time detection");
            state.polling_stopped();
            return false;
        }
        if state.polling != PollingStatus::Polling {
            return false;
        }
        if !state.begin_detection() {
            log_info!("skipping tick, detection already in flight");
            return true;
        }
    }

    let resolved = detect_once(ctx).await;

    let mut state = ctx.state.lock().await;
    state.finish_detection();
    match resolved {
        Ok(outcome) => {
            if !state.set_current_if_polling(outcome) {
                log_info!("discarding stale real-time result");
            }
        }
        Err(err) => {
            // Real-time failures stay silent in the display; the next tick
            // tries again.
            log_error!("real-time detection tick failed: {err:#}");
        }
    }
    true
}

async fn detect_once(ctx: &LoopContext) -> Result<Outcome> {
    let class = { ctx.state.lock().await.model_class };
    let frame = ctx
        .camera
        .snapshot()
        .await
        .context("failed to capture frame from camera")?;
    Ok(ctx.dispatcher.resolve(&frame.jpeg, class).await)
}
