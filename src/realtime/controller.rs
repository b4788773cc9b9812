use anyhow::{bail, Context, Result};
use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::loop_worker::detection_loop;
use super::LoopContext;

/// Owns the real-time detection task: at most one loop per session, started
/// and stopped explicitly, cancelled on teardown so no tick can run against
/// a discarded capture source.
pub struct RealtimeController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl RealtimeController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn start(&mut self, ctx: LoopContext) -> Result<()> {
        if self.handle.is_some() {
            bail!("real-time detection already active");
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let handle = tokio::spawn(detection_loop(ctx, token_clone));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        info!("real-time detection started");
        Ok(())
    }

    /// Cancels the loop and waits for it to wind down. A detection already in
    /// flight is allowed to finish; its result is discarded by the loop once
    /// polling is no longer live.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("real-time detection task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl Default for RealtimeController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RealtimeController {
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }
}
