use std::time::Duration;

use anyhow::Result;
use log::info;

use teman_isyarat::{BackendConfig, DetectionSession, TestPatternCamera};

/// Demo run of the detection session over the synthetic camera: a short
/// real-time window, an explicit save, then a one-shot capture. Falls back to
/// demo results automatically when no backend is reachable.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = BackendConfig::from_env();
    info!("classifier backend: {}", config.base_url);

    let mut session = DetectionSession::new(&config, Box::new(TestPatternCamera::new()));

    let status = session.refresh_backend_status().await;
    info!("backend status: {status:?}");

    session.activate_camera().await?;
    session.start_realtime().await?;

    tokio::time::sleep(Duration::from_secs(5)).await;

    if let Some(current) = session.current_detection().await {
        info!(
            "live detection: {}{}",
            current.display_value(),
            if current.is_synthetic() { " [demo]" } else { "" }
        );
        session.save_current_detection().await?;
    }

    session.stop_realtime().await?;

    let result = session.detect_from_capture().await?;
    info!(
        "one-shot detection: {} ({:.0}%)",
        result.label,
        result.confidence * 100.0
    );

    info!("history ({} entries, newest first):", session.history().len());
    for entry in session.history() {
        info!(
            "  {}: {} ({:.0}%) at {} [{:?}]",
            entry.id,
            entry.label,
            entry.confidence * 100.0,
            entry.timestamp,
            entry.source
        );
    }

    session.shutdown().await
}
