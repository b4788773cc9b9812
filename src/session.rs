use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::Mutex;

use crate::capture::{load_image_file, CameraManager, CameraSource, UploadedImage};
use crate::config::BackendConfig;
use crate::history::HistoryLedger;
use crate::inference::{BackendClient, Classifier, Dispatcher};
use crate::models::{
    BackendStatus, DetectionMode, DetectionResult, ModelClass, Outcome, SessionState,
};
use crate::realtime::{LoopContext, RealtimeController};

/// The detection session controller: owns the capture source, the dispatcher,
/// the real-time polling loop and the history ledger, and exposes the session
/// transitions as explicit operations.
pub struct DetectionSession {
    state: Arc<Mutex<SessionState>>,
    camera: CameraManager,
    dispatcher: Dispatcher,
    history: HistoryLedger,
    realtime: RealtimeController,
    probe: BackendClient,
    upload: Option<UploadedImage>,
}

impl DetectionSession {
    pub fn new(config: &BackendConfig, source: Box<dyn CameraSource>) -> Self {
        let client = BackendClient::new(config);
        Self::build(Arc::new(client.clone()), client, source)
    }

    /// Builds a session over a custom classifier; the health probe still
    /// points at the configured backend.
    pub fn with_classifier(
        config: &BackendConfig,
        classifier: Arc<dyn Classifier>,
        source: Box<dyn CameraSource>,
    ) -> Self {
        Self::build(classifier, BackendClient::new(config), source)
    }

    fn build(
        classifier: Arc<dyn Classifier>,
        probe: BackendClient,
        source: Box<dyn CameraSource>,
    ) -> Self {
        let state = Arc::new(Mutex::new(SessionState::new()));
        Self {
            dispatcher: Dispatcher::new(classifier, Arc::clone(&state)),
            state,
            camera: CameraManager::new(source),
            history: HistoryLedger::new(),
            realtime: RealtimeController::new(),
            probe,
            upload: None,
        }
    }

    /// Requests the camera. On failure the session state is unchanged and
    /// nothing retries automatically.
    pub async fn activate_camera(&mut self) -> Result<()> {
        self.camera
            .activate()
            .await
            .context("could not access the camera; make sure permission is granted")?;
        self.state.lock().await.camera_started();
        Ok(())
    }

    /// Stops real-time detection (if running) and releases the camera.
    /// Idempotent.
    pub async fn deactivate_camera(&mut self) -> Result<()> {
        // Flip polling off before joining the loop so an in-flight result is
        // discarded rather than displayed.
        self.state.lock().await.polling_stopped();
        self.realtime.stop().await?;
        self.camera.deactivate();
        self.state.lock().await.camera_stopped();
        Ok(())
    }

    /// Switches between camera and upload capture. Entering upload mode with
    /// a live camera tears the camera (and any polling) down as a side
    /// effect; the two lifecycles are coupled.
    pub async fn set_mode(&mut self, mode: DetectionMode) -> Result<()> {
        let teardown = self.state.lock().await.set_mode(mode);
        if teardown {
            self.deactivate_camera().await?;
        }
        Ok(())
    }

    pub async fn set_model_class(&mut self, class: ModelClass) {
        self.state.lock().await.set_model_class(class);
    }

    pub async fn set_mock_override(&mut self, enabled: bool) {
        self.state.lock().await.set_mock_override(enabled);
    }

    /// Loads a user-supplied image file; non-image files are rejected without
    /// touching the current upload.
    pub fn load_upload(&mut self, path: &Path) -> Result<()> {
        let image = load_image_file(path)?;
        self.upload = Some(image);
        Ok(())
    }

    pub fn load_upload_bytes(&mut self, bytes: Vec<u8>) -> Result<()> {
        self.upload = Some(UploadedImage::from_bytes(bytes)?);
        Ok(())
    }

    pub fn clear_upload(&mut self) {
        self.upload = None;
    }

    /// One-shot detection from the loaded upload image; yields a ledger
    /// entry (backend or synthetic). Refused loudly, never silently skipped,
    /// while another detection is in flight.
    pub async fn detect_from_upload(&mut self) -> Result<DetectionResult> {
        let Some(upload) = self.upload.clone() else {
            bail!("no image loaded for detection");
        };

        let class = {
            let mut state = self.state.lock().await;
            if state.mode != DetectionMode::Upload {
                bail!("upload detection requires upload mode");
            }
            if !state.begin_detection() {
                bail!("detection already in progress");
            }
            state.clear_last_error();
            state.model_class
        };

        let outcome = self.dispatcher.resolve(&upload.bytes, class).await;

        let mut state = self.state.lock().await;
        state.finish_detection();
        state.set_current(outcome.clone());
        drop(state);

        Ok(self.history.record(&outcome, upload.bytes, class))
    }

    /// One-shot capture-and-detect from the live camera. The persisted frame
    /// is the mirrored snapshot the user saw. Refused loudly while another
    /// detection (including a real-time tick) is in flight.
    pub async fn detect_from_capture(&mut self) -> Result<DetectionResult> {
        let class = {
            let mut state = self.state.lock().await;
            if !state.camera_active {
                bail!("camera is not active");
            }
            if !state.begin_detection() {
                bail!("detection already in progress");
            }
            state.clear_last_error();
            state.model_class
        };

        let frame = match self.camera.snapshot().await {
            Ok(frame) => frame,
            Err(err) => {
                let mut state = self.state.lock().await;
                state.finish_detection();
                state.set_last_error("Failed to capture an image from the camera.".to_string());
                return Err(anyhow::Error::from(err).context("failed to capture frame"));
            }
        };

        let outcome = self.dispatcher.resolve(&frame.jpeg, class).await;

        let mut state = self.state.lock().await;
        state.finish_detection();
        state.set_current(outcome.clone());
        drop(state);

        Ok(self.history.record(&outcome, frame.jpeg, class))
    }

    /// Starts real-time polling. Valid only while the camera is active.
    pub async fn start_realtime(&mut self) -> Result<()> {
        if self.realtime.is_active() {
            bail!("real-time detection already active");
        }
        {
            let mut state = self.state.lock().await;
            if !state.polling_started() {
                bail!("camera must be active before starting real-time detection");
            }
        }

        let ctx = LoopContext {
            state: Arc::clone(&self.state),
            camera: self.camera.clone(),
            dispatcher: self.dispatcher.clone(),
        };

        if let Err(err) = self.realtime.start(ctx) {
            self.state.lock().await.polling_stopped();
            return Err(err);
        }
        Ok(())
    }

    /// Stops real-time polling and clears the ephemeral display value. A
    /// detection already in flight finishes but its result is discarded.
    pub async fn stop_realtime(&mut self) -> Result<()> {
        self.state.lock().await.polling_stopped();
        self.realtime.stop().await
    }

    /// Explicitly persists the live real-time result: the current outcome
    /// plus a fresh mirrored snapshot. Real-time ticks themselves never write
    /// to the ledger.
    pub async fn save_current_detection(&mut self) -> Result<DetectionResult> {
        let (outcome, class) = {
            let state = self.state.lock().await;
            let Some(outcome) = state.current.clone() else {
                bail!("no current detection to save");
            };
            (outcome, state.model_class)
        };

        let frame = self
            .camera
            .snapshot()
            .await
            .context("failed to capture frame for saving")?;

        Ok(self.history.record(&outcome, frame.jpeg, class))
    }

    pub async fn current_detection(&self) -> Option<Outcome> {
        self.state.lock().await.current.clone()
    }

    pub async fn state_snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub fn history(&self) -> Vec<DetectionResult> {
        self.history.entries()
    }

    pub fn clear_history(&self) {
        self.history.clear();
    }

    /// Probes backend liveness and stores the advisory status. Detection
    /// calls are attempted regardless of the result.
    pub async fn refresh_backend_status(&self) -> BackendStatus {
        let status = self.probe.health().await;
        self.state.lock().await.set_backend_status(status);
        status
    }

    /// Session teardown: stops polling and releases the camera.
    pub async fn shutdown(&mut self) -> Result<()> {
        info!("shutting down detection session");
        self.deactivate_camera().await
    }
}
