use serde::{Deserialize, Serialize};

use super::{ModelClass, Outcome};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DetectionMode {
    Camera,
    Upload,
}

impl Default for DetectionMode {
    fn default() -> Self {
        DetectionMode::Camera
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PollingStatus {
    Idle,
    Polling,
}

impl Default for PollingStatus {
    fn default() -> Self {
        PollingStatus::Idle
    }
}

/// Advisory backend liveness as last observed by the health probe. Never
/// gates whether a detection call is attempted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BackendStatus {
    Unknown,
    Online,
    Offline,
}

impl Default for BackendStatus {
    fn default() -> Self {
        BackendStatus::Unknown
    }
}

/// All transient per-session flags in one place, mutated only through the
/// named transitions below so invariants like "polling implies camera-active"
/// live in a single spot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub mode: DetectionMode,
    pub model_class: ModelClass,
    pub camera_active: bool,
    pub polling: PollingStatus,
    /// At-most-one detection in flight per session.
    pub detecting: bool,
    pub last_error: Option<String>,
    /// User-set override forcing every detection onto the fallback generator.
    pub mock_override: bool,
    /// Set after any observed backend failure; informational only, each call
    /// still tries the real backend unless `mock_override` is set.
    pub auto_mock: bool,
    pub backend: BackendStatus,
    /// Ephemeral display value; never written to the history ledger here.
    pub current: Option<Outcome>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            mode: DetectionMode::default(),
            model_class: ModelClass::default(),
            camera_active: false,
            polling: PollingStatus::Idle,
            detecting: false,
            last_error: None,
            mock_override: false,
            auto_mock: false,
            backend: BackendStatus::Unknown,
            current: None,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-set for the in-flight flag; at most one detection runs per
    /// session. Real-time ticks treat `false` as "skip this tick entirely";
    /// one-shot actions surface it as an explicit refusal instead.
    pub fn begin_detection(&mut self) -> bool {
        if self.detecting {
            false
        } else {
            self.detecting = true;
            true
        }
    }

    pub fn finish_detection(&mut self) {
        self.detecting = false;
    }

    pub fn camera_started(&mut self) {
        self.camera_active = true;
    }

    /// Camera going inactive implies polling stops.
    pub fn camera_stopped(&mut self) {
        self.camera_active = false;
        self.polling_stopped();
    }

    /// Valid only while the camera is active; returns `false` without a state
    /// change otherwise.
    pub fn polling_started(&mut self) -> bool {
        if !self.camera_active {
            return false;
        }
        self.polling = PollingStatus::Polling;
        self.current = None;
        self.last_error = None;
        true
    }

    pub fn polling_stopped(&mut self) {
        self.polling = PollingStatus::Idle;
        self.current = None;
    }

    /// Switches the capture mode. Returns `true` when the caller must tear
    /// down the camera (and with it any polling): entering upload mode while
    /// the camera is live.
    #[must_use]
    pub fn set_mode(&mut self, mode: DetectionMode) -> bool {
        self.mode = mode;
        mode == DetectionMode::Upload && self.camera_active
    }

    /// Changing the model invalidates the ephemeral display value.
    pub fn set_model_class(&mut self, class: ModelClass) {
        self.model_class = class;
        self.current = None;
    }

    pub fn record_backend_failure(&mut self, message: String) {
        self.last_error = Some(message);
        self.auto_mock = true;
    }

    pub fn record_backend_success(&mut self) {
        self.last_error = None;
        self.auto_mock = false;
    }

    pub fn clear_last_error(&mut self) {
        self.last_error = None;
    }

    /// Transient errors outside the backend path (capture failures and the
    /// like); does not touch the auto-mock flag.
    pub fn set_last_error(&mut self, message: String) {
        self.last_error = Some(message);
    }

    pub fn set_mock_override(&mut self, enabled: bool) {
        self.mock_override = enabled;
    }

    pub fn set_backend_status(&mut self, status: BackendStatus) {
        self.backend = status;
    }

    pub fn set_current(&mut self, outcome: Outcome) {
        self.current = Some(outcome);
    }

    /// Writes the display value only while polling is still live; a result
    /// arriving after `polling_stopped` is stale and gets discarded.
    pub fn set_current_if_polling(&mut self, outcome: Outcome) -> bool {
        if self.polling == PollingStatus::Polling {
            self.current = Some(outcome);
            true
        } else {
            false
        }
    }
}
