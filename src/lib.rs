pub mod capture;
pub mod config;
pub mod history;
pub mod inference;
pub mod models;
pub mod realtime;
pub mod session;
pub mod utils;

pub use capture::{CameraSource, CaptureError, TestPatternCamera};
pub use config::BackendConfig;
pub use history::{HistoryLedger, HISTORY_CAPACITY};
pub use inference::{BackendClient, Classifier, DetectError, Dispatcher};
pub use models::{
    BackendStatus, DetectionMode, DetectionResult, ModelClass, Outcome, OutcomeSource,
    PollingStatus, SessionState,
};
pub use realtime::DETECTION_INTERVAL_MS;
pub use session::DetectionSession;
