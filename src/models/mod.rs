mod detection;
mod session;

pub use detection::{
    normalize_confidence, DetectionResult, ModelClass, Outcome, OutcomeSource, Prediction,
    RawDetection,
};
pub use session::{BackendStatus, DetectionMode, PollingStatus, SessionState};
