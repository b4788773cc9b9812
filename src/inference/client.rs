use async_trait::async_trait;
use log::info;
use reqwest::multipart;
use serde::Deserialize;
use thiserror::Error;

use crate::config::BackendConfig;
use crate::models::{BackendStatus, ModelClass, Prediction, RawDetection};

/// Transport-level failure classes. None of these escape the dispatcher;
/// they are normalized to "no result, fall back".
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("backend returned HTTP {0}")]
    Status(u16),

    #[error("malformed backend response: {0}")]
    Malformed(String),
}

impl DetectError {
    /// Human-readable transient error for the session display.
    pub fn user_message(&self) -> String {
        match self {
            DetectError::Unreachable(_) => {
                "Cannot reach the detection backend. Check that the server is running.".to_string()
            }
            DetectError::Status(code) => {
                format!("The detection backend reported an error (HTTP {code}).")
            }
            DetectError::Malformed(_) => {
                "The detection backend sent an unexpected response.".to_string()
            }
        }
    }
}

/// Seam between the session and the remote model, so tests can substitute
/// the network with a stub.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, jpeg: &[u8], class: ModelClass) -> Result<RawDetection, DetectError>;
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    letter: String,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct WireDetection {
    prediction: String,
    confidence: f64,
    #[serde(default)]
    all_predictions: Vec<WireCandidate>,
}

impl From<WireDetection> for RawDetection {
    fn from(wire: WireDetection) -> Self {
        RawDetection {
            prediction: wire.prediction,
            confidence: wire.confidence,
            all_predictions: wire
                .all_predictions
                .into_iter()
                .map(|candidate| Prediction {
                    label: candidate.letter,
                    confidence: candidate.confidence,
                })
                .collect(),
        }
    }
}

/// HTTP client for the remote classifier. Sends the frame as a multipart
/// upload; never attaches credentials.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
        }
    }

    /// Advisory liveness probe. Only feeds the status indicator; detection
    /// calls are attempted regardless of what this returns.
    pub async fn health(&self) -> BackendStatus {
        let url = format!("{}/health", self.base_url);
        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => BackendStatus::Online,
            Ok(_) | Err(_) => BackendStatus::Offline,
        }
    }
}

#[async_trait]
impl Classifier for BackendClient {
    async fn classify(&self, jpeg: &[u8], class: ModelClass) -> Result<RawDetection, DetectError> {
        let part = multipart::Part::bytes(jpeg.to_vec())
            .file_name("capture.jpg")
            .mime_str("image/jpeg")
            .map_err(|err| DetectError::Unreachable(err.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let url = format!("{}{}", self.base_url, class.endpoint_path());
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| DetectError::Unreachable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DetectError::Status(status.as_u16()));
        }

        let wire: WireDetection = response
            .json()
            .await
            .map_err(|err| DetectError::Malformed(err.to_string()))?;

        info!(
            "backend detection: {} ({:.1}%)",
            wire.prediction, wire.confidence
        );
        Ok(wire.into())
    }
}
