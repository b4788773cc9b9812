use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which classifier model a detection is addressed to. Selects the backend
/// endpoint, the label prefix shown to users, and the fallback vocabulary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ModelClass {
    Letters,
    Words,
}

impl Default for ModelClass {
    fn default() -> Self {
        ModelClass::Letters
    }
}

impl ModelClass {
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            ModelClass::Letters => "/api/detect/letters",
            ModelClass::Words => "/api/detect/words",
        }
    }

    pub fn label_prefix(&self) -> &'static str {
        match self {
            ModelClass::Letters => "Letter",
            ModelClass::Words => "Word",
        }
    }
}

/// Where an outcome came from. Synthetic results must stay distinguishable
/// from real backend results all the way to the display layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum OutcomeSource {
    Backend,
    Synthetic,
}

/// One candidate prediction. Confidence scale depends on context: raw
/// (percent) inside `RawDetection`/`Outcome`, normalized to `[0,1]` inside
/// `DetectionResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}

/// Classifier output before any normalization, confidences on the 0-100
/// percent scale. Produced by the backend client and by the fallback
/// generator alike.
#[derive(Debug, Clone)]
pub struct RawDetection {
    pub prediction: String,
    pub confidence: f64,
    pub all_predictions: Vec<Prediction>,
}

/// The result of one detection attempt, prior to persistence. Confidence is
/// still on the scale the classifier produced it (percent).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub prediction: String,
    pub confidence: f64,
    pub alternates: Vec<Prediction>,
    pub source: OutcomeSource,
}

impl Outcome {
    pub fn from_raw(raw: RawDetection, source: OutcomeSource) -> Self {
        Self {
            prediction: raw.prediction,
            confidence: raw.confidence,
            alternates: raw.all_predictions,
            source,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.source == OutcomeSource::Synthetic
    }

    /// Short form for display, e.g. `A (87%)`.
    pub fn display_value(&self) -> String {
        format!("{} ({:.0}%)", self.prediction, self.confidence)
    }
}

/// Scale heuristic for classifier confidences: anything above 1 is taken to
/// be a percentage and divided by 100 exactly once; values already in `[0,1]`
/// pass through. Ambiguous below 1% true confidence, which is accepted.
pub fn normalize_confidence(confidence: f64) -> f64 {
    if confidence > 1.0 {
        confidence / 100.0
    } else {
        confidence
    }
}

/// A confirmed detection as kept in the history ledger. Immutable once built;
/// the snapshot is embedded as encoded JPEG bytes so entries stay
/// self-contained.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub id: Uuid,
    pub label: String,
    /// Normalized to `[0,1]`.
    pub confidence: f64,
    /// Locale-formatted capture time, informational only.
    pub timestamp: String,
    pub image_data: Vec<u8>,
    pub all_predictions: Option<Vec<Prediction>>,
    pub source: OutcomeSource,
}

impl DetectionResult {
    pub fn from_outcome(outcome: &Outcome, image_data: Vec<u8>, class: ModelClass) -> Self {
        let all_predictions = if outcome.alternates.is_empty() {
            None
        } else {
            Some(
                outcome
                    .alternates
                    .iter()
                    .map(|candidate| Prediction {
                        label: candidate.label.clone(),
                        confidence: normalize_confidence(candidate.confidence),
                    })
                    .collect(),
            )
        };

        Self {
            id: Uuid::new_v4(),
            label: format!("{} {}", class.label_prefix(), outcome.prediction),
            confidence: normalize_confidence(outcome.confidence),
            timestamp: Local::now().format("%d/%m/%Y %H.%M.%S").to_string(),
            image_data,
            all_predictions,
            source: outcome.source,
        }
    }
}
