use std::sync::Arc;

use log::warn;
use tokio::sync::Mutex;

use crate::models::{ModelClass, Outcome, OutcomeSource, SessionState};

use super::client::Classifier;
use super::mock::synthetic_detection;

/// Resolves one detection attempt to an outcome, choosing between the remote
/// classifier and the synthetic fallback. Never fails: every attempt yields
/// an outcome for the caller to display or persist.
#[derive(Clone)]
pub struct Dispatcher {
    classifier: Arc<dyn Classifier>,
    state: Arc<Mutex<SessionState>>,
}

impl Dispatcher {
    pub fn new(classifier: Arc<dyn Classifier>, state: Arc<Mutex<SessionState>>) -> Self {
        Self { classifier, state }
    }

    pub async fn resolve(&self, jpeg: &[u8], class: ModelClass) -> Outcome {
        let mock_forced = { self.state.lock().await.mock_override };
        if mock_forced {
            return Outcome::from_raw(synthetic_detection(class), OutcomeSource::Synthetic);
        }

        match self.classifier.classify(jpeg, class).await {
            Ok(raw) => {
                self.state.lock().await.record_backend_success();
                Outcome::from_raw(raw, OutcomeSource::Backend)
            }
            Err(err) => {
                warn!("backend detection failed, falling back to demo result: {err}");
                self.state
                    .lock()
                    .await
                    .record_backend_failure(err.user_message());
                Outcome::from_raw(synthetic_detection(class), OutcomeSource::Synthetic)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::client::DetectError;
    use crate::inference::mock::LETTER_VOCABULARY;
    use crate::models::{Prediction, RawDetection};
    use async_trait::async_trait;

    struct FixedClassifier;

    #[async_trait]
    impl Classifier for FixedClassifier {
        async fn classify(
            &self,
            _jpeg: &[u8],
            _class: ModelClass,
        ) -> Result<RawDetection, DetectError> {
            Ok(RawDetection {
                prediction: "K".to_string(),
                confidence: 96.5,
                all_predictions: vec![Prediction {
                    label: "K".to_string(),
                    confidence: 96.5,
                }],
            })
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl Classifier for FailingClassifier {
        async fn classify(
            &self,
            _jpeg: &[u8],
            _class: ModelClass,
        ) -> Result<RawDetection, DetectError> {
            Err(DetectError::Unreachable("connection refused".to_string()))
        }
    }

    fn state() -> Arc<Mutex<SessionState>> {
        Arc::new(Mutex::new(SessionState::new()))
    }

    #[tokio::test]
    async fn backend_success_clears_sticky_flags() {
        let state = state();
        {
            let mut guard = state.lock().await;
            guard.record_backend_failure("old failure".to_string());
        }

        let dispatcher = Dispatcher::new(Arc::new(FixedClassifier), Arc::clone(&state));
        let outcome = dispatcher.resolve(&[0xff], ModelClass::Letters).await;

        assert_eq!(outcome.source, OutcomeSource::Backend);
        assert_eq!(outcome.prediction, "K");
        let guard = state.lock().await;
        assert!(!guard.auto_mock);
        assert!(guard.last_error.is_none());
    }

    #[tokio::test]
    async fn failure_falls_back_and_flags_session() {
        let state = state();
        let dispatcher = Dispatcher::new(Arc::new(FailingClassifier), Arc::clone(&state));
        let outcome = dispatcher.resolve(&[0xff], ModelClass::Letters).await;

        assert_eq!(outcome.source, OutcomeSource::Synthetic);
        assert!(LETTER_VOCABULARY.contains(&outcome.prediction.as_str()));
        assert!(outcome.confidence >= 75.0 && outcome.confidence <= 95.0);

        let guard = state.lock().await;
        assert!(guard.auto_mock);
        assert!(guard.last_error.as_deref().unwrap_or("").contains("reach"));
    }

    #[tokio::test]
    async fn manual_override_skips_the_backend() {
        let state = state();
        state.lock().await.set_mock_override(true);

        // A failing classifier proves the backend is never consulted: the
        // outcome is synthetic and no failure flags get set.
        let dispatcher = Dispatcher::new(Arc::new(FailingClassifier), Arc::clone(&state));
        let outcome = dispatcher.resolve(&[0xff], ModelClass::Words).await;

        assert_eq!(outcome.source, OutcomeSource::Synthetic);
        let guard = state.lock().await;
        assert!(!guard.auto_mock);
        assert!(guard.last_error.is_none());
    }

    #[tokio::test]
    async fn auto_mock_alone_still_tries_the_backend() {
        let state = state();
        state.lock().await.record_backend_failure("earlier".to_string());

        let dispatcher = Dispatcher::new(Arc::new(FixedClassifier), Arc::clone(&state));
        let outcome = dispatcher.resolve(&[0xff], ModelClass::Letters).await;

        assert_eq!(outcome.source, OutcomeSource::Backend);
        assert!(!state.lock().await.auto_mock);
    }
}
