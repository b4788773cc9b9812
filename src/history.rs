use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use log::info;

use crate::models::{DetectionResult, ModelClass, Outcome};

/// Maximum number of confirmed detections kept per session.
pub const HISTORY_CAPACITY: usize = 10;

/// Bounded, newest-first record of confirmed detections. Entries are
/// immutable once recorded; the only removals are a full clear or eviction
/// of the oldest entry when the capacity is exceeded.
#[derive(Clone)]
pub struct HistoryLedger {
    inner: Arc<Mutex<VecDeque<DetectionResult>>>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(HISTORY_CAPACITY + 1))),
        }
    }

    /// Builds a ledger entry from a confirmed outcome plus the frame that
    /// produced it, prepends it, and evicts the oldest entry beyond capacity.
    pub fn record(
        &self,
        outcome: &Outcome,
        image_data: Vec<u8>,
        class: ModelClass,
    ) -> DetectionResult {
        let result = DetectionResult::from_outcome(outcome, image_data, class);
        let mut entries = self.lock();
        entries.push_front(result.clone());
        if entries.len() > HISTORY_CAPACITY {
            entries.truncate(HISTORY_CAPACITY);
        }
        info!(
            "recorded detection {} ({} entries)",
            result.label,
            entries.len()
        );
        result
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Entries newest first.
    pub fn entries(&self) -> Vec<DetectionResult> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<DetectionResult>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OutcomeSource;

    fn outcome(prediction: &str) -> Outcome {
        Outcome {
            prediction: prediction.to_string(),
            confidence: 80.0,
            alternates: Vec::new(),
            source: OutcomeSource::Backend,
        }
    }

    #[test]
    fn newest_entry_comes_first() {
        let ledger = HistoryLedger::new();
        ledger.record(&outcome("A"), Vec::new(), ModelClass::Letters);
        ledger.record(&outcome("B"), Vec::new(), ModelClass::Letters);

        let entries = ledger.entries();
        assert_eq!(entries[0].label, "Letter B");
        assert_eq!(entries[1].label, "Letter A");
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let ledger = HistoryLedger::new();
        for i in 0..25 {
            ledger.record(&outcome(&format!("R{i}")), Vec::new(), ModelClass::Letters);
            assert!(ledger.len() <= HISTORY_CAPACITY);
        }
        assert_eq!(ledger.len(), HISTORY_CAPACITY);
    }

    #[test]
    fn eleventh_insert_evicts_the_oldest() {
        let ledger = HistoryLedger::new();
        for i in 1..=11 {
            ledger.record(&outcome(&format!("R{i}")), Vec::new(), ModelClass::Letters);
        }

        let labels: Vec<String> = ledger.entries().iter().map(|e| e.label.clone()).collect();
        let expected: Vec<String> = (2..=11)
            .rev()
            .map(|i| format!("Letter R{i}"))
            .collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn clear_empties_unconditionally() {
        let ledger = HistoryLedger::new();
        ledger.record(&outcome("A"), Vec::new(), ModelClass::Letters);
        ledger.clear();
        assert!(ledger.is_empty());
        ledger.clear();
        assert!(ledger.is_empty());
    }
}
