//! Baseline tracking and classification combined into one step per sample.

use crate::core::baseline::{BaselineError, BaselineStore, BaselineTracker};
use crate::core::classifier::ClassificationPolicy;
use crate::core::model::{Baseline, Classification, HistoryEntry, Sample};
use serde::{Deserialize, Serialize};

/// Outcome of observing one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Assessment {
    /// The sample went into the calibration window
    Calibrating { collected: usize, target: usize },
    Classified(Classification),
}

/// A sample together with what the engine made of it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub sample: Sample,
    /// Baseline after this sample was applied
    pub baseline: Baseline,
    pub assessment: Assessment,
}

impl Observation {
    pub fn classification(&self) -> Option<Classification> {
        match self.assessment {
            Assessment::Classified(c) => Some(c),
            Assessment::Calibrating { .. } => None,
        }
    }

    pub fn history_entry(&self) -> Option<HistoryEntry> {
        self.classification().map(|classification| HistoryEntry {
            sample: self.sample,
            classification,
        })
    }
}

/// Owns the baseline and applies the classification policy.
#[derive(Debug)]
pub struct EmotionEngine {
    tracker: BaselineTracker,
    policy: ClassificationPolicy,
}

impl EmotionEngine {
    pub fn new(tracker: BaselineTracker, policy: ClassificationPolicy) -> Self {
        Self { tracker, policy }
    }

    /// Engine backed by a baseline file.
    pub fn with_store(
        calibration_samples: usize,
        store: BaselineStore,
        policy: ClassificationPolicy,
    ) -> Self {
        Self::new(BaselineTracker::with_store(calibration_samples, store), policy)
    }

    /// Update the baseline with `sample`, then classify it against the
    /// updated baseline. Samples that arrive during calibration are not
    /// classified.
    pub fn observe(&mut self, sample: Sample) -> Observation {
        let was_calibrating = self.tracker.is_calibrating();
        let (collected_before, target) = self.tracker.calibration_progress();
        let baseline = self.tracker.update(&sample);

        let assessment = if was_calibrating {
            Assessment::Calibrating {
                collected: collected_before + 1,
                target,
            }
        } else {
            Assessment::Classified(self.policy.classify(&sample, &baseline))
        };

        Observation {
            sample,
            baseline,
            assessment,
        }
    }

    pub fn recalibrate(&mut self) {
        self.tracker.recalibrate();
    }

    pub fn persist(&self) -> Result<(), BaselineError> {
        self.tracker.persist()
    }

    pub fn baseline(&self) -> Baseline {
        self.tracker.baseline()
    }

    pub fn is_calibrating(&self) -> bool {
        self.tracker.is_calibrating()
    }

    pub fn calibration_progress(&self) -> (usize, usize) {
        self.tracker.calibration_progress()
    }

    pub fn policy(&self) -> ClassificationPolicy {
        self.policy
    }
}
