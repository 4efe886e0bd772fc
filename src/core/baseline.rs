//! Adaptive baseline tracking.
//!
//! The first `N` samples calibrate the baseline to their mean. After that
//! every sample nudges the baseline with an exponential moving average.

use crate::core::model::{Baseline, Sample};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::path::{Path, PathBuf};

/// Weight given to the newest sample by the moving average.
pub const SMOOTHING_WEIGHT: f64 = 0.1;

/// Default number of samples in the calibration phase.
pub const DEFAULT_CALIBRATION_SAMPLES: usize = 12;

/// Errors reading or writing the persisted baseline.
#[derive(Debug)]
pub enum BaselineError {
    Io(std::io::Error),
    Parse(String),
}

impl std::fmt::Display for BaselineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BaselineError::Io(e) => write!(f, "baseline IO error: {e}"),
            BaselineError::Parse(e) => write!(f, "baseline parse error: {e}"),
        }
    }
}

impl std::error::Error for BaselineError {}

impl From<std::io::Error> for BaselineError {
    fn from(e: std::io::Error) -> Self {
        BaselineError::Io(e)
    }
}

/// On-disk shape of the baseline record.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedBaseline {
    avg_kpm: f64,
    avg_mouse: f64,
}

/// JSON file holding the last known baseline.
#[derive(Debug, Clone)]
pub struct BaselineStore {
    path: PathBuf,
}

impl BaselineStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored baseline. `Ok(None)` means no record exists yet.
    pub fn load(&self) -> Result<Option<Baseline>, BaselineError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let persisted: PersistedBaseline =
            serde_json::from_str(&content).map_err(|e| BaselineError::Parse(e.to_string()))?;

        let baseline = Baseline::new(persisted.avg_kpm, persisted.avg_mouse);
        if !is_usable(&baseline) {
            return Err(BaselineError::Parse(format!(
                "unusable baseline (avg_kpm={}, avg_mouse={})",
                baseline.avg_kpm, baseline.avg_mouse
            )));
        }

        Ok(Some(baseline))
    }

    /// Rewrite the stored baseline.
    pub fn save(&self, baseline: &Baseline) -> Result<(), BaselineError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let persisted = PersistedBaseline {
            avg_kpm: baseline.avg_kpm,
            avg_mouse: baseline.avg_mouse,
        };
        let json = serde_json::to_string_pretty(&persisted)
            .map_err(|e| BaselineError::Parse(e.to_string()))?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Delete the stored baseline if present.
    pub fn clear(&self) -> Result<(), BaselineError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Maintains the running baseline, including the calibration phase.
#[derive(Debug)]
pub struct BaselineTracker {
    baseline: Baseline,
    calibrating: bool,
    calibration_target: usize,
    calibration_samples: Vec<Sample>,
    store: Option<BaselineStore>,
}

impl BaselineTracker {
    /// Create an in-memory tracker that starts in calibration with default values.
    pub fn new(calibration_target: usize) -> Self {
        let calibration_target = calibration_target.max(1);
        Self {
            baseline: Baseline::default(),
            calibrating: true,
            calibration_target,
            calibration_samples: Vec::with_capacity(calibration_target),
            store: None,
        }
    }

    /// Create a tracker backed by a store.
    ///
    /// A stored baseline skips calibration. A missing or unreadable record
    /// falls back to defaults and calibrates.
    pub fn with_store(calibration_target: usize, store: BaselineStore) -> Self {
        let mut tracker = Self::new(calibration_target);

        match store.load() {
            Ok(Some(baseline)) => {
                tracing::info!(
                    avg_kpm = baseline.avg_kpm,
                    avg_mouse = baseline.avg_mouse,
                    "Loaded baseline from {:?}",
                    store.path()
                );
                tracker.baseline = baseline;
                tracker.calibrating = false;
            }
            Ok(None) => {
                tracing::info!(
                    "No stored baseline, calibrating over {} samples",
                    tracker.calibration_target
                );
            }
            Err(e) => {
                tracing::warn!("Ignoring stored baseline ({e}), recalibrating");
            }
        }

        tracker.store = Some(store);
        tracker
    }

    /// Feed one sample and return the baseline after the update.
    pub fn update(&mut self, sample: &Sample) -> Baseline {
        if self.calibrating {
            self.calibration_samples.push(*sample);
            if self.calibration_samples.len() >= self.calibration_target {
                self.finish_calibration();
            }
        } else {
            self.baseline = Baseline::new(
                smooth(self.baseline.avg_kpm, sample.kpm),
                smooth(self.baseline.avg_mouse, sample.mouse),
            );
        }
        self.baseline
    }

    fn finish_calibration(&mut self) {
        let avg_kpm = self.calibration_samples.iter().map(|s| s.kpm).mean();
        let avg_mouse = self.calibration_samples.iter().map(|s| s.mouse).mean();
        let candidate = Baseline::new(avg_kpm, avg_mouse);
        self.calibration_samples.clear();

        // A zero reference makes every ratio test pass; collect again.
        if !is_usable(&candidate) {
            tracing::warn!(
                avg_kpm = candidate.avg_kpm,
                avg_mouse = candidate.avg_mouse,
                "Calibration saw no activity, restarting calibration"
            );
            return;
        }

        self.baseline = candidate;
        self.calibrating = false;

        tracing::info!(
            avg_kpm = self.baseline.avg_kpm,
            avg_mouse = self.baseline.avg_mouse,
            "Calibration complete"
        );

        if let Err(e) = self.persist() {
            tracing::warn!("Could not persist baseline, continuing in memory: {e}");
        }
    }

    /// Discard calibration progress and calibrate again from the next sample.
    pub fn recalibrate(&mut self) {
        self.calibrating = true;
        self.calibration_samples.clear();
        if let Some(ref store) = self.store {
            if let Err(e) = store.clear() {
                tracing::warn!("Could not remove stored baseline: {e}");
            }
        }
        tracing::info!(
            "Recalibrating over {} samples",
            self.calibration_target
        );
    }

    /// Write the current baseline to the store. No-op while calibrating or
    /// without a store.
    pub fn persist(&self) -> Result<(), BaselineError> {
        match self.store {
            Some(ref store) if !self.calibrating => store.save(&self.baseline),
            _ => Ok(()),
        }
    }

    pub fn baseline(&self) -> Baseline {
        self.baseline
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibrating
    }

    /// Samples collected so far and the number required.
    pub fn calibration_progress(&self) -> (usize, usize) {
        (self.calibration_samples.len(), self.calibration_target)
    }
}

/// Both averages must be finite and strictly positive.
pub fn is_usable(baseline: &Baseline) -> bool {
    [baseline.avg_kpm, baseline.avg_mouse]
        .iter()
        .all(|v| v.is_finite() && *v > 0.0)
}

fn smooth(old: f64, new: f64) -> f64 {
    old * (1.0 - SMOOTHING_WEIGHT) + new * SMOOTHING_WEIGHT
}
