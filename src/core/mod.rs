//! Core functionality for the Emotion Monitor.
//!
//! This module contains:
//! - The data model shared by every stage
//! - Baseline tracking with calibration and persistence
//! - Threshold-ladder classification
//! - The history buffer exposed for charting

pub mod baseline;
pub mod classifier;
pub mod engine;
pub mod history;
pub mod model;

// Re-export commonly used types
pub use baseline::{BaselineError, BaselineStore, BaselineTracker, DEFAULT_CALIBRATION_SAMPLES};
pub use classifier::{classify, ClassificationPolicy};
pub use engine::{Assessment, EmotionEngine, Observation};
pub use history::{HistoryBuffer, DEFAULT_HISTORY_CAPACITY};
pub use model::{Baseline, Classification, Emotion, HistoryEntry, Sample};
