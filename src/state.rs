//! The state shared between the monitor, the HTTP server and the status line.
//!
//! The monitor task is the only writer. Readers copy what they need out
//! under the lock and release it before doing anything else.

use crate::core::engine::Observation;
use crate::core::history::HistoryBuffer;
use crate::core::model::{Baseline, HistoryEntry};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Calibration progress as published to readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationProgress {
    pub calibrating: bool,
    pub collected: usize,
    pub target: usize,
}

/// Mutable state behind the lock.
#[derive(Debug)]
struct MonitorState {
    latest: Option<Observation>,
    baseline: Baseline,
    calibration: CalibrationProgress,
    history: HistoryBuffer,
    last_alert: Option<DateTime<Utc>>,
}

/// Copy of the state taken under the lock.
#[derive(Debug, Clone)]
pub struct MonitorSnapshot {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub latest: Option<Observation>,
    pub baseline: Baseline,
    pub calibration: CalibrationProgress,
    pub history: Vec<HistoryEntry>,
    pub last_alert: Option<DateTime<Utc>>,
    pub paused: bool,
}

/// One update from the monitor task.
#[derive(Debug, Clone, Copy)]
pub struct Publication {
    pub observation: Observation,
    pub calibration: CalibrationProgress,
    pub alert_fired_at: Option<DateTime<Utc>>,
}

/// Owner of the shared monitor state.
#[derive(Debug)]
pub struct MonitorHandle {
    state: Mutex<MonitorState>,
    paused: AtomicBool,
    recalibrate_requested: AtomicBool,
    session_id: Uuid,
    started_at: DateTime<Utc>,
}

/// Thread-safe shared handle.
pub type SharedMonitor = Arc<MonitorHandle>;

impl MonitorHandle {
    pub fn new(history_capacity: usize, baseline: Baseline, calibration: CalibrationProgress) -> Self {
        Self {
            state: Mutex::new(MonitorState {
                latest: None,
                baseline,
                calibration,
                history: HistoryBuffer::new(history_capacity),
                last_alert: None,
            }),
            paused: AtomicBool::new(false),
            recalibrate_requested: AtomicBool::new(false),
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }

    pub fn shared(self) -> SharedMonitor {
        Arc::new(self)
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Record one observation. Classified samples join the history.
    pub async fn publish(&self, update: Publication) {
        let mut state = self.state.lock().await;
        if let Some(entry) = update.observation.history_entry() {
            state.history.append(entry);
        }
        state.baseline = update.observation.baseline;
        state.calibration = update.calibration;
        state.latest = Some(update.observation);
        if update.alert_fired_at.is_some() {
            state.last_alert = update.alert_fired_at;
        }
    }

    /// Publish calibration progress without a new sample (after a reset).
    pub async fn set_calibration(&self, calibration: CalibrationProgress) {
        self.state.lock().await.calibration = calibration;
    }

    pub async fn snapshot(&self) -> MonitorSnapshot {
        let state = self.state.lock().await;
        MonitorSnapshot {
            session_id: self.session_id,
            started_at: self.started_at,
            latest: state.latest,
            baseline: state.baseline,
            calibration: state.calibration,
            history: state.history.snapshot(),
            last_alert: state.last_alert,
            paused: self.is_paused(),
        }
    }

    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.state.lock().await.history.snapshot()
    }

    pub fn set_paused(&self, paused: bool) {
        let previous = self.paused.swap(paused, Ordering::SeqCst);
        if previous != paused {
            tracing::info!(paused, "Monitoring {}", if paused { "paused" } else { "resumed" });
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Ask the monitor to recalibrate on its next tick.
    pub fn request_recalibration(&self) {
        self.recalibrate_requested.store(true, Ordering::SeqCst);
    }

    /// Consume a pending recalibration request.
    pub fn take_recalibration_request(&self) -> bool {
        self.recalibrate_requested.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::Assessment;
    use crate::core::model::{Classification, Emotion, Sample};

    fn progress(calibrating: bool) -> CalibrationProgress {
        CalibrationProgress {
            calibrating,
            collected: 0,
            target: 12,
        }
    }

    fn classified(kpm: f64) -> Observation {
        Observation {
            sample: Sample::now(kpm, 100.0, 1),
            baseline: Baseline::new(kpm, 100.0),
            assessment: Assessment::Classified(Classification {
                emotion: Emotion::Normal,
                confidence: 90,
            }),
        }
    }

    #[tokio::test]
    async fn test_empty_snapshot() {
        let handle = MonitorHandle::new(5, Baseline::default(), progress(true));
        let snapshot = handle.snapshot().await;
        assert!(snapshot.latest.is_none());
        assert!(snapshot.history.is_empty());
        assert!(snapshot.calibration.calibrating);
        assert!(!snapshot.paused);
    }

    #[tokio::test]
    async fn test_publish_bounds_history() {
        let handle = MonitorHandle::new(2, Baseline::default(), progress(false));
        for kpm in [10.0, 20.0, 30.0] {
            handle
                .publish(Publication {
                    observation: classified(kpm),
                    calibration: progress(false),
                    alert_fired_at: None,
                })
                .await;
        }

        let snapshot = handle.snapshot().await;
        let kpms: Vec<f64> = snapshot.history.iter().map(|e| e.sample.kpm).collect();
        assert_eq!(kpms, vec![20.0, 30.0]);
        assert_eq!(snapshot.baseline.avg_kpm, 30.0);
    }

    #[tokio::test]
    async fn test_calibrating_observation_skips_history() {
        let handle = MonitorHandle::new(5, Baseline::default(), progress(true));
        let observation = Observation {
            assessment: Assessment::Calibrating {
                collected: 1,
                target: 12,
            },
            ..classified(50.0)
        };
        handle
            .publish(Publication {
                observation,
                calibration: progress(true),
                alert_fired_at: None,
            })
            .await;

        let snapshot = handle.snapshot().await;
        assert!(snapshot.latest.is_some());
        assert!(snapshot.history.is_empty());
    }

    #[test]
    fn test_flags() {
        let handle = MonitorHandle::new(5, Baseline::default(), progress(false));
        handle.set_paused(true);
        assert!(handle.is_paused());

        assert!(!handle.take_recalibration_request());
        handle.request_recalibration();
        assert!(handle.take_recalibration_request());
        assert!(!handle.take_recalibration_request());
    }
}
