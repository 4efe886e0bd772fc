//! Running counters for what the monitor has done.
//!
//! Counters are atomics so the monitor can update them without taking the
//! state lock. They are persisted across runs and shown by `status`.

use crate::core::model::Emotion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monitor statistics for the current and previous sessions.
#[derive(Debug)]
pub struct SessionStats {
    /// Samples taken, including calibration, across all runs
    samples: AtomicU64,
    /// Samples taken since this process started
    session_samples: AtomicU64,
    /// Samples consumed by calibration
    calibration_samples: AtomicU64,
    /// Classified samples per emotion, indexed by `Emotion::index`
    emotions: [AtomicU64; 5],
    /// Alerts handed to a sink
    alerts_fired: AtomicU64,
    /// Alerts the sink failed to deliver
    alerts_failed: AtomicU64,
    session_start: DateTime<Utc>,
    persist_path: Option<PathBuf>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            samples: AtomicU64::new(0),
            session_samples: AtomicU64::new(0),
            calibration_samples: AtomicU64::new(0),
            emotions: Default::default(),
            alerts_fired: AtomicU64::new(0),
            alerts_failed: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create stats that continue from a previous run's file.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);

        if let Err(e) = stats.load() {
            tracing::warn!("Could not load previous session stats: {e}");
        }

        stats
    }

    pub fn record_calibration_sample(&self) {
        self.count_sample();
        self.calibration_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_classified(&self, emotion: Emotion) {
        self.count_sample();
        self.emotions[emotion.index()].fetch_add(1, Ordering::Relaxed);
    }

    fn count_sample(&self) {
        self.samples.fetch_add(1, Ordering::Relaxed);
        self.session_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_alert(&self, delivered: bool) {
        self.alerts_fired.fetch_add(1, Ordering::Relaxed);
        if !delivered {
            self.alerts_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            samples: self.samples.load(Ordering::Relaxed),
            session_samples: self.session_samples.load(Ordering::Relaxed),
            calibration_samples: self.calibration_samples.load(Ordering::Relaxed),
            focused: self.count(Emotion::Focused),
            normal: self.count(Emotion::Normal),
            tired: self.count(Emotion::Tired),
            stressed: self.count(Emotion::Stressed),
            idle: self.count(Emotion::Idle),
            alerts_fired: self.alerts_fired.load(Ordering::Relaxed),
            alerts_failed: self.alerts_failed.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    fn count(&self, emotion: Emotion) -> u64 {
        self.emotions[emotion.index()].load(Ordering::Relaxed)
    }

    /// Human-readable summary for the end of a run.
    ///
    /// Counters are totals over every run that shared the stats file; only
    /// the first line describes the current run.
    pub fn summary(&self) -> String {
        let s = self.snapshot();
        let mut out = format!(
            "This run: {} samples over {} seconds\n",
            s.session_samples, s.session_duration_secs
        );
        out.push_str("All runs:\n");
        out.push_str(&format!(
            "  Samples: {} ({} calibration)\n",
            s.samples, s.calibration_samples
        ));
        let per_emotion = Emotion::ALL
            .iter()
            .zip([s.focused, s.normal, s.tired, s.stressed, s.idle])
            .map(|(emotion, n)| format!("{emotion}: {n}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(&format!("  {per_emotion}\n"));
        out.push_str(&format!(
            "  Alerts: {} ({} failed)\n\n",
            s.alerts_fired, s.alerts_failed
        ));
        out.push_str("Labels are activity heuristics, not a psychological assessment.");
        out
    }

    /// Save counters to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let s = self.snapshot();
            let persisted = PersistedStats {
                samples: s.samples,
                calibration_samples: s.calibration_samples,
                emotions: [s.focused, s.normal, s.tired, s.stressed, s.idle],
                alerts_fired: s.alerts_fired,
                alerts_failed: s.alerts_failed,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.samples.store(persisted.samples, Ordering::Relaxed);
                self.calibration_samples
                    .store(persisted.calibration_samples, Ordering::Relaxed);
                for (counter, value) in self.emotions.iter().zip(persisted.emotions) {
                    counter.store(value, Ordering::Relaxed);
                }
                self.alerts_fired
                    .store(persisted.alerts_fired, Ordering::Relaxed);
                self.alerts_failed
                    .store(persisted.alerts_failed, Ordering::Relaxed);
            }
        }
        Ok(())
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub samples: u64,
    pub session_samples: u64,
    pub calibration_samples: u64,
    pub focused: u64,
    pub normal: u64,
    pub tired: u64,
    pub stressed: u64,
    pub idle: u64,
    pub alerts_fired: u64,
    pub alerts_failed: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// On-disk counter format.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedStats {
    pub samples: u64,
    pub calibration_samples: u64,
    /// Focused, Normal, Tired, Stressed, Idle
    pub emotions: [u64; 5],
    pub alerts_fired: u64,
    pub alerts_failed: u64,
    pub last_updated: DateTime<Utc>,
}

/// Thread-safe shared stats.
pub type SharedSessionStats = Arc<SessionStats>;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_counting() {
        let stats = SessionStats::new();
        stats.record_calibration_sample();
        stats.record_classified(Emotion::Tired);
        stats.record_classified(Emotion::Tired);
        stats.record_alert(false);

        let s = stats.snapshot();
        assert_eq!(s.samples, 3);
        assert_eq!(s.calibration_samples, 1);
        assert_eq!(s.tired, 2);
        assert_eq!(s.alerts_fired, 1);
        assert_eq!(s.alerts_failed, 1);
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session_stats.json");

        let stats = SessionStats::with_persistence(path.clone());
        stats.record_classified(Emotion::Focused);
        stats.record_alert(true);
        stats.save().unwrap();

        let resumed = SessionStats::with_persistence(path);
        let s = resumed.snapshot();
        assert_eq!(s.samples, 1);
        assert_eq!(s.focused, 1);
        assert_eq!(s.alerts_fired, 1);
        assert_eq!(s.alerts_failed, 0);
    }

    #[test]
    fn test_summary_separates_run_from_totals() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session_stats.json");

        let earlier = SessionStats::with_persistence(path.clone());
        for _ in 0..4 {
            earlier.record_classified(Emotion::Normal);
        }
        earlier.save().unwrap();

        let current = SessionStats::with_persistence(path);
        current.record_classified(Emotion::Tired);

        let s = current.snapshot();
        assert_eq!(s.samples, 5);
        assert_eq!(s.session_samples, 1);

        let summary = current.summary();
        assert!(summary.starts_with("This run: 1 samples"));
        assert!(summary.contains("All runs:"));
        assert!(summary.contains("Samples: 5 (0 calibration)"));
        assert!(summary.contains("Normal: 4  Tired: 1"));
        assert!(summary.contains("not a psychological assessment"));
    }
}
