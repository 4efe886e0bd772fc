//! Terminal status line, the stand-in for a menubar title.

use crate::core::engine::Assessment;
use crate::state::{MonitorSnapshot, SharedMonitor};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Title text for the current state.
pub fn status_title(snapshot: &MonitorSnapshot) -> String {
    if snapshot.paused {
        return "⏸️ Paused".to_string();
    }
    if snapshot.calibration.calibrating {
        return format!(
            "⚙️ Calibrating... ({}/{})",
            snapshot.calibration.collected, snapshot.calibration.target
        );
    }
    match snapshot.latest.map(|o| o.assessment) {
        Some(Assessment::Classified(c)) => {
            format!("{} {} ({}%)", c.emotion.emoji(), c.emotion, c.confidence)
        }
        Some(Assessment::Calibrating { .. }) => "✅ Calibrated".to_string(),
        None => "🧠 Initializing".to_string(),
    }
}

/// Print the title whenever it changes, until cancelled.
pub async fn run_status_line(handle: SharedMonitor, refresh: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(refresh);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = String::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let title = status_title(&handle.snapshot().await);
                if title != last {
                    println!("{title}");
                    last = title;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::Observation;
    use crate::core::model::{Baseline, Classification, Emotion, Sample};
    use crate::state::{CalibrationProgress, MonitorHandle, Publication};

    fn progress(calibrating: bool, collected: usize) -> CalibrationProgress {
        CalibrationProgress {
            calibrating,
            collected,
            target: 12,
        }
    }

    #[tokio::test]
    async fn test_titles() {
        let handle = MonitorHandle::new(5, Baseline::default(), progress(false, 12));
        assert_eq!(status_title(&handle.snapshot().await), "🧠 Initializing");

        handle
            .publish(Publication {
                observation: Observation {
                    sample: Sample::now(40.0, 1000.0, 2),
                    baseline: Baseline::default(),
                    assessment: Assessment::Classified(Classification {
                        emotion: Emotion::Tired,
                        confidence: 70,
                    }),
                },
                calibration: progress(false, 12),
                alert_fired_at: None,
            })
            .await;
        assert_eq!(status_title(&handle.snapshot().await), "😴 Tired (70%)");

        handle.set_calibration(progress(true, 3)).await;
        assert_eq!(
            status_title(&handle.snapshot().await),
            "⚙️ Calibrating... (3/12)"
        );

        handle.set_paused(true);
        assert_eq!(status_title(&handle.snapshot().await), "⏸️ Paused");
    }

    #[tokio::test]
    async fn test_title_after_calibration_completes() {
        let handle = MonitorHandle::new(5, Baseline::default(), progress(true, 11));
        handle
            .publish(Publication {
                observation: Observation {
                    sample: Sample::now(100.0, 5000.0, 5),
                    baseline: Baseline::default(),
                    assessment: Assessment::Calibrating {
                        collected: 12,
                        target: 12,
                    },
                },
                calibration: progress(false, 0),
                alert_fired_at: None,
            })
            .await;
        assert_eq!(status_title(&handle.snapshot().await), "✅ Calibrated");
    }

    #[tokio::test]
    async fn test_status_line_stops_on_cancel() {
        let handle = MonitorHandle::new(5, Baseline::default(), progress(true, 0)).shared();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_status_line(
            handle,
            Duration::from_millis(5),
            cancel.clone(),
        ));
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        task.await.unwrap();
    }
}
