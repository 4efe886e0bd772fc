//! Data types shared by the baseline tracker, classifier and history buffer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default keystrokes-per-minute used before a baseline exists.
pub const DEFAULT_AVG_KPM: f64 = 100.0;

/// Default mouse movement per minute used before a baseline exists.
pub const DEFAULT_AVG_MOUSE: f64 = 5000.0;

/// One raw activity sample taken over a fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When the sampling window closed
    pub timestamp: DateTime<Utc>,
    /// Keystrokes per minute
    pub kpm: f64,
    /// Mouse movement per minute (relative pixels)
    pub mouse: f64,
    /// Clicks observed in the window
    pub clicks: u32,
}

impl Sample {
    /// Create a sample. Negative or non-finite rates are clamped to zero.
    pub fn new(timestamp: DateTime<Utc>, kpm: f64, mouse: f64, clicks: u32) -> Self {
        Self {
            timestamp,
            kpm: non_negative(kpm),
            mouse: non_negative(mouse),
            clicks,
        }
    }

    /// Create a sample stamped with the current time.
    pub fn now(kpm: f64, mouse: f64, clicks: u32) -> Self {
        Self::new(Utc::now(), kpm, mouse, clicks)
    }

    /// True when the window saw no input at all.
    pub fn is_idle(&self) -> bool {
        self.kpm == 0.0 && self.mouse == 0.0 && self.clicks == 0
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Smoothed estimate of a user's normal activity level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub avg_kpm: f64,
    pub avg_mouse: f64,
}

impl Baseline {
    pub fn new(avg_kpm: f64, avg_mouse: f64) -> Self {
        Self { avg_kpm, avg_mouse }
    }
}

impl Default for Baseline {
    fn default() -> Self {
        Self::new(DEFAULT_AVG_KPM, DEFAULT_AVG_MOUSE)
    }
}

/// Discrete emotional-state label derived from activity metrics.
///
/// This is a heuristic label, not a measured psychological state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Focused,
    Normal,
    Tired,
    Stressed,
    Idle,
}

impl Emotion {
    /// Every label, in classifier priority order.
    pub const ALL: [Emotion; 5] = [
        Emotion::Focused,
        Emotion::Normal,
        Emotion::Tired,
        Emotion::Stressed,
        Emotion::Idle,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Focused => "Focused",
            Emotion::Normal => "Normal",
            Emotion::Tired => "Tired",
            Emotion::Stressed => "Stressed",
            Emotion::Idle => "Idle",
        }
    }

    /// Dashboard colour for this label.
    pub fn color(&self) -> &'static str {
        match self {
            Emotion::Focused => "#00ff66",
            Emotion::Normal => "#FFD700",
            Emotion::Tired => "#0096FF",
            Emotion::Stressed => "#FF4040",
            Emotion::Idle => "#888888",
        }
    }

    /// Emoji shown in the status line.
    pub fn emoji(&self) -> &'static str {
        match self {
            Emotion::Focused => "🧠",
            Emotion::Normal => "🙂",
            Emotion::Tired => "😴",
            Emotion::Stressed => "😣",
            Emotion::Idle => "💤",
        }
    }

    /// Whether this state warrants a break reminder.
    pub fn needs_attention(&self) -> bool {
        matches!(self, Emotion::Tired | Emotion::Stressed)
    }

    /// Stable index into per-emotion counters.
    pub fn index(&self) -> usize {
        match self {
            Emotion::Focused => 0,
            Emotion::Normal => 1,
            Emotion::Tired => 2,
            Emotion::Stressed => 3,
            Emotion::Idle => 4,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label plus confidence for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub emotion: Emotion,
    /// Confidence percentage (0-100)
    pub confidence: u8,
}

/// A classified sample kept for charting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub sample: Sample,
    pub classification: Classification,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_clamps_negative_and_nan() {
        let sample = Sample::now(-5.0, f64::NAN, 3);
        assert_eq!(sample.kpm, 0.0);
        assert_eq!(sample.mouse, 0.0);
        assert_eq!(sample.clicks, 3);
        assert!(!sample.is_idle());
    }

    #[test]
    fn test_idle_sample() {
        assert!(Sample::now(0.0, 0.0, 0).is_idle());
        assert!(!Sample::now(0.0, 1.0, 0).is_idle());
    }

    #[test]
    fn test_emotion_indices_are_distinct() {
        let mut seen = [false; 5];
        for emotion in Emotion::ALL {
            assert!(!seen[emotion.index()]);
            seen[emotion.index()] = true;
        }
    }

    #[test]
    fn test_attention_states() {
        assert!(Emotion::Tired.needs_attention());
        assert!(Emotion::Stressed.needs_attention());
        assert!(!Emotion::Focused.needs_attention());
        assert!(!Emotion::Idle.needs_attention());
    }
}
