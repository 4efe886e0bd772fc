//! Threshold-ladder emotion classification.
//!
//! Both ladders are evaluated top to bottom and the first matching rung
//! wins, so overlapping bands always resolve the same way:
//! Focused, then Normal, then Tired, then Stressed. Samples with no input at
//! all are Idle under either policy.

use crate::core::model::{Baseline, Classification, Emotion, Sample};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Above this multiple of the kpm baseline a sample counts as Focused.
const FOCUSED_KPM_RATIO: f64 = 1.2;
/// Below this multiple of a baseline a metric counts as low.
const LOW_RATIO: f64 = 0.5;

const ABSOLUTE_FOCUSED_KPM: f64 = 170.0;
const ABSOLUTE_NORMAL_KPM: f64 = 120.0;
const ABSOLUTE_TIRED_KPM: f64 = 60.0;

const MIN_CONFIDENCE: f64 = 60.0;
const MAX_CONFIDENCE: f64 = 99.0;
const IDLE_CONFIDENCE: u8 = 99;

/// Which threshold ladder to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationPolicy {
    /// Compare against multiples of the personal baseline
    #[default]
    Relative,
    /// Fixed kpm cutoffs, baseline-independent
    Absolute,
}

impl ClassificationPolicy {
    pub fn classify(&self, sample: &Sample, baseline: &Baseline) -> Classification {
        classify(sample, baseline, *self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationPolicy::Relative => "relative",
            ClassificationPolicy::Absolute => "absolute",
        }
    }
}

impl FromStr for ClassificationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relative" => Ok(ClassificationPolicy::Relative),
            "absolute" => Ok(ClassificationPolicy::Absolute),
            other => Err(format!("unknown classification policy '{other}'")),
        }
    }
}

/// Classify a sample against a baseline.
///
/// Pure: the same inputs always produce the same result.
pub fn classify(sample: &Sample, baseline: &Baseline, policy: ClassificationPolicy) -> Classification {
    if sample.is_idle() {
        return Classification {
            emotion: Emotion::Idle,
            confidence: IDLE_CONFIDENCE,
        };
    }

    let emotion = match policy {
        ClassificationPolicy::Relative => relative_emotion(sample, baseline),
        ClassificationPolicy::Absolute => absolute_emotion(sample),
    };

    Classification {
        emotion,
        confidence: confidence(sample, baseline),
    }
}

fn relative_emotion(sample: &Sample, baseline: &Baseline) -> Emotion {
    let kpm = sample.kpm;
    let mouse = sample.mouse;
    let focused_kpm = baseline.avg_kpm * FOCUSED_KPM_RATIO;
    let low_kpm = baseline.avg_kpm * LOW_RATIO;
    let low_mouse = baseline.avg_mouse * LOW_RATIO;

    if kpm > focused_kpm && mouse > low_mouse {
        Emotion::Focused
    } else if kpm > low_kpm && kpm <= focused_kpm {
        Emotion::Normal
    } else if kpm < low_kpm && mouse < low_mouse {
        Emotion::Tired
    } else {
        Emotion::Stressed
    }
}

fn absolute_emotion(sample: &Sample) -> Emotion {
    if sample.kpm > ABSOLUTE_FOCUSED_KPM {
        Emotion::Focused
    } else if sample.kpm > ABSOLUTE_NORMAL_KPM {
        Emotion::Normal
    } else if sample.kpm > ABSOLUTE_TIRED_KPM {
        Emotion::Tired
    } else {
        Emotion::Stressed
    }
}

/// Confidence falls as kpm strays from the baseline.
fn confidence(sample: &Sample, baseline: &Baseline) -> u8 {
    let deviation = (sample.kpm - baseline.avg_kpm).abs();
    let score = 90.0 - deviation / 3.0;
    if score.is_nan() {
        return MIN_CONFIDENCE as u8;
    }
    score.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kpm: f64, mouse: f64) -> Sample {
        Sample::now(kpm, mouse, 5)
    }

    fn baseline() -> Baseline {
        Baseline::new(100.0, 5000.0)
    }

    #[test]
    fn test_relative_focused() {
        let result = classify(&sample(130.0, 4000.0), &baseline(), ClassificationPolicy::Relative);
        assert_eq!(result.emotion, Emotion::Focused);
    }

    #[test]
    fn test_relative_tired() {
        let result = classify(&sample(40.0, 1000.0), &baseline(), ClassificationPolicy::Relative);
        assert_eq!(result.emotion, Emotion::Tired);
    }

    #[test]
    fn test_relative_normal_band_is_inclusive_at_top() {
        let result = classify(&sample(120.0, 100.0), &baseline(), ClassificationPolicy::Relative);
        assert_eq!(result.emotion, Emotion::Normal);

        let result = classify(&sample(51.0, 9000.0), &baseline(), ClassificationPolicy::Relative);
        assert_eq!(result.emotion, Emotion::Normal);
    }

    #[test]
    fn test_relative_fallthrough_is_stressed() {
        // High kpm with little mouse movement misses Focused and Normal.
        let result = classify(&sample(200.0, 1000.0), &baseline(), ClassificationPolicy::Relative);
        assert_eq!(result.emotion, Emotion::Stressed);

        // Low kpm with heavy mouse movement misses Tired.
        let result = classify(&sample(20.0, 12000.0), &baseline(), ClassificationPolicy::Relative);
        assert_eq!(result.emotion, Emotion::Stressed);

        // Exactly half the baseline is neither Normal nor Tired.
        let result = classify(&sample(50.0, 100.0), &baseline(), ClassificationPolicy::Relative);
        assert_eq!(result.emotion, Emotion::Stressed);
    }

    #[test]
    fn test_absolute_ladder() {
        let b = baseline();
        let policy = ClassificationPolicy::Absolute;
        assert_eq!(classify(&sample(171.0, 0.0), &b, policy).emotion, Emotion::Focused);
        assert_eq!(classify(&sample(170.0, 0.0), &b, policy).emotion, Emotion::Normal);
        assert_eq!(classify(&sample(121.0, 0.0), &b, policy).emotion, Emotion::Normal);
        assert_eq!(classify(&sample(61.0, 0.0), &b, policy).emotion, Emotion::Tired);
        assert_eq!(classify(&sample(60.0, 0.0), &b, policy).emotion, Emotion::Stressed);
    }

    #[test]
    fn test_idle_precedes_both_ladders() {
        let idle = Sample::now(0.0, 0.0, 0);
        for policy in [ClassificationPolicy::Relative, ClassificationPolicy::Absolute] {
            let result = classify(&idle, &baseline(), policy);
            assert_eq!(result.emotion, Emotion::Idle);
            assert_eq!(result.confidence, 99);
        }
    }

    #[test]
    fn test_confidence_bounds() {
        let b = baseline();
        let at_baseline = classify(&sample(100.0, 5000.0), &b, ClassificationPolicy::Relative);
        assert_eq!(at_baseline.confidence, 90);

        let far = classify(&sample(900.0, 5000.0), &b, ClassificationPolicy::Relative);
        assert_eq!(far.confidence, 60);

        let near = classify(&sample(130.0, 5000.0), &b, ClassificationPolicy::Relative);
        assert_eq!(near.confidence, 80);
    }

    #[test]
    fn test_classification_is_pure() {
        let s = sample(143.0, 3100.0);
        let b = Baseline::new(97.5, 4800.0);
        let first = classify(&s, &b, ClassificationPolicy::Relative);
        for _ in 0..10 {
            assert_eq!(classify(&s, &b, ClassificationPolicy::Relative), first);
        }
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("relative".parse(), Ok(ClassificationPolicy::Relative));
        assert_eq!(" Absolute ".parse(), Ok(ClassificationPolicy::Absolute));
        assert!("fuzzy".parse::<ClassificationPolicy>().is_err());
    }
}
