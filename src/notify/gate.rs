//! Rate limiting for break reminders.

use crate::core::model::Emotion;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Band the cooldown is drawn from after every alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownPolicy {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl CooldownPolicy {
    pub fn fixed(secs: u64) -> Self {
        Self {
            min_secs: secs,
            max_secs: secs,
        }
    }

    fn draw(&self, rng: &mut StdRng) -> Duration {
        let (lo, hi) = if self.min_secs <= self.max_secs {
            (self.min_secs, self.max_secs)
        } else {
            (self.max_secs, self.min_secs)
        };
        Duration::from_secs(rng.gen_range(lo..=hi))
    }
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self {
            min_secs: 420,
            max_secs: 480,
        }
    }
}

/// A reminder ready for delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub emotion: Emotion,
    pub title: String,
    pub body: String,
    pub fired_at: DateTime<Utc>,
}

impl Alert {
    /// Build the reminder text for an attention state.
    pub fn for_emotion(emotion: Emotion, fired_at: DateTime<Utc>) -> Option<Self> {
        let (title, body) = match emotion {
            Emotion::Tired => (
                "😴 Take a short break",
                "You seem tired. Drink water or relax for a minute.",
            ),
            Emotion::Stressed => (
                "⚠️ Time for a break!",
                "You seem stressed. Stretch or rest your eyes.",
            ),
            _ => return None,
        };
        Some(Self {
            emotion,
            title: title.to_string(),
            body: body.to_string(),
            fired_at,
        })
    }
}

/// Decides whether the current state should fire a reminder.
pub struct AlertGate {
    policy: CooldownPolicy,
    cooldown: Duration,
    last_alert: Option<DateTime<Utc>>,
    focus_mode: bool,
    rng: StdRng,
}

impl AlertGate {
    pub fn new(policy: CooldownPolicy) -> Self {
        Self::with_rng(policy, StdRng::from_entropy())
    }

    pub fn seeded(policy: CooldownPolicy, seed: u64) -> Self {
        Self::with_rng(policy, StdRng::seed_from_u64(seed))
    }

    fn with_rng(policy: CooldownPolicy, mut rng: StdRng) -> Self {
        let cooldown = policy.draw(&mut rng);
        Self {
            policy,
            cooldown,
            last_alert: None,
            focus_mode: false,
            rng,
        }
    }

    /// While focus mode is on no reminders fire.
    pub fn set_focus_mode(&mut self, enabled: bool) {
        self.focus_mode = enabled;
    }

    pub fn focus_mode(&self) -> bool {
        self.focus_mode
    }

    pub fn last_alert(&self) -> Option<DateTime<Utc>> {
        self.last_alert
    }

    /// Cooldown that must pass before the next reminder.
    pub fn current_cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Return an alert if `emotion` needs attention and the cooldown since
    /// the previous alert has elapsed. Firing records `now` and draws the
    /// next cooldown.
    pub fn evaluate(&mut self, emotion: Emotion, now: DateTime<Utc>) -> Option<Alert> {
        if self.focus_mode || !emotion.needs_attention() {
            return None;
        }

        if let Some(last) = self.last_alert {
            let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);
            if elapsed < self.cooldown {
                return None;
            }
        }

        let alert = Alert::for_emotion(emotion, now)?;
        self.last_alert = Some(now);
        self.cooldown = self.policy.draw(&mut self.rng);
        Some(alert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn test_first_attention_state_fires() {
        let mut gate = AlertGate::seeded(CooldownPolicy::default(), 3);
        let alert = gate.evaluate(Emotion::Tired, Utc::now());
        assert_eq!(alert.map(|a| a.emotion), Some(Emotion::Tired));
    }

    #[test]
    fn test_non_attention_states_never_fire() {
        let mut gate = AlertGate::seeded(CooldownPolicy::fixed(0), 3);
        let now = Utc::now();
        for emotion in [Emotion::Focused, Emotion::Normal, Emotion::Idle] {
            assert!(gate.evaluate(emotion, now).is_none());
        }
        assert!(gate.last_alert().is_none());
    }

    #[test]
    fn test_at_most_once_per_cooldown() {
        let mut gate = AlertGate::seeded(CooldownPolicy::default(), 11);
        let start = Utc::now();

        // One Stressed sample every 15 seconds for just under the minimum cooldown.
        let fired = (0..28)
            .filter(|i| {
                let now = start + ChronoDuration::seconds(i * 15);
                gate.evaluate(Emotion::Stressed, now).is_some()
            })
            .count();
        assert_eq!(fired, 1);

        // Past the maximum cooldown it fires again.
        let later = start + ChronoDuration::seconds(481);
        assert!(gate.evaluate(Emotion::Tired, later).is_some());
    }

    #[test]
    fn test_cooldown_is_drawn_within_band() {
        let policy = CooldownPolicy {
            min_secs: 420,
            max_secs: 480,
        };
        let mut gate = AlertGate::seeded(policy, 5);
        let mut now = Utc::now();
        for _ in 0..20 {
            let cooldown = gate.current_cooldown().as_secs();
            assert!((420..=480).contains(&cooldown));
            gate.evaluate(Emotion::Tired, now);
            now += ChronoDuration::seconds(500);
        }
    }

    #[test]
    fn test_focus_mode_suppresses() {
        let mut gate = AlertGate::seeded(CooldownPolicy::fixed(0), 1);
        gate.set_focus_mode(true);
        assert!(gate.evaluate(Emotion::Stressed, Utc::now()).is_none());
        gate.set_focus_mode(false);
        assert!(gate.evaluate(Emotion::Stressed, Utc::now()).is_some());
    }
}
