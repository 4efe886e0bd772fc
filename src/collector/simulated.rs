//! Random activity generator standing in for real input capture.
//!
//! Each sample first picks an activity mode by weight, then draws kpm,
//! mouse movement and clicks uniformly from that mode's ranges.

use crate::collector::MetricSampler;
use crate::core::model::Sample;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

/// An activity profile with its relative frequency.
#[derive(Debug, Clone)]
pub struct ActivityMode {
    pub name: &'static str,
    pub weight: f64,
    pub kpm: RangeInclusive<u32>,
    pub mouse: RangeInclusive<u32>,
    pub clicks: RangeInclusive<u32>,
}

/// Default mix: mostly coding and browsing, some calls, occasional idling.
pub fn default_modes() -> Vec<ActivityMode> {
    vec![
        ActivityMode {
            name: "Coding",
            weight: 0.4,
            kpm: 180..=280,
            mouse: 4000..=8000,
            clicks: 30..=80,
        },
        ActivityMode {
            name: "Browsing",
            weight: 0.35,
            kpm: 30..=90,
            mouse: 7000..=16000,
            clicks: 5..=25,
        },
        ActivityMode {
            name: "Call",
            weight: 0.15,
            kpm: 5..=25,
            mouse: 1000..=4000,
            clicks: 0..=10,
        },
        ActivityMode {
            name: "Idle",
            weight: 0.1,
            kpm: 0..=10,
            mouse: 0..=1000,
            clicks: 0..=5,
        },
    ]
}

/// Sampler producing plausible random activity.
pub struct SimulatedSampler {
    modes: Vec<ActivityMode>,
    rng: StdRng,
}

impl SimulatedSampler {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic sampler for tests and demos.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            modes: default_modes(),
            rng,
        }
    }

    /// Replace the mode table. An empty table keeps the defaults.
    pub fn with_modes(mut self, modes: Vec<ActivityMode>) -> Self {
        if !modes.is_empty() {
            self.modes = modes;
        }
        self
    }

    fn pick_mode(&mut self) -> Option<ActivityMode> {
        match self.modes.choose_weighted(&mut self.rng, |m| m.weight) {
            Ok(mode) => Some(mode.clone()),
            // Non-positive weights everywhere: fall back to a uniform pick.
            Err(_) => self.modes.choose(&mut self.rng).cloned(),
        }
    }
}

impl Default for SimulatedSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSampler for SimulatedSampler {
    fn sample(&mut self) -> Sample {
        let Some(mode) = self.pick_mode() else {
            return Sample::now(0.0, 0.0, 0);
        };
        let kpm = self.rng.gen_range(mode.kpm.clone());
        let mouse = self.rng.gen_range(mode.mouse.clone());
        let clicks = self.rng.gen_range(mode.clicks.clone());
        tracing::trace!(mode = mode.name, kpm, mouse, clicks, "Simulated sample");
        Sample::now(kpm as f64, mouse as f64, clicks)
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
