//! Metric sampling for the Emotion Monitor.
//!
//! A sampler produces one [`Sample`] per call, summarising activity since
//! the previous call. The monitor task owns exactly one sampler.

pub mod events;
pub mod simulated;
pub mod types;

use crate::core::model::Sample;
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Re-export commonly used types
pub use events::{EventSampler, EventWindow};
pub use simulated::{ActivityMode, SimulatedSampler};
pub use types::{KeyboardEvent, MouseEvent, MouseEventType, SensorEvent};

/// Periodic source of raw activity samples.
pub trait MetricSampler: Send {
    fn sample(&mut self) -> Sample;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Which sampler implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplerKind {
    #[default]
    Simulated,
    Events,
}

/// A constructed sampler and, for channel-fed samplers, its input side.
pub struct BuiltSampler {
    pub sampler: Box<dyn MetricSampler>,
    pub events: Option<Sender<SensorEvent>>,
}

impl SamplerKind {
    pub fn build(&self) -> BuiltSampler {
        match self {
            SamplerKind::Simulated => BuiltSampler {
                sampler: Box::new(SimulatedSampler::new()),
                events: None,
            },
            SamplerKind::Events => {
                let sampler = EventSampler::new();
                BuiltSampler {
                    events: Some(sampler.sender()),
                    sampler: Box::new(sampler),
                }
            }
        }
    }

    /// Whether samples depend on an in-process event producer.
    pub fn needs_producer(&self) -> bool {
        matches!(self, SamplerKind::Events)
    }
}

impl FromStr for SamplerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simulated" | "sim" => Ok(SamplerKind::Simulated),
            "events" => Ok(SamplerKind::Events),
            other => Err(format!("unknown sampler '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_kind_parsing() {
        assert_eq!("simulated".parse(), Ok(SamplerKind::Simulated));
        assert_eq!("EVENTS".parse(), Ok(SamplerKind::Events));
        assert!("keyboard".parse::<SamplerKind>().is_err());
    }

    #[test]
    fn test_build_names() {
        assert_eq!(SamplerKind::Simulated.build().sampler.name(), "simulated");
        assert_eq!(SamplerKind::Events.build().sampler.name(), "events");
    }

    #[test]
    fn test_events_build_exposes_sender() {
        let mut built = SamplerKind::Events.build();
        let sender = built.events.take().unwrap();
        for _ in 0..5 {
            sender
                .send(SensorEvent::Keyboard(KeyboardEvent::new(true)))
                .unwrap();
        }
        assert!(built.sampler.sample().kpm > 0.0);

        assert!(SamplerKind::Simulated.build().events.is_none());
        assert!(SamplerKind::Events.needs_producer());
    }
}
