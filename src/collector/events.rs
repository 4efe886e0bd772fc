//! Sampler that aggregates real input events into per-window rates.
//!
//! A platform hook (or a test) pushes [`SensorEvent`]s into the channel
//! returned by [`EventSampler::sender`]. Each call to `sample` drains the
//! channel into an [`EventWindow`] and converts the counts to per-minute
//! rates over the time since the previous sample. With nothing feeding the
//! channel every sample is idle.

use crate::collector::types::{MouseEventType, SensorEvent};
use crate::collector::MetricSampler;
use crate::core::model::Sample;
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, Sender};

/// Maximum queued events between two samples.
const CHANNEL_CAPACITY: usize = 10_000;

/// Counts accumulated over one sampling window.
#[derive(Debug, Clone)]
pub struct EventWindow {
    pub start: DateTime<Utc>,
    pub key_presses: u64,
    pub mouse_distance: f64,
    pub clicks: u32,
}

impl EventWindow {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            start,
            key_presses: 0,
            mouse_distance: 0.0,
            clicks: 0,
        }
    }

    /// Add an event to this window.
    pub fn add_event(&mut self, event: SensorEvent) {
        match event {
            SensorEvent::Keyboard(e) => {
                if e.is_key_down {
                    self.key_presses += 1;
                }
            }
            SensorEvent::Mouse(e) => match e.event_type {
                MouseEventType::Move => {
                    self.mouse_distance += e.delta_magnitude.unwrap_or(0.0);
                }
                MouseEventType::Click => {
                    self.clicks = self.clicks.saturating_add(1);
                }
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.key_presses == 0 && self.mouse_distance == 0.0 && self.clicks == 0
    }

    /// Close the window at `end` and express it as a sample.
    ///
    /// Windows shorter than one second are stretched to one second so a
    /// burst right after the previous sample does not explode the rates.
    pub fn close(&self, end: DateTime<Utc>) -> Sample {
        let secs = ((end - self.start).num_milliseconds() as f64 / 1000.0).max(1.0);
        let minutes = secs / 60.0;
        Sample::new(
            end,
            self.key_presses as f64 / minutes,
            self.mouse_distance / minutes,
            self.clicks,
        )
    }
}

/// Sampler fed by a channel of input events.
pub struct EventSampler {
    sender: Sender<SensorEvent>,
    receiver: Receiver<SensorEvent>,
    window_start: DateTime<Utc>,
}

impl EventSampler {
    pub fn new() -> Self {
        let (sender, receiver) = bounded(CHANNEL_CAPACITY);
        Self {
            sender,
            receiver,
            window_start: Utc::now(),
        }
    }

    /// Handle for producers of input events.
    pub fn sender(&self) -> Sender<SensorEvent> {
        self.sender.clone()
    }

    /// Drain queued events into a window closing at `now`.
    pub fn sample_at(&mut self, now: DateTime<Utc>) -> Sample {
        let mut window = EventWindow::new(self.window_start);
        for event in self.receiver.try_iter() {
            window.add_event(event);
        }
        self.window_start = now;
        window.close(now)
    }
}

impl Default for EventSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSampler for EventSampler {
    fn sample(&mut self) -> Sample {
        self.sample_at(Utc::now())
    }

    fn name(&self) -> &'static str {
        "events"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::types::{KeyboardEvent, MouseEvent};
    use chrono::Duration;

    #[test]
    fn test_window_rates_per_minute() {
        let start = Utc::now();
        let mut window = EventWindow::new(start);
        for _ in 0..30 {
            window.add_event(SensorEvent::Keyboard(KeyboardEvent::new(true)));
            window.add_event(SensorEvent::Keyboard(KeyboardEvent::new(false)));
        }
        window.add_event(SensorEvent::Mouse(MouseEvent::movement(30.0, 40.0)));
        window.add_event(SensorEvent::Mouse(MouseEvent::click()));

        let sample = window.close(start + Duration::seconds(30));
        assert!((sample.kpm - 60.0).abs() < 1e-9);
        assert!((sample.mouse - 100.0).abs() < 1e-9);
        assert_eq!(sample.clicks, 1);
    }

    #[test]
    fn test_short_window_is_stretched() {
        let start = Utc::now();
        let mut window = EventWindow::new(start);
        window.add_event(SensorEvent::Keyboard(KeyboardEvent::new(true)));
        let sample = window.close(start);
        assert!((sample.kpm - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_sampler_drains_channel() {
        let mut sampler = EventSampler::new();
        let start = sampler.window_start;
        let sender = sampler.sender();
        for _ in 0..10 {
            sender
                .send(SensorEvent::Keyboard(KeyboardEvent::new(true)))
                .unwrap();
        }

        let sample = sampler.sample_at(start + Duration::seconds(60));
        assert!((sample.kpm - 10.0).abs() < 1e-9);

        let next = sampler.sample_at(start + Duration::seconds(120));
        assert!(next.is_idle());
    }

    #[test]
    fn test_silent_sampler_is_idle() {
        let mut sampler = EventSampler::new();
        assert!(sampler.sample().is_idle());
    }
}
