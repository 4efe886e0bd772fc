//! Timing-only input event types.
//!
//! These types capture ONLY timing and magnitude information - never key
//! content or cursor coordinates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A keyboard event capturing only timing information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyboardEvent {
    /// Timestamp when the event occurred
    pub timestamp: DateTime<Utc>,
    /// Whether this is a key press (true) or release (false)
    pub is_key_down: bool,
}

impl KeyboardEvent {
    pub fn new(is_key_down: bool) -> Self {
        Self {
            timestamp: Utc::now(),
            is_key_down,
        }
    }
}

/// Mouse event type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseEventType {
    Move,
    Click,
}

/// A mouse event capturing only timing and movement magnitude.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MouseEvent {
    /// Timestamp when the event occurred
    pub timestamp: DateTime<Utc>,
    /// Type of mouse event
    pub event_type: MouseEventType,
    /// Distance moved (Move events only)
    pub delta_magnitude: Option<f64>,
}

impl MouseEvent {
    /// Create a mouse move event from a relative delta.
    pub fn movement(delta_x: f64, delta_y: f64) -> Self {
        let magnitude = (delta_x * delta_x + delta_y * delta_y).sqrt();
        Self {
            timestamp: Utc::now(),
            event_type: MouseEventType::Move,
            delta_magnitude: Some(magnitude),
        }
    }

    pub fn click() -> Self {
        Self {
            timestamp: Utc::now(),
            event_type: MouseEventType::Click,
            delta_magnitude: None,
        }
    }
}

/// Unified event type for the collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SensorEvent {
    Keyboard(KeyboardEvent),
    Mouse(MouseEvent),
}

impl SensorEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SensorEvent::Keyboard(e) => e.timestamp,
            SensorEvent::Mouse(e) => e.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_movement_magnitude() {
        let event = MouseEvent::movement(3.0, 4.0);
        assert_eq!(event.event_type, MouseEventType::Move);
        assert!((event.delta_magnitude.unwrap() - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_click_has_no_magnitude() {
        let event = MouseEvent::click();
        assert_eq!(event.event_type, MouseEventType::Click);
        assert!(event.delta_magnitude.is_none());
    }
}
