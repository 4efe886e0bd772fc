//! Break reminders.
//!
//! The gate decides when a reminder is due; sinks deliver it. Delivery
//! failures are reported to the caller, which logs and moves on.

pub mod gate;
pub mod sink;

pub use gate::{Alert, AlertGate, CooldownPolicy};
pub use sink::{DesktopSink, LogSink, NotificationSink, NotifyError};
