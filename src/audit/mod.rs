//! Audit trail for the Emotion Monitor.
//!
//! This module provides the write-only session log and the persisted
//! counters reported by `emotion-monitor status`.

pub mod session_log;
pub mod stats;

// Re-export commonly used types
pub use session_log::{LogFormat, SessionLog};
pub use stats::{SessionStats, SharedSessionStats, StatsSnapshot};
