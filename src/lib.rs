//! Emotion Monitor - activity-based break reminders.
//!
//! This library samples keyboard and mouse activity rates, keeps an adaptive
//! per-user baseline and labels each sample with a heuristic emotional state.
//!
//! # Scope
//!
//! - **Rates only**: samples carry keystrokes per minute, mouse distance and
//!   click counts, never key content or cursor position
//! - **Local only**: the dashboard API binds to 127.0.0.1
//! - **Heuristic labels**: classifications are activity patterns, not a
//!   psychological assessment
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Emotion Monitor                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │   Sampler   │──▶│   Engine    │──▶│MonitorHandle│──▶ HTTP│
//! │  │ (15s ticks) │   │(baseline +  │   │ (one lock)  │──▶ TTY │
//! │  └─────────────┘   │ classifier) │   └─────────────┘       │
//! │                    └─────────────┘          │              │
//! │                           │                 ▼              │
//! │                           ▼          ┌─────────────┐       │
//! │                    ┌─────────────┐   │ Alert gate  │       │
//! │                    │ Session log │   │ + notifier  │       │
//! │                    └─────────────┘   └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use emotion_monitor::{Config, Monitor};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() {
//! let monitor = Monitor::from_config(&Config::default());
//! let handle = monitor.handle();
//! let cancel = CancellationToken::new();
//! tokio::spawn(monitor.run(cancel.clone()));
//!
//! let snapshot = handle.snapshot().await;
//! println!("{:?}", snapshot.latest);
//! # }
//! ```

pub mod audit;
pub mod collector;
pub mod config;
pub mod core;
pub mod logging;
pub mod monitor;
pub mod notify;
pub mod server;
pub mod state;
pub mod ui;

// Re-export key types at crate root for convenience
pub use audit::{SessionLog, SessionStats, SharedSessionStats, StatsSnapshot};
pub use collector::{MetricSampler, SamplerKind, SimulatedSampler};
pub use config::{Config, ConfigError};
pub use core::{
    classify, Baseline, BaselineTracker, ClassificationPolicy, Emotion, EmotionEngine,
    HistoryBuffer, Observation, Sample,
};
pub use monitor::{supervise, Monitor};
pub use notify::{Alert, AlertGate, CooldownPolicy, NotificationSink};
pub use state::{MonitorHandle, MonitorSnapshot, SharedMonitor};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Disclaimer shown on first start and by `emotion-monitor disclaimer`.
pub const DISCLAIMER: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║                 EMOTION MONITOR - DISCLAIMER                     ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  Labels such as "Focused" or "Stressed" are guesses made from    ║
║  typing and mouse activity rates. They are NOT a medical or      ║
║  psychological assessment.                                       ║
║                                                                  ║
║  ✓ WHAT IS MEASURED:                                             ║
║    • Keystrokes per minute (counts only)                         ║
║    • Mouse movement per minute (distance only)                   ║
║    • Clicks per sampling window                                  ║
║                                                                  ║
║  ✗ WHAT IS NEVER RECORDED:                                       ║
║    • Which keys you press                                        ║
║    • Where your cursor is                                        ║
║    • What applications or content you use                        ║
║                                                                  ║
║  Everything stays on this machine. The dashboard API listens     ║
║  on 127.0.0.1 only.                                              ║
║                                                                  ║
║  View session statistics anytime with:                           ║
║    emotion-monitor status                                        ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disclaimer_contents() {
        assert!(DISCLAIMER.contains("DISCLAIMER"));
        assert!(DISCLAIMER.contains("NOT a medical"));
        assert!(DISCLAIMER.contains("Which keys you press"));
    }
}
