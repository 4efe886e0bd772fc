//! Fire-and-forget delivery of alerts.

use crate::notify::gate::Alert;

/// Errors delivering a notification.
#[derive(Debug)]
pub enum NotifyError {
    /// The notifier command could not be started
    Spawn(std::io::Error),
    /// Delivery is not available on this host
    Unsupported(String),
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifyError::Spawn(e) => write!(f, "could not start notifier: {e}"),
            NotifyError::Unsupported(msg) => write!(f, "notifications unsupported: {msg}"),
        }
    }
}

impl std::error::Error for NotifyError {}

/// Something that can show an alert to the user.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, alert: &Alert) -> Result<(), NotifyError>;
}

/// Writes alerts to the log only.
#[derive(Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&self, alert: &Alert) -> Result<(), NotifyError> {
        tracing::info!(emotion = %alert.emotion, "{}: {}", alert.title, alert.body);
        Ok(())
    }
}

/// Shows alerts through the desktop's notification command.
///
/// Uses `osascript` on macOS and `notify-send` elsewhere. The child process
/// is reaped on a background thread.
#[derive(Debug, Default)]
pub struct DesktopSink;

impl DesktopSink {
    fn command(alert: &Alert) -> Result<std::process::Command, NotifyError> {
        if cfg!(target_os = "macos") {
            let script = format!(
                "display notification \"{}\" with title \"{}\"",
                escape_applescript(&alert.body),
                escape_applescript(&alert.title)
            );
            let mut command = std::process::Command::new("osascript");
            command.arg("-e").arg(script);
            Ok(command)
        } else if cfg!(unix) {
            let mut command = std::process::Command::new("notify-send");
            command.arg(&alert.title).arg(&alert.body);
            Ok(command)
        } else {
            Err(NotifyError::Unsupported(std::env::consts::OS.to_string()))
        }
    }
}

impl NotificationSink for DesktopSink {
    fn deliver(&self, alert: &Alert) -> Result<(), NotifyError> {
        let mut command = Self::command(alert)?;
        command
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());
        let mut child = command.spawn().map_err(NotifyError::Spawn)?;
        tracing::debug!(pid = child.id(), "Notification dispatched");
        // Reap off-thread.
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Emotion;
    use chrono::Utc;

    #[test]
    fn test_log_sink_accepts_alerts() {
        let alert = Alert::for_emotion(Emotion::Stressed, Utc::now()).unwrap();
        assert!(LogSink.deliver(&alert).is_ok());
    }

    #[test]
    fn test_applescript_escaping() {
        assert_eq!(escape_applescript(r#"say "hi""#), r#"say \"hi\""#);
    }
}
