//! Append-only session log, one line per sample.
//!
//! The monitor never reads this file back.

use crate::core::engine::{Assessment, Observation};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

const CSV_HEADER: &str = "timestamp,state,confidence,kpm,mouse,clicks,avg_kpm,avg_mouse";

/// Line format for the session log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Csv,
}

impl LogFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            LogFormat::Text => "session_log.txt",
            LogFormat::Csv => "session_log.csv",
        }
    }
}

/// Writer for the session log file.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
    format: LogFormat,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>, format: LogFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one observation. Creates the file (and CSV header) if needed.
    pub fn append(&self, observation: &Observation) -> Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let is_new = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if is_new && self.format == LogFormat::Csv {
            writeln!(file, "{CSV_HEADER}")?;
        }
        writeln!(file, "{}", self.format_line(observation))
    }

    fn format_line(&self, observation: &Observation) -> String {
        match self.format {
            LogFormat::Text => text_line(observation),
            LogFormat::Csv => csv_line(observation),
        }
    }
}

fn text_line(obs: &Observation) -> String {
    let ts = obs.sample.timestamp.with_timezone(&Local).format("%H:%M:%S");
    let state = match obs.assessment {
        Assessment::Calibrating { collected, target } => {
            format!("Calibrating ({collected}/{target})")
        }
        Assessment::Classified(c) => format!("{} ({}%)", c.emotion, c.confidence),
    };
    format!(
        "[{ts}] {state} KPM={:.0} Mouse={:.0} Clicks={}",
        obs.sample.kpm, obs.sample.mouse, obs.sample.clicks
    )
}

fn csv_line(obs: &Observation) -> String {
    let (state, confidence) = match obs.assessment {
        Assessment::Calibrating { .. } => ("Calibrating".to_string(), 0),
        Assessment::Classified(c) => (c.emotion.to_string(), c.confidence),
    };
    format!(
        "{},{},{},{:.1},{:.1},{},{:.2},{:.2}",
        obs.sample.timestamp.to_rfc3339(),
        state,
        confidence,
        obs.sample.kpm,
        obs.sample.mouse,
        obs.sample.clicks,
        obs.baseline.avg_kpm,
        obs.baseline.avg_mouse
    )
}
