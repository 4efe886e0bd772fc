//! The periodic sampling task.
//!
//! Each tick samples activity, runs it through the engine, publishes the
//! result to the shared state and then, with the lock released, writes the
//! session log and delivers any due reminder.

use crate::audit::{SessionLog, SessionStats, SharedSessionStats};
use crate::collector::{MetricSampler, SensorEvent};
use crate::config::Config;
use crate::core::baseline::BaselineStore;
use crate::core::engine::{Assessment, EmotionEngine, Observation};
use crate::notify::{Alert, AlertGate, DesktopSink, LogSink, NotificationSink};
use crate::state::{CalibrationProgress, MonitorHandle, Publication, SharedMonitor};
use crossbeam_channel::Sender;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Tracks the config file so `emotion-monitor pause/resume` reach a running monitor.
struct ConfigWatch {
    path: PathBuf,
    paused: bool,
    focus_mode: bool,
}

/// Sole writer of the shared monitor state.
pub struct Monitor {
    sampler: Box<dyn MetricSampler>,
    engine: EmotionEngine,
    handle: SharedMonitor,
    gate: AlertGate,
    sink: Box<dyn NotificationSink>,
    stats: SharedSessionStats,
    session_log: Option<SessionLog>,
    config_watch: Option<ConfigWatch>,
    event_sender: Option<Sender<SensorEvent>>,
    interval: Duration,
}

impl Monitor {
    pub fn new(
        sampler: Box<dyn MetricSampler>,
        engine: EmotionEngine,
        handle: SharedMonitor,
        gate: AlertGate,
        sink: Box<dyn NotificationSink>,
        stats: SharedSessionStats,
        interval: Duration,
    ) -> Self {
        Self {
            sampler,
            engine,
            handle,
            gate,
            sink,
            stats,
            session_log: None,
            config_watch: None,
            event_sender: None,
            interval,
        }
    }

    /// Wire up a monitor, its shared handle and stats from configuration.
    pub fn from_config(config: &Config) -> Self {
        let engine = EmotionEngine::with_store(
            config.calibration_samples,
            BaselineStore::new(config.baseline_path()),
            config.policy,
        );

        let handle = MonitorHandle::new(
            config.history_capacity,
            engine.baseline(),
            calibration_of(&engine),
        )
        .shared();
        handle.set_paused(config.paused);

        let mut gate = AlertGate::new(config.cooldown);
        gate.set_focus_mode(config.focus_mode);

        let sink: Box<dyn NotificationSink> = if config.notifications {
            Box::new(DesktopSink)
        } else {
            Box::new(LogSink)
        };

        let stats = Arc::new(SessionStats::with_persistence(config.stats_path()));
        let built = config.source.build();

        let mut monitor = Self::new(
            built.sampler,
            engine,
            handle,
            gate,
            sink,
            stats,
            config.sample_interval,
        )
        .with_session_log(SessionLog::new(config.session_log_path(), config.log_format));
        monitor.event_sender = built.events;
        monitor
    }

    pub fn with_session_log(mut self, log: SessionLog) -> Self {
        self.session_log = Some(log);
        self
    }

    /// Follow `paused` and `focus_mode` changes written to a config file.
    pub fn watch_config(mut self, path: PathBuf, initial: &Config) -> Self {
        self.config_watch = Some(ConfigWatch {
            path,
            paused: initial.paused,
            focus_mode: initial.focus_mode,
        });
        self
    }

    pub fn handle(&self) -> SharedMonitor {
        self.handle.clone()
    }

    pub fn stats(&self) -> SharedSessionStats {
        self.stats.clone()
    }

    pub fn sampler_name(&self) -> &'static str {
        self.sampler.name()
    }

    /// Input side of a channel-fed sampler. `None` for self-driven samplers.
    pub fn event_sender(&self) -> Option<Sender<SensorEvent>> {
        self.event_sender.clone()
    }

    /// Run until cancelled, then persist the baseline and stats.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            sampler = self.sampler.name(),
            policy = self.engine.policy().as_str(),
            interval_secs = self.interval.as_secs(),
            "Monitor started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }

        self.shutdown();
    }

    /// One sampling step. Returns `None` while paused.
    pub async fn tick(&mut self) -> Option<Observation> {
        self.sync_config().await;

        if self.handle.take_recalibration_request() {
            self.engine.recalibrate();
            self.handle.set_calibration(calibration_of(&self.engine)).await;
        }

        if self.handle.is_paused() {
            return None;
        }

        let sample = self.sampler.sample();
        let observation = self.engine.observe(sample);
        let alert = observation
            .classification()
            .and_then(|c| self.gate.evaluate(c.emotion, sample.timestamp));

        self.handle
            .publish(Publication {
                observation,
                calibration: calibration_of(&self.engine),
                alert_fired_at: alert.as_ref().map(|a| a.fired_at),
            })
            .await;

        self.record(&observation);
        if let Some(log) = self.session_log.clone() {
            append_session_log(log, observation).await;
        }
        if let Some(ref alert) = alert {
            self.deliver(alert);
        }

        Some(observation)
    }

    fn record(&self, observation: &Observation) {
        match observation.assessment {
            Assessment::Calibrating { collected, target } => {
                self.stats.record_calibration_sample();
                tracing::info!(
                    kpm = observation.sample.kpm,
                    mouse = observation.sample.mouse,
                    clicks = observation.sample.clicks,
                    "Calibrating ({collected}/{target})"
                );
            }
            Assessment::Classified(c) => {
                self.stats.record_classified(c.emotion);
                tracing::info!(
                    kpm = observation.sample.kpm,
                    mouse = observation.sample.mouse,
                    clicks = observation.sample.clicks,
                    "{} ({}%)",
                    c.emotion,
                    c.confidence
                );
            }
        }
    }

    fn deliver(&self, alert: &Alert) {
        match self.sink.deliver(alert) {
            Ok(()) => self.stats.record_alert(true),
            Err(e) => {
                tracing::warn!("Notification failed: {e}");
                self.stats.record_alert(false);
            }
        }
    }

    async fn sync_config(&mut self) {
        let Some(path) = self.config_watch.as_ref().map(|w| w.path.clone()) else {
            return;
        };

        let config = match tokio::task::spawn_blocking(move || Config::load_from(&path)).await {
            Ok(Ok(config)) => config,
            Ok(Err(e)) => {
                tracing::debug!("Skipping config reload: {e}");
                return;
            }
            Err(e) => {
                tracing::warn!("Config reload task failed: {e}");
                return;
            }
        };

        let Some(ref mut watch) = self.config_watch else {
            return;
        };

        if config.paused != watch.paused {
            watch.paused = config.paused;
            self.handle.set_paused(config.paused);
        }
        if config.focus_mode != watch.focus_mode {
            watch.focus_mode = config.focus_mode;
            self.gate.set_focus_mode(config.focus_mode);
            tracing::info!(focus_mode = config.focus_mode, "Focus mode changed");
        }
    }

    fn shutdown(&self) {
        if let Err(e) = self.engine.persist() {
            tracing::warn!("Could not save baseline: {e}");
        }
        if let Err(e) = self.stats.save() {
            tracing::warn!("Could not save session stats: {e}");
        }
        tracing::info!("Monitor stopped");
    }
}

async fn append_session_log(log: SessionLog, observation: Observation) {
    let path = log.path().to_path_buf();
    match tokio::task::spawn_blocking(move || log.append(&observation)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("Could not write session log {:?}: {e}", path),
        Err(e) => tracing::warn!("Session log task failed: {e}"),
    }
}

fn calibration_of(engine: &EmotionEngine) -> CalibrationProgress {
    let (collected, target) = engine.calibration_progress();
    CalibrationProgress {
        calibrating: engine.is_calibrating(),
        collected,
        target,
    }
}

/// Await a long-running task and cancel everything else when it ends.
///
/// A task that returns before cancellation, or panics, is logged as an error
/// so state updates never stop silently.
pub async fn supervise(name: &'static str, task: JoinHandle<()>, cancel: CancellationToken) {
    match task.await {
        Ok(()) if cancel.is_cancelled() => tracing::debug!("{name} task stopped"),
        Ok(()) => tracing::error!("{name} task exited unexpectedly"),
        Err(e) if e.is_panic() => tracing::error!("{name} task panicked: {e}"),
        Err(e) => tracing::error!("{name} task failed: {e}"),
    }
    cancel.cancel();
}
