//! Emotion Monitor CLI
//!
//! Samples activity, labels it and serves the result to a local dashboard.

use anyhow::Context;
use clap::{Parser, Subcommand};
use emotion_monitor::{
    audit::stats::PersistedStats,
    collector::SamplerKind,
    config::Config,
    core::{baseline::BaselineStore, classifier::ClassificationPolicy},
    logging,
    monitor::{supervise, Monitor},
    server::{self, ServerConfig},
    ui, DISCLAIMER, VERSION,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "emotion-monitor")]
#[command(version = VERSION)]
#[command(about = "Activity-based emotion monitor with break reminders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start monitoring
    Start {
        /// Sample source (only simulated is driven from the CLI)
        #[arg(long)]
        source: Option<SamplerKind>,

        /// Classification policy (relative or absolute)
        #[arg(long)]
        policy: Option<ClassificationPolicy>,

        /// Dashboard API port
        #[arg(long)]
        port: Option<u16>,

        /// Seconds between samples
        #[arg(long)]
        interval: Option<u64>,

        /// Log reminders instead of showing desktop notifications
        #[arg(long)]
        no_notify: bool,

        /// Suppress all reminders
        #[arg(long)]
        focus_mode: bool,

        /// Log level for this crate (overrides RUST_LOG)
        #[arg(long)]
        log_level: Option<String>,
    },

    /// Pause sampling
    Pause,

    /// Resume sampling
    Resume,

    /// Show baseline and cumulative statistics
    Status,

    /// Discard the stored baseline so the next start recalibrates
    Recalibrate,

    /// Display the disclaimer
    Disclaimer,

    /// Show configuration
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start {
            source,
            policy,
            port,
            interval,
            no_notify,
            focus_mode,
            log_level,
        } => {
            logging::init(log_level.as_deref());
            let overrides = StartOverrides {
                source,
                policy,
                port,
                interval,
                no_notify,
                focus_mode,
            };
            cmd_start(overrides).await
        }
        Commands::Pause => cmd_set_paused(true),
        Commands::Resume => cmd_set_paused(false),
        Commands::Status => cmd_status(),
        Commands::Recalibrate => cmd_recalibrate(),
        Commands::Disclaimer => {
            println!("{DISCLAIMER}");
            Ok(())
        }
        Commands::Config => cmd_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Flags given to `start` that override the config file.
struct StartOverrides {
    source: Option<SamplerKind>,
    policy: Option<ClassificationPolicy>,
    port: Option<u16>,
    interval: Option<u64>,
    no_notify: bool,
    focus_mode: bool,
}

impl StartOverrides {
    fn apply(self, config: &mut Config) {
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(secs) = self.interval {
            config.sample_interval = Duration::from_secs(secs);
        }
        if self.no_notify {
            config.notifications = false;
        }
        if self.focus_mode {
            config.focus_mode = true;
        }
    }
}

async fn cmd_start(overrides: StartOverrides) -> anyhow::Result<()> {
    println!("Emotion Monitor v{VERSION}");
    println!("{DISCLAIMER}");

    let config_path = Config::config_path();
    let file_config = Config::load_from(&config_path).unwrap_or_else(|e| {
        tracing::warn!("Could not load config, using defaults: {e}");
        Config::default()
    });
    let mut config = file_config.clone();
    overrides.apply(&mut config);
    config.validate()?;
    if config.source.needs_producer() {
        anyhow::bail!(
            "the events source is fed by an in-process producer through \
             Monitor::event_sender and has no input here; use --source simulated"
        );
    }

    if let Err(e) = config.ensure_directories() {
        tracing::warn!("Could not create directories: {e}");
    }

    let monitor = Monitor::from_config(&config).watch_config(config_path, &file_config);
    let handle = monitor.handle();
    let stats = monitor.stats();

    println!("Starting monitor...");
    println!("  Source: {}", monitor.sampler_name());
    println!("  Policy: {}", config.policy.as_str());
    println!("  Sample interval: {}s", config.sample_interval.as_secs());
    println!(
        "  Notifications: {}",
        if config.notifications { "desktop" } else { "log only" }
    );
    println!("  Focus mode: {}", config.focus_mode);
    println!("  Session ID: {}", handle.session_id());
    if config.paused {
        println!();
        println!("Monitoring is currently paused.");
        println!("Run `emotion-monitor resume` to start sampling.");
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    ctrlc::set_handler(move || on_signal.cancel()).context("Error setting Ctrl+C handler")?;

    let (addr, server_task) = server::run(ServerConfig::new(config.port), handle.clone(), cancel.clone())
        .await
        .with_context(|| format!("Could not start dashboard API on port {}", config.port))?;
    println!("  Dashboard API: http://{addr}/api/stats");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let monitor_task = tokio::spawn(monitor.run(cancel.clone()));
    let status_task = tokio::spawn(ui::run_status_line(
        handle,
        config.status_refresh(),
        cancel.clone(),
    ));

    tokio::join!(
        supervise("monitor", monitor_task, cancel.clone()),
        supervise("server", server_task, cancel.clone()),
        supervise("status line", status_task, cancel.clone()),
    );

    println!();
    println!("{}", stats.summary());
    Ok(())
}

fn cmd_set_paused(paused: bool) -> anyhow::Result<()> {
    let mut config = Config::load().unwrap_or_default();
    config.paused = paused;
    config.save().context("Error saving config")?;
    if paused {
        println!("Monitoring paused. Use 'emotion-monitor resume' to continue.");
    } else {
        println!("Monitoring resumed.");
    }
    Ok(())
}

fn cmd_status() -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("Emotion Monitor Status");
    println!("======================");
    println!();

    println!("Configuration:");
    println!("  Source: {:?}", config.source);
    println!("  Policy: {}", config.policy.as_str());
    println!("  Sample interval: {}s", config.sample_interval.as_secs());
    println!("  Paused: {}", config.paused);
    println!("  Focus mode: {}", config.focus_mode);
    println!();

    match BaselineStore::new(config.baseline_path()).load() {
        Ok(Some(baseline)) => {
            println!("Baseline:");
            println!("  Avg KPM: {:.1}", baseline.avg_kpm);
            println!("  Avg mouse: {:.1}", baseline.avg_mouse);
        }
        Ok(None) => println!("No baseline yet. Calibration runs on next start."),
        Err(e) => println!("Stored baseline is unreadable ({e}). Calibration runs on next start."),
    }
    println!();

    let stats_path = config.stats_path();
    match std::fs::read_to_string(&stats_path) {
        Ok(content) => match serde_json::from_str::<PersistedStats>(&content) {
            Ok(stats) => {
                let [focused, normal, tired, stressed, idle] = stats.emotions;
                println!("Cumulative Statistics:");
                println!(
                    "  Samples: {} ({} calibration)",
                    stats.samples, stats.calibration_samples
                );
                println!(
                    "  Focused: {focused}  Normal: {normal}  Tired: {tired}  Stressed: {stressed}  Idle: {idle}"
                );
                println!(
                    "  Alerts: {} ({} failed)",
                    stats.alerts_fired, stats.alerts_failed
                );
                println!("  Last updated: {}", stats.last_updated.to_rfc3339());
            }
            Err(e) => println!("Session statistics are unreadable: {e}"),
        },
        Err(_) => println!("No previous session data found."),
    }
    Ok(())
}

fn cmd_recalibrate() -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();
    let store = BaselineStore::new(config.baseline_path());
    store.clear().context("Could not remove stored baseline")?;
    println!("Baseline cleared. Calibration runs on next start.");
    println!("Use POST /api/recalibrate to recalibrate a running monitor.");
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
