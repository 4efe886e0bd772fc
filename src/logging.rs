//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Filter used when neither `--log-level` nor `RUST_LOG` is given.
pub const DEFAULT_FILTER: &str = "emotion_monitor=info";

/// Build the filter: an explicit level wins over `RUST_LOG`.
pub fn filter(level: Option<&str>) -> EnvFilter {
    match level {
        Some(level) => EnvFilter::new(format!(
            "{}={level}",
            env!("CARGO_PKG_NAME").replace('-', "_")
        )),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(level: Option<&str>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_level_targets_crate() {
        assert_eq!(filter(Some("debug")).to_string(), "emotion_monitor=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(Some("warn"));
        init(Some("info"));
    }
}
