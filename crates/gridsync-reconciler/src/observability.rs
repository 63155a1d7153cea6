//! Log output for processes driving a [`Reconciler`](crate::Reconciler).
//!
//! The configured level applies to the gridsync crates only; everything else
//! logs at `warn` so that remote client internals stay quiet. `RUST_LOG`, when
//! set, replaces the whole filter.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

const GRIDSYNC_TARGETS: [&str; 4] = [
    "gridsync_core",
    "gridsync_client",
    "gridsync_client_memory",
    "gridsync_reconciler",
];

static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Filter directives for `level`, e.g. `warn,gridsync_reconciler=debug,...`.
fn directives(level: &str) -> String {
    let mut out = String::from("warn");
    for target in GRIDSYNC_TARGETS {
        out.push(',');
        out.push_str(target);
        out.push('=');
        out.push_str(level);
    }
    out
}

/// Installs the global subscriber. Binaries call this once; the library never does.
pub fn init_tracing_with_level(level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level))),
        Err(_) => EnvFilter::new(directives(level)),
    };

    let (filter, handle) = reload::Layer::new(filter);
    let _ = FILTER_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

/// Changes the level of the gridsync crates at runtime, e.g. after the
/// `logging.level` setting was reloaded. Returns whether a subscriber was updated.
pub fn apply_logging_level(level: &str) -> bool {
    let Some(handle) = FILTER_HANDLE.get() else {
        return false;
    };
    match handle.modify(|f| *f = EnvFilter::new(directives(level))) {
        Ok(()) => {
            tracing::info!(level, "log level changed");
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to change log level");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_applies_to_gridsync_crates_only() {
        let d = directives("debug");
        assert!(d.starts_with("warn,"));
        assert!(d.contains("gridsync_reconciler=debug"));
        assert!(d.contains("gridsync_client_memory=debug"));
        assert!(EnvFilter::try_new(&d).is_ok());
    }

    #[test]
    fn level_changes_after_init() {
        init_tracing_with_level("info");
        assert!(apply_logging_level("debug"));
        assert!(apply_logging_level("trace"));
    }
}
