//! Logging for the shellfs workspace.
//!
//! Logging is off unless the `SHELLFS_LOG` environment variable selects a
//! level:
//! - `SHELLFS_LOG=off` (default) - no logs
//! - `SHELLFS_LOG=error` / `warn` - problems only
//! - `SHELLFS_LOG=info` - mutations (copy, move, remove, link)
//! - `SHELLFS_LOG=debug` - path resolution and symlink traversal

use std::sync::Once;

// Re-export emit so the macros below resolve in dependent crates
pub use emit;

/// Name of the environment variable holding the log level.
pub const LOG_ENV: &str = "SHELLFS_LOG";

static INIT: Once = Once::new();

/// Maps a `SHELLFS_LOG` value onto a minimum level. `None` means logging is off.
///
/// Unknown values fall back to `Info` so a typo still produces output.
#[must_use]
pub fn parse_level(value: &str) -> Option<emit::Level> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "off" => None,
        "error" => Some(emit::Level::Error),
        "warn" => Some(emit::Level::Warn),
        "debug" => Some(emit::Level::Debug),
        _ => Some(emit::Level::Info),
    }
}

/// Initialize diagnostics based on the `SHELLFS_LOG` environment variable.
///
/// Safe to call more than once; only the first call has any effect.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let value = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
        let Some(level) = parse_level(&value) else {
            return;
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        // The runtime lives for the rest of the process
        std::mem::forget(rt);
    });
}

/// Log mutations of the tree (copies, moves, removals, new links).
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log resolution details: visited segments, symlink hops, chosen nodes.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log conditions worth noticing that do not fail the operation,
/// such as symlinks invalidated by a removal.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures of ambient work (configuration, snapshots).
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

pub use init_diagnostics as init;
