// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Logging setup shared by the rdslogs crates.
//!
//! The export function has no other operator trail than its logs, so output
//! is on by default. The level comes from the `RDSLOGS_LOG` environment
//! variable:
//! - `RDSLOGS_LOG=off` - no logs
//! - `RDSLOGS_LOG=error` / `warn` - failures only
//! - `RDSLOGS_LOG=info` (default) - one line per watermark, file and upload
//! - `RDSLOGS_LOG=debug` - pagination detail

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable selecting the log level
pub const LOG_ENV: &str = "RDSLOGS_LOG";

static INIT: Once = Once::new();

/// Parse a level name. `None` means logging is switched off.
///
/// Unknown names fall back to `Info`; the caller reports the fallback.
pub fn parse_level(value: &str) -> Result<Option<emit::Level>, emit::Level> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" => Ok(None),
        "error" => Ok(Some(emit::Level::Error)),
        "warn" => Ok(Some(emit::Level::Warn)),
        "" | "info" => Ok(Some(emit::Level::Info)),
        "debug" => Ok(Some(emit::Level::Debug)),
        _ => Err(emit::Level::Info),
    }
}

/// Initialize logging from `RDSLOGS_LOG`.
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let value = std::env::var(LOG_ENV).unwrap_or_else(|_| "info".to_string());

        let (level, unknown) = match parse_level(&value) {
            Ok(None) => return,
            Ok(Some(level)) => (level, false),
            Err(level) => (level, true),
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        if unknown {
            emit::warn!("Unknown {env} value {value}, using info", env: LOG_ENV);
        }

        // The runtime must outlive every emitting thread; the process exits without flushing otherwise.
        std::mem::forget(rt);
    });
}

// Re-exported rather than wrapped: emit resolves template holes like
// `{file}` against the caller's locals, which a `macro_rules!` layer hides.
// - `info!`: normal progress (watermark reads, files copied, uploads)
// - `debug!`: page and byte counts
// - `warn!`: conditions that don't stop the run
// - `error!`: failures that end the run
pub use emit::{debug, error, info, warn};

/// Re-export the init function for convenience
pub use init_diagnostics as init;
