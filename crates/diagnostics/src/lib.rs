// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Structured logging shared by every Estuary crate.
//!
//! Usage:
//! - Set ESTUARY_LOG=off (default) - no logs
//! - Set ESTUARY_LOG=info - pages written, assets copied
//! - Set ESTUARY_LOG=debug - per-template and per-filter detail

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable selecting the minimum log level.
pub const LOG_ENV: &str = "ESTUARY_LOG";

static INIT: Once = Once::new();

/// Minimum level parsed from [`LOG_ENV`]. `None` means logging is off.
fn parse_level(value: &str) -> Result<Option<emit::Level>, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "off" => Ok(None),
        "debug" => Ok(Some(emit::Level::Debug)),
        "info" => Ok(Some(emit::Level::Info)),
        "warn" => Ok(Some(emit::Level::Warn)),
        "error" => Ok(Some(emit::Level::Error)),
        other => Err(other.to_string()),
    }
}

/// Initialize diagnostics based on the ESTUARY_LOG environment variable.
///
/// Call once at startup; later calls are ignored.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let raw = std::env::var(LOG_ENV).unwrap_or_default();

        let level = match parse_level(&raw) {
            Ok(None) => return,
            Ok(Some(level)) => level,
            Err(unknown) => {
                // Bootstrap warning, the emitter isn't running yet
                eprintln!("Warning: Unknown {} value '{}', using 'info'", LOG_ENV, unknown);
                emit::Level::Info
            }
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        // Keep the runtime alive for the life of the process
        std::mem::forget(rt);
    });
}

/// Log detailed diagnostics (template names, filter fallbacks, parsed config).
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log basic operations users may want to see (pages written, assets copied).
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log recoverable conditions (missing passthrough sources, unknown settings).
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures that stop a build.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

pub use init_diagnostics as init;
