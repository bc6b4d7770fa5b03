//! Logging macros for the graph engine with verbosity level control.
//!
//! Zero-cost when disabled: each macro is a single integer comparison
//! against `EngineConfig::verbosity`. Levels:
//! - 0: SILENT
//! - 1: CHANGES (reference corrections, unresolved references, violation summaries)
//! - 2: CHECKS (individual invariant checks, duration fallbacks)
//! - 3: DEBUG (critical path recurrence internals)

/// Verbosity level constants.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at CHANGES level (verbosity >= 1).
///
/// Used for: rewritten references, references left unresolved, validation outcome.
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            eprintln!("[recipe_graph] {}", format_args!($($arg)*));
        }
    };
}

/// Log at CHECKS level (verbosity >= 2).
///
/// Used for: each violation as it is recorded, steps falling back to a default duration.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            eprintln!("[recipe_graph] {}", format_args!($($arg)*));
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
///
/// Used for: earliest-finish recurrence, critical predecessor choices.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!("[recipe_graph] {}", format_args!($($arg)*));
        }
    };
}
