//! Logging conventions for sieve.
//!
//! All events go through `tracing` with target "sieve" and carry a
//! `component` and an `event` field. The library never installs a
//! subscriber; applications configure one themselves.
//!
//! - `event`: snake_case event name (required)
//! - `component`: evaluator or layer emitting the event (e.g. "select", "coerce")
//! - Use `%` for Display, `?` for Debug formatting

/// Target for all sieve log events.
pub(crate) const SIEVE_TARGET: &str = "sieve";

/// Macro for debug-level log events.
///
/// # Example
/// ```ignore
/// log_debug!(
///     component = "select",
///     event = "select_finished",
///     rows = table.num_rows(),
/// );
/// ```
macro_rules! log_debug {
    ($($field:tt)*) => {
        ::tracing::debug!(target: $crate::observability::SIEVE_TARGET, $($field)*)
    };
}

/// Macro for trace-level log events.
macro_rules! log_trace {
    ($($field:tt)*) => {
        ::tracing::trace!(target: $crate::observability::SIEVE_TARGET, $($field)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_trace;
