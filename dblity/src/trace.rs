//! Checker tracing.
//!
//! Set `DBLITY_TRACE=1` to print every resolution decision of the flow
//! checker to stderr. Only available in debug builds; release builds compile
//! the calls away.

/// Environment variable that enables tracing.
pub const TRACE_ENV_VAR: &str = "DBLITY_TRACE";

/// Check if tracing is enabled via the `DBLITY_TRACE` env var.
#[cfg(debug_assertions)]
pub(crate) fn trace_enabled() -> bool {
    use std::sync::OnceLock;
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var(TRACE_ENV_VAR).is_ok())
}

#[cfg(not(debug_assertions))]
#[inline(always)]
pub(crate) fn trace_enabled() -> bool {
    false
}

/// Emit one trace line without relying on `eprintln!`.
pub(crate) fn trace_log(args: std::fmt::Arguments<'_>) {
    use std::io::Write;
    let _ = writeln!(std::io::stderr(), "[DBLITY] {args}");
}
