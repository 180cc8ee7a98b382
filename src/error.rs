//! Shared error-code contract.
//!
//! Every module error enum implements [`ErrorCode`] so callers (the HTTP
//! layer, the save orchestrator's user feedback, logs) can report a stable,
//! grepable code and decide whether a retry makes sense.

/// Grepable error code and retryable flag for structured error reporting.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
