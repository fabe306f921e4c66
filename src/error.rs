//! Shared error classification.
//!
//! Every error enum in the crate exposes a stable `E_*` code and whether the
//! failure is worth retrying. Codes go into log fields; users never see them.

pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
