//! Logging utilities
//!
//! The crate logs through the `log` facade: lifecycle transitions at `debug`,
//! per-event dispatch at `trace`, absorbed failures at `warn`/`error`.
//! Applications pick the backend; these helpers install `env_logger`, which
//! reads its filter from `RUST_LOG`.

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Panics if a global logger is already installed. Use [`try_init`] where
/// that may legitimately happen (tests, embedding applications).
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system, ignoring an already-installed logger
///
/// Returns `true` if this call installed the logger.
pub fn try_init() -> bool {
    env_logger::builder().is_test(cfg!(test)).try_init().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_init_is_repeatable() {
        try_init();
        assert!(!try_init());
    }
}
