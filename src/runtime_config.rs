//! # Runtime Configuration Module
//!
//! Environment-variable configuration for runtime behavior.
//!
//! ## Environment Variables
//!
//! ### `ROUTEWIRE_STACK_SIZE`
//!
//! Stack size for the coroutines serving requests, in decimal (`32768`) or
//! hexadecimal (`0x8000`). Default: `0x8000` (32 KB). Total memory is
//! `stack_size × concurrent_coroutines`; too small overflows, too large
//! wastes memory.
//!
//! ### `ROUTEWIRE_PAGE_SIZE`
//!
//! Page bound for the in-memory message store's `list` operation.
//! Default: 10.

use std::env;

use crate::message::DEFAULT_PAGE_SIZE;

/// Default coroutine stack size: 32 KB.
pub const DEFAULT_STACK_SIZE: usize = 0x8000;

/// Runtime configuration loaded from environment variables.
///
/// Load this at startup using [`RuntimeConfig::from_env()`].
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for request-serving coroutines, in bytes
    pub stack_size: usize,
    /// Page bound for the message store's list operation
    pub page_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = env::var("ROUTEWIRE_STACK_SIZE")
            .ok()
            .and_then(|s| parse_size(&s))
            .unwrap_or(DEFAULT_STACK_SIZE);
        let page_size = env::var("ROUTEWIRE_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self {
            stack_size,
            page_size,
        }
    }
}

/// Parse a decimal (`32768`) or hexadecimal (`0x8000`) size value.
fn parse_size(s: &str) -> Option<usize> {
    if let Some(hex) = s.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}
