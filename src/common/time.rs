//! Simple time helpers used by multiple services.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current timestamp in milliseconds since the Unix epoch.
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Milliseconds elapsed since `start`, clamped to zero on clock skew.
pub fn since_ms(start: u128) -> u128 {
    now_ms().saturating_sub(start)
}
