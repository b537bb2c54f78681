//! Epoch time helper for account modification stamps.

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the POSIX epoch, saturating at zero if the clock is set
/// before 1970.
pub fn seconds_since_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
