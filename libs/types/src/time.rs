//! Wall-clock timestamps

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as nanoseconds since the Unix epoch.
///
/// Returns 0 if the system clock reads before the epoch rather than
/// panicking; callers treat timestamps as display metadata, not ordering
/// authority.
pub fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_after_2020() {
        // 2020-01-01 in nanoseconds
        assert!(now_ns() > 1_577_836_800_000_000_000);
    }
}
