//! Test helper utilities
//!
//! The dispatcher runs on its own OS thread, so most tests poll for an
//! observable effect instead of awaiting it.

use std::time::{Duration, Instant};

/// Poll `condition` until it holds or `timeout` elapses
pub fn wait_for<F>(mut condition: F, timeout: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    condition()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_wait_for_condition() {
        let counter = AtomicUsize::new(0);
        let result = wait_for(
            || counter.fetch_add(1, Ordering::SeqCst) >= 3,
            Duration::from_secs(1),
        );
        assert!(result);
    }

    #[test]
    fn test_wait_for_timeout() {
        assert!(!wait_for(|| false, Duration::from_millis(50)));
    }
}
