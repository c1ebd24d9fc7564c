//! Sleep abstraction so the backoff loop can be tested without delays

use std::time::Duration;

/// Blocks the paging thread between retries.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps on the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Returns immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSleeper;

impl Sleeper for NoopSleeper {
    fn sleep(&self, _duration: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sleeper_returns_immediately() {
        let start = std::time::Instant::now();
        NoopSleeper.sleep(Duration::from_secs(100));
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[test]
    fn sleeper_trait_object() {
        let sleeper: Box<dyn Sleeper> = Box::new(NoopSleeper);
        sleeper.sleep(Duration::from_secs(1));
    }
}
