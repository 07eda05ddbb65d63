//! Monotonic time source and the debounce policy built on it

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A monotonic clock measured from an arbitrary origin
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock backed by `Instant`
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to the styler.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Quiet period required after the last document change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debounce {
    /// Minimum quiet time
    pub delay: Duration,
    /// Compare truncated seconds instead of elapsed time. A change late in
    /// one second then only needs the clock to tick into the next second.
    pub whole_seconds: bool,
}

impl Default for Debounce {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            whole_seconds: false,
        }
    }
}

impl Debounce {
    pub fn from_millis(ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(ms),
            whole_seconds: false,
        }
    }

    pub fn whole_seconds() -> Self {
        Self {
            delay: Duration::from_secs(1),
            whole_seconds: true,
        }
    }

    /// Whether we are still inside the quiet period that began at `last`
    pub fn is_waiting(&self, last: Option<Duration>, now: Duration) -> bool {
        let Some(last) = last else {
            return false;
        };

        if self.whole_seconds {
            let delay = self.delay.as_secs().max(1);
            now.as_secs().saturating_sub(last.as_secs()) < delay
        } else {
            now.saturating_sub(last) < self.delay
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance(Duration::from_millis(250));
        assert_eq!(clock.now(), Duration::from_millis(250));
        handle.set(Duration::from_secs(3));
        assert_eq!(clock.now(), Duration::from_secs(3));
    }

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_precise_debounce() {
        let debounce = Debounce::default();
        assert!(!debounce.is_waiting(None, Duration::ZERO));

        let last = Some(Duration::from_millis(1500));
        assert!(debounce.is_waiting(last, Duration::from_millis(1500)));
        assert!(debounce.is_waiting(last, Duration::from_millis(2499)));
        assert!(!debounce.is_waiting(last, Duration::from_millis(2500)));
    }

    #[test]
    fn test_whole_second_debounce() {
        let debounce = Debounce::whole_seconds();
        let last = Some(Duration::from_millis(1900));

        // Same second: keep waiting
        assert!(debounce.is_waiting(last, Duration::from_millis(1999)));
        // The clock ticked over, even though only 100ms passed
        assert!(!debounce.is_waiting(last, Duration::from_millis(2000)));

        let last = Some(Duration::from_millis(1000));
        assert!(debounce.is_waiting(last, Duration::from_millis(1999)));
        assert!(!debounce.is_waiting(last, Duration::from_millis(2000)));
    }

    #[test]
    fn test_custom_delay() {
        let debounce = Debounce::from_millis(300);
        let last = Some(Duration::from_secs(10));
        assert!(debounce.is_waiting(last, Duration::from_millis(10_299)));
        assert!(!debounce.is_waiting(last, Duration::from_millis(10_300)));
    }
}
