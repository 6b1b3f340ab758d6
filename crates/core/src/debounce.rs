//! Single-slot debouncer for coalescing bursts of requests.
//!
//! Time is supplied by the caller as a [`Duration`] since an arbitrary
//! epoch, so the debouncer never reads a clock itself.

use std::time::Duration;

/// Holds at most one pending value. Arming replaces whatever is pending;
/// the value fires once `delay` has passed since the latest arm.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Duration, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `value` to fire at `now + delay`, cancelling any pending
    /// value. Returns true if a pending value was replaced.
    pub fn arm(&mut self, value: T, now: Duration) -> bool {
        let replaced = self.pending.is_some();
        self.pending = Some((now + self.delay, value));
        replaced
    }

    /// Takes the pending value if its deadline has been reached.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        let due = matches!(&self.pending, Some((deadline, _)) if now >= *deadline);
        if due {
            self.pending.take().map(|(_, v)| v)
        } else {
            None
        }
    }

    /// Drops the pending value, if any.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending value.
    pub fn deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|(d, _)| *d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_only_after_delay() {
        let mut d = Debouncer::new(ms(200));
        d.arm("a", ms(0));
        assert_eq!(d.poll(ms(199)), None);
        assert_eq!(d.poll(ms(200)), Some("a"));
        assert!(!d.is_pending());
        assert_eq!(d.poll(ms(400)), None);
    }

    #[test]
    fn burst_coalesces_to_last_value() {
        let mut d = Debouncer::new(ms(200));
        assert!(!d.arm(1, ms(0)));
        assert!(d.arm(2, ms(50)));
        assert!(d.arm(3, ms(120)));
        // The first deadline (200ms) has passed but was replaced.
        assert_eq!(d.poll(ms(250)), None);
        assert_eq!(d.deadline(), Some(ms(320)));
        assert_eq!(d.poll(ms(320)), Some(3));
        assert_eq!(d.poll(ms(1000)), None);
    }

    #[test]
    fn cancel_clears_slot() {
        let mut d = Debouncer::new(ms(10));
        d.arm((), ms(0));
        d.cancel();
        assert!(!d.is_pending());
        assert_eq!(d.poll(ms(100)), None);
    }

    #[test]
    fn zero_delay_fires_immediately() {
        let mut d = Debouncer::new(Duration::ZERO);
        d.arm(7, ms(5));
        assert_eq!(d.delay(), Duration::ZERO);
        assert_eq!(d.poll(ms(5)), Some(7));
    }
}
