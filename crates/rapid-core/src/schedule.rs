#![forbid(unsafe_code)]

//! Call coalescing for high-frequency triggers.
//!
//! Hover events arrive on every pointer move and geocode requests on every
//! keystroke. Running the downstream work for each one would thrash the
//! sidebar, so every such trigger goes through a [`Coalescer`]: calls within
//! a window collapse and only the most recent value survives.
//!
//! # Design
//!
//! Two policies are supported:
//! - [`CoalescePolicy::Debounce`]: trailing edge only. The value fires once
//!   the trigger has been quiet for a full window.
//! - [`CoalescePolicy::Throttle`]: leading and trailing edge. The first call
//!   fires immediately and opens a window; calls inside the window collapse
//!   into one trailing fire when it closes, which opens the next window.
//!
//! Time is injected. The owner calls [`Coalescer::push`] with each value and
//! [`Coalescer::poll`] from its tick; nothing here reads a clock.
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//! use rapid_core::schedule::Coalescer;
//! use web_time::Instant;
//!
//! let t0 = Instant::now();
//! let mut hover = Coalescer::throttle(Duration::from_millis(200));
//!
//! assert_eq!(hover.push("a", t0), Some("a"));              // leading edge
//! assert_eq!(hover.push("b", t0), None);                   // inside window
//! assert_eq!(hover.push("c", t0), None);                   // replaces "b"
//! assert_eq!(hover.poll(t0 + Duration::from_millis(200)), Some("c"));
//! ```

use std::time::Duration;

use web_time::Instant;

/// Edge behaviour of a [`Coalescer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoalescePolicy {
    Debounce,
    Throttle,
}

/// Keeps the most recent value pushed within a window.
///
/// # Thread Safety
///
/// Not thread-safe; owned by a single UI-thread component.
#[derive(Debug, Clone)]
pub struct Coalescer<T> {
    policy: CoalescePolicy,
    window: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> Coalescer<T> {
    #[must_use]
    pub fn new(policy: CoalescePolicy, window: Duration) -> Self {
        Self {
            policy,
            window,
            pending: None,
            deadline: None,
        }
    }

    #[must_use]
    pub fn debounce(window: Duration) -> Self {
        Self::new(CoalescePolicy::Debounce, window)
    }

    #[must_use]
    pub fn throttle(window: Duration) -> Self {
        Self::new(CoalescePolicy::Throttle, window)
    }

    #[must_use]
    pub fn policy(&self) -> CoalescePolicy {
        self.policy
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Offer a value. Returns it back when it should run right now.
    pub fn push(&mut self, value: T, now: Instant) -> Option<T> {
        match self.policy {
            CoalescePolicy::Debounce => {
                self.pending = Some(value);
                self.deadline = Some(now + self.window);
                None
            }
            CoalescePolicy::Throttle => match self.deadline {
                Some(deadline) if now < deadline => {
                    self.pending = Some(value);
                    None
                }
                _ => {
                    // An unpolled trailing value is superseded by this newer one.
                    self.pending = None;
                    self.deadline = Some(now + self.window);
                    Some(value)
                }
            },
        }
    }

    /// Release the trailing value once its window has closed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        match self.pending.take() {
            Some(value) => {
                self.deadline = match self.policy {
                    CoalescePolicy::Debounce => None,
                    CoalescePolicy::Throttle => Some(now + self.window),
                };
                Some(value)
            }
            None => {
                self.deadline = None;
                None
            }
        }
    }

    /// Drop any pending trailing value and close the window.
    pub fn cancel(&mut self) -> Option<T> {
        self.deadline = None;
        self.pending.take()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the next `poll` could release something.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().and(self.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn debounce_fires_after_quiet_window() {
        let t0 = Instant::now();
        let mut c = Coalescer::debounce(ms(250));
        assert_eq!(c.push(1, t0), None);
        assert_eq!(c.push(2, t0 + ms(100)), None);
        assert_eq!(c.poll(t0 + ms(300)), None, "window restarted at +100");
        assert_eq!(c.poll(t0 + ms(350)), Some(2));
        assert_eq!(c.poll(t0 + ms(1000)), None);
    }

    #[test]
    fn throttle_leading_then_trailing() {
        let t0 = Instant::now();
        let mut c = Coalescer::throttle(ms(200));
        assert_eq!(c.push('a', t0), Some('a'));
        assert_eq!(c.push('b', t0 + ms(50)), None);
        assert_eq!(c.push('c', t0 + ms(150)), None);
        assert_eq!(c.poll(t0 + ms(199)), None);
        assert_eq!(c.poll(t0 + ms(200)), Some('c'));
        // trailing fire opened a fresh window
        assert_eq!(c.push('d', t0 + ms(250)), None);
        assert_eq!(c.poll(t0 + ms(400)), Some('d'));
    }

    #[test]
    fn throttle_window_closes_when_idle() {
        let t0 = Instant::now();
        let mut c = Coalescer::throttle(ms(200));
        assert_eq!(c.push(1, t0), Some(1));
        assert_eq!(c.poll(t0 + ms(200)), None);
        assert_eq!(c.push(2, t0 + ms(210)), Some(2));
    }

    #[test]
    fn cancel_drops_trailing_value() {
        let t0 = Instant::now();
        let mut c = Coalescer::throttle(ms(200));
        c.push(1, t0);
        c.push(2, t0 + ms(10));
        assert_eq!(c.cancel(), Some(2));
        assert_eq!(c.poll(t0 + ms(500)), None);
        assert_eq!(c.push(3, t0 + ms(20)), Some(3));
    }

    #[test]
    fn next_deadline_only_with_pending() {
        let t0 = Instant::now();
        let mut c = Coalescer::throttle(ms(200));
        c.push(1, t0);
        assert_eq!(c.next_deadline(), None);
        c.push(2, t0);
        assert_eq!(c.next_deadline(), Some(t0 + ms(200)));
    }
}
