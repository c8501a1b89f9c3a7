//! Drop clock - the single-shot, reschedulable automatic-drop timer
//!
//! The clock is driven by elapsed wall time rather than owning a thread, so
//! the game loop and tests decide when time passes. Each [`DropClock::advance`]
//! fires at most once; rescheduling changes the interval used for the next
//! fire without firing and without discarding time already accumulated.

/// Automatic-drop timer; `interval_ms == None` means stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropClock {
    interval_ms: Option<u32>,
    elapsed_ms: u32,
}

impl DropClock {
    pub fn new(interval_ms: Option<u32>) -> Self {
        Self {
            interval_ms,
            elapsed_ms: 0,
        }
    }

    pub fn stopped() -> Self {
        Self::new(None)
    }

    pub fn interval_ms(&self) -> Option<u32> {
        self.interval_ms
    }

    pub fn is_running(&self) -> bool {
        self.interval_ms.is_some()
    }

    /// Let `ms` pass. Returns true if the clock fired.
    pub fn advance(&mut self, ms: u32) -> bool {
        let Some(interval) = self.interval_ms else {
            return false;
        };

        self.elapsed_ms = self.elapsed_ms.saturating_add(ms);
        if self.elapsed_ms >= interval {
            self.elapsed_ms = 0;
            return true;
        }
        false
    }

    /// Use `interval_ms` for the next fire. `None` stops the clock.
    pub fn reschedule(&mut self, interval_ms: Option<u32>) {
        self.interval_ms = interval_ms;
        if interval_ms.is_none() {
            self.elapsed_ms = 0;
        }
    }

    /// Milliseconds until the next fire, if running.
    pub fn remaining_ms(&self) -> Option<u32> {
        self.interval_ms
            .map(|interval| interval.saturating_sub(self.elapsed_ms))
    }
}

impl Default for DropClock {
    fn default() -> Self {
        Self::stopped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_interval() {
        let mut clock = DropClock::new(Some(100));
        assert!(!clock.advance(60));
        assert!(clock.advance(40));
        assert!(!clock.advance(99));
        assert!(clock.advance(1));
    }

    #[test]
    fn test_never_double_fires_on_a_long_gap() {
        let mut clock = DropClock::new(Some(30));
        assert!(clock.advance(500));
        assert!(!clock.advance(0));
    }

    #[test]
    fn test_reschedule_applies_to_next_fire() {
        let mut clock = DropClock::new(Some(1000));
        assert!(!clock.advance(20));
        clock.reschedule(Some(30));
        assert!(!clock.advance(5));
        assert!(clock.advance(5));

        clock.reschedule(Some(1000));
        assert!(!clock.advance(30));
        assert_eq!(clock.remaining_ms(), Some(970));
    }

    #[test]
    fn test_stopped_clock_never_fires() {
        let mut clock = DropClock::new(Some(10));
        clock.reschedule(None);
        assert!(!clock.is_running());
        assert!(!clock.advance(10_000));
        assert_eq!(clock.remaining_ms(), None);
    }
}
