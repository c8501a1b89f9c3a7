//! Held soft-drop key tracking.
//!
//! Terminals that support the keyboard enhancement protocol report releases.
//! Others only send repeated presses while a key is held, so the latch also
//! releases itself after a quiet period.

// Long enough to bridge typical key-repeat gaps once repeating has started.
const DEFAULT_RELEASE_TIMEOUT_MS: u32 = 200;

#[derive(Debug, Clone)]
pub struct SoftDropLatch {
    held: bool,
    quiet_ms: u32,
    release_timeout_ms: u32,
}

impl SoftDropLatch {
    pub fn new() -> Self {
        Self::with_release_timeout_ms(DEFAULT_RELEASE_TIMEOUT_MS)
    }

    pub fn with_release_timeout_ms(release_timeout_ms: u32) -> Self {
        Self {
            held: false,
            quiet_ms: 0,
            release_timeout_ms,
        }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Key press or repeat. Returns true when the key just became held.
    pub fn press(&mut self) -> bool {
        self.quiet_ms = 0;
        let changed = !self.held;
        self.held = true;
        changed
    }

    /// Key release. Returns true when the key was held.
    pub fn release(&mut self) -> bool {
        self.quiet_ms = 0;
        std::mem::replace(&mut self.held, false)
    }

    /// Let time pass. Returns true when the timeout released the key.
    pub fn update(&mut self, elapsed_ms: u32) -> bool {
        if !self.held {
            return false;
        }
        self.quiet_ms = self.quiet_ms.saturating_add(elapsed_ms);
        if self.quiet_ms >= self.release_timeout_ms {
            self.release()
        } else {
            false
        }
    }
}

impl Default for SoftDropLatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut latch = SoftDropLatch::new();
        assert!(latch.press());
        assert!(!latch.press());
        assert!(latch.is_held());
        assert!(latch.release());
        assert!(!latch.release());
    }

    #[test]
    fn test_repeats_keep_it_held() {
        let mut latch = SoftDropLatch::with_release_timeout_ms(100);
        latch.press();
        for _ in 0..10 {
            assert!(!latch.update(60));
            latch.press();
        }
        assert!(latch.is_held());
    }

    #[test]
    fn test_timeout_releases() {
        let mut latch = SoftDropLatch::with_release_timeout_ms(100);
        latch.press();
        assert!(!latch.update(99));
        assert!(latch.update(1));
        assert!(!latch.is_held());
        assert!(!latch.update(1000));
    }
}
