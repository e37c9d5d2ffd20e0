use crate::constants::NAV_GUARD_WINDOW;
use std::time::{Duration, Instant};

/// One-shot, time-boxed hint that lets the flow leaving the post-delivery
/// review screen suppress the active-delivery redirect check on the very
/// next screen. Best effort across an asynchronous navigation boundary:
/// if the consuming screen never loads inside the window, the flag expires
/// on its own rather than permanently disabling the redirect.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    pub active: bool,
    pub set_at: Option<Instant>,
    pub window: Duration,
}

impl NavigationGuard {
    pub fn new() -> Self {
        Self {
            active: false,
            set_at: None,
            window: NAV_GUARD_WINDOW,
        }
    }

    /// Arm the guard for the next screen transition.
    pub fn set(&mut self) {
        self.active = true;
        self.set_at = Some(Instant::now());
    }

    /// True while armed and inside the window; the flag stays set so a
    /// re-render of the same screen sees the same answer. Past the window
    /// (or when never armed) returns false and resets.
    pub fn consume_if_active(&mut self) -> bool {
        match self.set_at {
            Some(set_at) if self.active && set_at.elapsed() <= self.window => true,
            _ => {
                self.clear();
                false
            }
        }
    }

    pub fn clear(&mut self) {
        self.active = false;
        self.set_at = None;
    }
}

impl Default for NavigationGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_within_window_returns_true_and_keeps_flag() {
        let mut guard = NavigationGuard::new();
        guard.set();
        assert!(guard.consume_if_active());
        assert!(guard.consume_if_active());
        assert!(guard.active);
    }

    #[test]
    fn consume_after_window_returns_false_and_clears() {
        let mut guard = NavigationGuard::new();
        guard.set();
        // Backdate the arm time past the window (simulated clock).
        guard.set_at = Some(Instant::now() - Duration::from_secs(6));
        assert!(!guard.consume_if_active());
        assert!(!guard.active);
        assert!(guard.set_at.is_none());
    }

    #[test]
    fn consume_when_never_set_returns_false() {
        let mut guard = NavigationGuard::new();
        assert!(!guard.consume_if_active());
    }

    #[test]
    fn clear_disarms_the_guard() {
        let mut guard = NavigationGuard::new();
        guard.set();
        guard.clear();
        assert!(!guard.consume_if_active());
    }
}
