//! Scroll State - Viewport offset and scroll-proximity trigger.
//!
//! Manages:
//! - The list's scroll offset, in items, clamped to the disclosed window
//! - The proximity edge that asks the disclosure controller for growth
//!
//! Proximity is measured in disclosed items still below the viewport. When
//! that count drops to the threshold or below, the trigger fires once. It
//! re-arms when the count rises above the threshold again, or when the window
//! grows. A viewport taller than the window keeps the count at zero, so growth
//! alone has to re-arm it.

// =============================================================================
// SCROLL CONSTANTS
// =============================================================================

/// Items scrolled per arrow key or wheel notch.
pub const LINE_SCROLL: usize = 1;

/// Page Up/Down scrolls 90% of the viewport.
pub const PAGE_SCROLL_FACTOR: f32 = 0.9;

// =============================================================================
// SCROLL OFFSET
// =============================================================================

/// Largest valid offset for a window of `visible` items and a viewport of
/// `viewport` items.
pub fn max_offset(visible: usize, viewport: usize) -> usize {
    visible.saturating_sub(viewport)
}

/// Scroll by a delta, clamped to `0..=max`.
///
/// Returns the new offset, or `None` if already at the boundary.
pub fn scroll_by(offset: usize, delta: isize, max: usize) -> Option<usize> {
    let next = offset.saturating_add_signed(delta).min(max);
    (next != offset).then_some(next)
}

/// Items moved by one page.
pub fn page_size(viewport: usize) -> usize {
    ((viewport as f32 * PAGE_SCROLL_FACTOR) as usize).max(1)
}

// =============================================================================
// PROXIMITY TRIGGER
// =============================================================================

/// Edge-triggered "near the end of the disclosed items" signal.
#[derive(Debug, Clone)]
pub struct ScrollProximity {
    threshold: usize,
    armed: bool,
    /// Window size seen by the last update.
    last_visible: usize,
}

impl ScrollProximity {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            armed: true,
            last_visible: 0,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Disclosed items below the last one in view.
    pub fn remaining(visible: usize, last_in_view: usize) -> usize {
        visible.saturating_sub(last_in_view.saturating_add(1))
    }

    /// Feed the current viewport. Returns true when the trigger fires.
    pub fn update(&mut self, visible: usize, last_in_view: usize) -> bool {
        if visible > self.last_visible {
            self.armed = true;
        }
        self.last_visible = visible;
        if visible == 0 {
            return false;
        }
        let near = Self::remaining(visible, last_in_view) <= self.threshold;
        if near && self.armed {
            self.armed = false;
            return true;
        }
        if !near {
            self.armed = true;
        }
        false
    }

    /// Re-arm without waiting for the viewport to move away. Used when a new
    /// collection arrives.
    pub fn rearm(&mut self) {
        self.armed = true;
        self.last_visible = 0;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_by_clamps() {
        assert_eq!(scroll_by(0, 1, 5), Some(1));
        assert_eq!(scroll_by(0, -1, 5), None);
        assert_eq!(scroll_by(4, 10, 5), Some(5));
        assert_eq!(scroll_by(5, 1, 5), None);
        assert_eq!(scroll_by(3, -10, 5), Some(0));
    }

    #[test]
    fn test_max_offset_and_page() {
        assert_eq!(max_offset(10, 4), 6);
        assert_eq!(max_offset(3, 4), 0);
        assert_eq!(page_size(10), 9);
        assert_eq!(page_size(1), 1);
    }

    #[test]
    fn test_remaining() {
        assert_eq!(ScrollProximity::remaining(8, 3), 4);
        assert_eq!(ScrollProximity::remaining(8, 7), 0);
        assert_eq!(ScrollProximity::remaining(8, 20), 0);
    }

    #[test]
    fn test_fires_once_per_approach() {
        let mut trigger = ScrollProximity::new(2);

        // 4 visible, viewing 0..=0: 3 remain.
        assert!(!trigger.update(4, 0));
        // Viewing 0..=1: 2 remain, fires.
        assert!(trigger.update(4, 1));
        // Jitter near the end does not fire again.
        assert!(!trigger.update(4, 2));
        assert!(!trigger.update(4, 1));
        assert!(!trigger.is_armed());

        // Window grew to 8: 6 remain, re-arms.
        assert!(!trigger.update(8, 1));
        assert!(trigger.is_armed());
        assert!(trigger.update(8, 5));
    }

    #[test]
    fn test_growth_rearms_when_everything_is_in_view() {
        let mut trigger = ScrollProximity::new(2);

        // Viewport holds 12 items; the whole window is always in view.
        assert!(trigger.update(4, 3));
        assert!(!trigger.update(4, 3));

        assert!(trigger.update(8, 7));
        assert!(!trigger.update(8, 7));

        // Capped by the viewport, not the window.
        assert!(trigger.update(14, 11));
        assert!(!trigger.update(14, 11));
    }

    #[test]
    fn test_shrinking_window_does_not_rearm() {
        let mut trigger = ScrollProximity::new(2);
        assert!(trigger.update(8, 7));
        assert!(!trigger.update(4, 3));
        assert!(!trigger.is_armed());
    }

    #[test]
    fn test_empty_window_never_fires() {
        let mut trigger = ScrollProximity::new(2);
        assert!(!trigger.update(0, 0));
        assert!(trigger.is_armed());
    }

    #[test]
    fn test_rearm() {
        let mut trigger = ScrollProximity::new(2);
        assert!(trigger.update(3, 2));
        trigger.rearm();
        assert!(trigger.update(3, 2));
    }
}
