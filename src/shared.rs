//! Lock-free press capture between interrupt handlers and the main loop.
//!
//! An interrupt (or another thread) calls [`PressLatch::record`] on each
//! falling edge; the main loop calls [`PressLatch::drain`] and hands the
//! result to [`Intersection::apply_pending`](crate::Intersection::apply_pending).
//! Counts accumulate, so nothing recorded between two drains is lost.
//!
//! ```rust
//! use crossing_ctl::shared::PressLatch;
//! use crossing_ctl::traits::Button;
//!
//! static LATCH: PressLatch = PressLatch::new(50);
//!
//! // interrupt side
//! assert!(LATCH.record(Button::NsCount, 1_000));
//! assert!(!LATCH.record(Button::NsCount, 1_010)); // bounce
//! assert!(LATCH.record(Button::PedRequest, 1_010));
//!
//! // main loop side
//! let pending = LATCH.drain();
//! assert_eq!(pending.ns_count, 1);
//! assert!(pending.ped_request);
//! assert!(LATCH.drain().is_empty());
//! ```

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};

use crate::traits::Button;

/// Presses collected since the previous drain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingPresses {
    /// NS-count presses.
    pub ns_count: u16,
    /// EW-count presses.
    pub ew_count: u16,
    /// At least one pedestrian press.
    pub ped_request: bool,
}

impl PendingPresses {
    /// Returns true if nothing was pressed.
    pub fn is_empty(&self) -> bool {
        self.ns_count == 0 && self.ew_count == 0 && !self.ped_request
    }

    /// Number of presses recorded for `button`.
    pub fn presses(&self, button: Button) -> u16 {
        match button {
            Button::NsCount => self.ns_count,
            Button::EwCount => self.ew_count,
            Button::PedRequest => u16::from(self.ped_request),
        }
    }
}

/// Atomic press accumulator with a per-button debounce window.
///
/// Timestamps are `u32` milliseconds so the latch works on targets without
/// 64-bit atomics; window checks use wrapping arithmetic.
pub struct PressLatch {
    window_ms: u32,
    ns_count: AtomicU16,
    ew_count: AtomicU16,
    ped_request: AtomicBool,
    armed: [AtomicBool; Button::COUNT],
    last_ms: [AtomicU32; Button::COUNT],
}

impl PressLatch {
    /// Create an empty latch; `window_ms` is the debounce window.
    pub const fn new(window_ms: u32) -> Self {
        Self {
            window_ms,
            ns_count: AtomicU16::new(0),
            ew_count: AtomicU16::new(0),
            ped_request: AtomicBool::new(false),
            armed: [AtomicBool::new(false), AtomicBool::new(false), AtomicBool::new(false)],
            last_ms: [AtomicU32::new(0), AtomicU32::new(0), AtomicU32::new(0)],
        }
    }

    /// Record a press of `button` at `now_ms`.
    ///
    /// Returns false if the press fell inside the button's debounce window.
    pub fn record(&self, button: Button, now_ms: u32) -> bool {
        let i = button.index();
        let was_armed = self.armed[i].swap(true, Ordering::AcqRel);
        let last = self.last_ms[i].load(Ordering::Acquire);
        if was_armed && now_ms.wrapping_sub(last) < self.window_ms {
            return false;
        }
        self.last_ms[i].store(now_ms, Ordering::Release);

        match button {
            Button::NsCount => Self::bump(&self.ns_count),
            Button::EwCount => Self::bump(&self.ew_count),
            Button::PedRequest => self.ped_request.store(true, Ordering::Release),
        }
        true
    }

    fn bump(counter: &AtomicU16) {
        // saturating; the closure never returns None
        let _ = counter.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
            Some(n.saturating_add(1))
        });
    }

    /// Take every press recorded so far, leaving the latch empty.
    pub fn drain(&self) -> PendingPresses {
        PendingPresses {
            ns_count: self.ns_count.swap(0, Ordering::AcqRel),
            ew_count: self.ew_count.swap(0, Ordering::AcqRel),
            ped_request: self.ped_request.swap(false, Ordering::AcqRel),
        }
    }
}

impl Default for PressLatch {
    fn default() -> Self {
        Self::new(50)
    }
}
