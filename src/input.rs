//! Input sampler: edge detection, debouncing and counter updates.
//!
//! [`InputSampler::poll`] takes one reading of the three buttons and applies
//! every accepted released-to-pressed edge to the [`ControllerState`]:
//!
//! - NS-count adds a car to North-South (while NS is red, by default)
//! - EW-count adds a car to East-West (while EW is red, by default)
//! - Pedestrian latches a walk request
//!
//! Debouncing is clock-driven, so the outcome does not depend on how often
//! `poll` is called.
//!
//! # Example
//!
//! ```rust
//! use crossing_ctl::{Approach, ControllerState, InputSampler, Phase, SampleEvent};
//! use crossing_ctl::config::InputConfig;
//! use crossing_ctl::traits::{Button, ButtonLevels};
//!
//! let mut sampler = InputSampler::new(&InputConfig::default());
//! let mut state = ControllerState::new();
//! state.phase = Phase::EwGreen;
//!
//! let mut levels = ButtonLevels::default();
//! levels.set(Button::NsCount, true);
//!
//! let report = sampler.poll(levels, 0, &mut state);
//! assert_eq!(
//!     report.as_slice(),
//!     &[SampleEvent::Counted { approach: Approach::NorthSouth, count: 1 }]
//! );
//!
//! // Held button: no new edge.
//! assert!(sampler.poll(levels, 100, &mut state).is_empty());
//! ```

use crate::config::{CountGating, DebounceScope, InputConfig};
use crate::controller::ControllerState;
use crate::phase::Approach;
use crate::shared::PendingPresses;
use crate::traits::{Button, ButtonLevels};

/// What an accepted button edge did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleEvent {
    /// A car was added to `approach`, giving `count`.
    Counted {
        /// Approach that gained a car.
        approach: Approach,
        /// Counter value after the press.
        count: u16,
    },
    /// A count press arrived while `approach` was not red and was dropped.
    NotRed {
        /// Approach whose button was pressed.
        approach: Approach,
    },
    /// The pedestrian latch is set.
    PedestrianRequested {
        /// The latch was already set before this press.
        already_pending: bool,
    },
}

impl SampleEvent {
    /// The button that produced this event.
    pub fn button(&self) -> Button {
        match *self {
            SampleEvent::Counted { approach, .. } | SampleEvent::NotRed { approach } => {
                count_button(approach)
            }
            SampleEvent::PedestrianRequested { .. } => Button::PedRequest,
        }
    }
}

/// Events from one poll, at most one per button.
pub type SampleReport = heapless::Vec<SampleEvent, { Button::COUNT }>;

const fn counted_approach(button: Button) -> Option<Approach> {
    match button {
        Button::NsCount => Some(Approach::NorthSouth),
        Button::EwCount => Some(Approach::EastWest),
        Button::PedRequest => None,
    }
}

const fn count_button(approach: Approach) -> Button {
    match approach {
        Approach::NorthSouth => Button::NsCount,
        Approach::EastWest => Button::EwCount,
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct EdgeDetector {
    last_level: bool,
    last_accepted_ms: Option<u64>,
}

/// Polls buttons and turns accepted edges into state changes.
#[derive(Clone, Debug)]
pub struct InputSampler {
    detectors: [EdgeDetector; Button::COUNT],
    shared_accepted_ms: Option<u64>,
    debounce_ms: u64,
    scope: DebounceScope,
    gating: CountGating,
    max_count: Option<u16>,
}

impl InputSampler {
    /// Create a sampler with every button released.
    pub fn new(config: &InputConfig) -> Self {
        Self {
            detectors: [EdgeDetector::default(); Button::COUNT],
            shared_accepted_ms: None,
            debounce_ms: u64::from(config.debounce_ms),
            scope: config.debounce_scope,
            gating: config.gating,
            max_count: config.max_count,
        }
    }

    /// Forget previous levels and debounce history.
    pub fn reset(&mut self) {
        self.detectors = [EdgeDetector::default(); Button::COUNT];
        self.shared_accepted_ms = None;
    }

    fn window_open(&self, last_accepted_ms: Option<u64>, now_ms: u64) -> bool {
        match last_accepted_ms {
            // A clock that went backwards opens the window.
            Some(last) => now_ms
                .checked_sub(last)
                .map_or(true, |since| since >= self.debounce_ms),
            None => true,
        }
    }

    /// Sample `levels` taken at `now_ms` and apply accepted edges to `state`.
    pub fn poll(
        &mut self,
        levels: ButtonLevels,
        now_ms: u64,
        state: &mut ControllerState,
    ) -> SampleReport {
        let mut report = SampleReport::new();

        for button in Button::ALL {
            let detector = self.detectors[button.index()];
            let pressed = levels.is_pressed(button);
            self.detectors[button.index()].last_level = pressed;
            if !pressed || detector.last_level {
                continue;
            }

            let last = match self.scope {
                DebounceScope::PerButton => detector.last_accepted_ms,
                DebounceScope::Shared => self.shared_accepted_ms,
            };
            if !self.window_open(last, now_ms) {
                log::trace!("{} bounce at {}ms", button, now_ms);
                continue;
            }
            self.detectors[button.index()].last_accepted_ms = Some(now_ms);
            self.shared_accepted_ms = Some(now_ms);

            let event = self.apply_edge(button, state);
            log::debug!("{} pressed: {:?}", button, event);
            // capacity equals the button count
            let _ = report.push(event);
        }

        report
    }

    /// Apply one accepted press of `button` to `state`.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossing_ctl::{Approach, ControllerState, InputSampler, SampleEvent};
    /// use crossing_ctl::config::InputConfig;
    /// use crossing_ctl::traits::Button;
    ///
    /// let sampler = InputSampler::new(&InputConfig::default());
    /// let mut state = ControllerState::new(); // NS green
    ///
    /// assert_eq!(
    ///     sampler.apply_edge(Button::NsCount, &mut state),
    ///     SampleEvent::NotRed { approach: Approach::NorthSouth }
    /// );
    /// assert_eq!(
    ///     sampler.apply_edge(Button::EwCount, &mut state),
    ///     SampleEvent::Counted { approach: Approach::EastWest, count: 1 }
    /// );
    /// ```
    pub fn apply_edge(&self, button: Button, state: &mut ControllerState) -> SampleEvent {
        match counted_approach(button) {
            Some(approach) => {
                let counts = match self.gating {
                    CountGating::WhileRed => state.is_red(approach),
                    CountGating::Always => true,
                };
                if counts {
                    SampleEvent::Counted {
                        approach,
                        count: state.add_count(approach, self.max_count),
                    }
                } else {
                    SampleEvent::NotRed { approach }
                }
            }
            None => SampleEvent::PedestrianRequested {
                already_pending: state.request_pedestrian(),
            },
        }
    }

    /// Apply presses captured outside the poll path (see [`PressLatch`]).
    ///
    /// These were debounced at capture time. The report holds the last
    /// event per button.
    ///
    /// [`PressLatch`]: crate::shared::PressLatch
    pub fn apply_pending(
        &self,
        pending: PendingPresses,
        state: &mut ControllerState,
    ) -> SampleReport {
        let mut report = SampleReport::new();
        for button in Button::ALL {
            let mut last = None;
            for _ in 0..pending.presses(button) {
                last = Some(self.apply_edge(button, state));
            }
            if let Some(event) = last {
                log::debug!("{} x{}: {:?}", button, pending.presses(button), event);
                let _ = report.push(event);
            }
        }
        report
    }
}
