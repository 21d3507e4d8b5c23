//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware traits, enabling
//! development and testing on desktop without a junction on the bench.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockSignals`] | [`SignalOutputs`] | Records every lamp vector applied |
//! | [`MockButtons`] | [`ButtonInputs`] | Held buttons, optionally scripted against a clock |
//! | [`MockClock`] | [`Clock`] | Controllable, shareable time source |
//! | [`MockDelay`] | [`DelayNs`] | Advances a [`MockClock`] instead of sleeping |
//! | [`MockDisplay`] | [`StatusDisplay`] | Records shown lines |
//!
//! # Example
//!
//! ```rust
//! use crossing_ctl::{PhaseController, Phase, config::TimingConfig};
//! use crossing_ctl::hal::MockSignals;
//! use crossing_ctl::traits::Lamp;
//!
//! let mut controller = PhaseController::new(MockSignals::new(), &TimingConfig::default());
//! controller.start(0).unwrap();
//!
//! // Verify via the recorded lamps
//! assert!(controller.signals().is_on(Lamp::NsGreen));
//! assert_eq!(controller.signals().history.len(), 1);
//! ```
//!
//! [`SignalOutputs`]: crate::traits::SignalOutputs
//! [`ButtonInputs`]: crate::traits::ButtonInputs
//! [`Clock`]: crate::traits::Clock
//! [`StatusDisplay`]: crate::traits::StatusDisplay
//! [`DelayNs`]: embedded_hal::delay::DelayNs

extern crate alloc;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::Cell;

use embedded_hal::delay::DelayNs;

use crate::render::LampVector;
use crate::traits::{Button, ButtonInputs, ButtonLevels, Clock, Lamp, SignalOutputs, StatusDisplay};

// ============================================================================
// Lamps
// ============================================================================

/// Mock lamp outputs for testing.
///
/// Records every vector passed to [`apply`](SignalOutputs::apply). Set
/// `fail` to make every write return an error.
///
/// # Example
///
/// ```rust
/// use crossing_ctl::hal::MockSignals;
/// use crossing_ctl::render::LampVector;
/// use crossing_ctl::traits::{Lamp, SignalOutputs};
///
/// let mut signals = MockSignals::new();
/// signals.apply(&LampVector::all_red()).unwrap();
///
/// assert!(signals.is_on(Lamp::NsRed));
/// assert_eq!(signals.history, vec![LampVector::all_red()]);
///
/// signals.set_fail(true);
/// assert!(signals.set_lamp(Lamp::NsRed, false).is_err());
/// ```
#[derive(Debug, Default)]
pub struct MockSignals {
    /// Lamp levels right now.
    pub lamps: LampVector,
    /// Every vector applied, oldest first.
    pub history: Vec<LampVector>,
    /// Number of single-lamp writes.
    pub writes: usize,
    /// When true, every write fails.
    pub fail: bool,
}

impl MockSignals {
    /// Creates mock outputs with every lamp dark.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `lamp` is lit.
    pub fn is_on(&self, lamp: Lamp) -> bool {
        self.lamps.is_on(lamp)
    }

    /// The current lamp vector.
    pub fn current(&self) -> LampVector {
        self.lamps
    }

    /// Makes subsequent writes fail (or succeed again).
    pub fn set_fail(&mut self, fail: bool) {
        self.fail = fail;
    }
}

impl SignalOutputs for MockSignals {
    type Error = ();

    fn set_lamp(&mut self, lamp: Lamp, on: bool) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.lamps = self.lamps.with(lamp, on);
        self.writes += 1;
        Ok(())
    }

    fn apply(&mut self, lamps: &LampVector) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        for (lamp, on) in lamps.iter() {
            self.set_lamp(lamp, on)?;
        }
        self.history.push(*lamps);
        Ok(())
    }
}

// ============================================================================
// Buttons
// ============================================================================

/// Mock buttons for testing.
///
/// Either hold buttons directly with [`press`](Self::press) and
/// [`release`](Self::release), or attach a clock with
/// [`scripted`](Self::scripted) and queue level changes with
/// [`at`](Self::at); queued changes take effect once the clock reaches
/// their time.
///
/// # Example
///
/// ```rust
/// use crossing_ctl::hal::{MockButtons, MockClock};
/// use crossing_ctl::traits::{Button, ButtonInputs};
///
/// let clock = MockClock::new();
/// let mut buttons = MockButtons::scripted(clock.clone())
///     .at(100, Button::PedRequest, true)
///     .at(200, Button::PedRequest, false);
///
/// assert!(!buttons.is_pressed(Button::PedRequest));
/// clock.set(150);
/// assert!(buttons.is_pressed(Button::PedRequest));
/// clock.set(250);
/// assert!(!buttons.is_pressed(Button::PedRequest));
/// ```
#[derive(Debug, Default)]
pub struct MockButtons {
    /// Levels right now.
    pub levels: ButtonLevels,
    /// Number of full samples taken.
    pub sample_count: usize,
    clock: Option<MockClock>,
    script: Vec<(u64, Button, bool)>,
}

impl MockButtons {
    /// Creates mock buttons, all released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates mock buttons driven by a script against `clock`.
    pub fn scripted(clock: MockClock) -> Self {
        Self {
            clock: Some(clock),
            ..Self::default()
        }
    }

    /// Queues `button` to go to `pressed` at `at_ms`.
    pub fn at(mut self, at_ms: u64, button: Button, pressed: bool) -> Self {
        self.script.push((at_ms, button, pressed));
        self.script.sort_by_key(|&(t, _, _)| t);
        self
    }

    /// Queues a press of `button` held for `hold_ms` starting at `at_ms`.
    pub fn tap(self, at_ms: u64, button: Button, hold_ms: u64) -> Self {
        self.at(at_ms, button, true).at(at_ms + hold_ms, button, false)
    }

    /// Holds `button` down.
    pub fn press(&mut self, button: Button) {
        self.levels.set(button, true);
    }

    /// Lets go of `button`.
    pub fn release(&mut self, button: Button) {
        self.levels.set(button, false);
    }

    /// Sets every button level at once.
    pub fn set(&mut self, levels: ButtonLevels) {
        self.levels = levels;
    }

    fn run_script(&mut self) {
        let Some(clock) = &self.clock else {
            return;
        };
        let now = clock.now_ms();
        let due = self.script.iter().take_while(|&&(t, _, _)| t <= now).count();
        for (_, button, pressed) in self.script.drain(..due) {
            self.levels.set(button, pressed);
        }
    }
}

impl ButtonInputs for MockButtons {
    fn is_pressed(&mut self, button: Button) -> bool {
        self.run_script();
        self.levels.is_pressed(button)
    }

    fn sample(&mut self) -> ButtonLevels {
        self.run_script();
        self.sample_count += 1;
        self.levels
    }
}

// ============================================================================
// Time
// ============================================================================

/// Mock clock for testing.
///
/// Provides a controllable time source for testing time-dependent behavior.
/// Clones share the same time, so a test can keep one handle while the
/// code under test (or a [`MockDelay`]) holds another.
///
/// # Example
///
/// ```rust
/// use crossing_ctl::hal::MockClock;
/// use crossing_ctl::traits::Clock;
///
/// let clock = MockClock::new();
/// let handle = clock.clone();
///
/// clock.set(1000);
/// assert_eq!(handle.now_ms(), 1000);
///
/// handle.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockClock {
    current_ms: Rc<Cell<u64>>,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current time in milliseconds.
    pub fn set(&self, ms: u64) {
        self.current_ms.set(ms);
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, ms: u64) {
        self.current_ms.set(self.current_ms.get().saturating_add(ms));
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms.get()
    }
}

/// Delay that advances a [`MockClock`] instead of sleeping.
///
/// Sub-millisecond remainders are carried over, so a run of short
/// delays adds up exactly.
#[derive(Clone, Debug)]
pub struct MockDelay {
    clock: MockClock,
    carry_ns: u64,
    /// Total milliseconds delayed.
    pub total_ms: u64,
}

impl MockDelay {
    /// Creates a delay bound to `clock`.
    pub fn new(clock: MockClock) -> Self {
        Self {
            clock,
            carry_ns: 0,
            total_ms: 0,
        }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        let total = self.carry_ns + u64::from(ns);
        let ms = total / 1_000_000;
        self.carry_ns = total % 1_000_000;
        self.clock.advance(ms);
        self.total_ms += ms;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.advance(u64::from(ms));
        self.total_ms += u64::from(ms);
    }
}

// ============================================================================
// Display
// ============================================================================

/// Mock display for testing.
///
/// # Example
///
/// ```rust
/// use crossing_ctl::hal::MockDisplay;
/// use crossing_ctl::traits::StatusDisplay;
///
/// let mut display = MockDisplay::new();
/// display.init().unwrap();
/// display.show_lines("PEDESTRIAN", "T=8 WALK").unwrap();
///
/// assert_eq!(display.line1(), "PEDESTRIAN");
/// assert_eq!(display.render_count, 1);
/// ```
#[derive(Debug, Default)]
pub struct MockDisplay {
    /// Every pair of lines shown, oldest first.
    pub history: Vec<(String, String)>,
    /// Number of times lines were shown.
    pub render_count: usize,
    /// Whether init() was called.
    pub initialized: bool,
    /// When true, every call fails.
    pub fail: bool,
}

impl MockDisplay {
    /// Creates a new mock display.
    pub fn new() -> Self {
        Self::default()
    }

    /// Top line currently shown.
    pub fn line1(&self) -> &str {
        self.history.last().map_or("", |(l1, _)| l1.as_str())
    }

    /// Bottom line currently shown.
    pub fn line2(&self) -> &str {
        self.history.last().map_or("", |(_, l2)| l2.as_str())
    }

    /// Returns true if `line1` was ever shown as the top line.
    pub fn showed(&self, line1: &str) -> bool {
        self.history.iter().any(|(l1, _)| l1 == line1)
    }
}

impl StatusDisplay for MockDisplay {
    type Error = ();

    fn init(&mut self) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.initialized = true;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.history.push((String::new(), String::new()));
        Ok(())
    }

    fn show_lines(&mut self, line1: &str, line2: &str) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.history.push((line1.into(), line2.into()));
        self.render_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_carries_sub_millisecond_remainder() {
        let clock = MockClock::new();
        let mut delay = MockDelay::new(clock.clone());
        for _ in 0..4 {
            delay.delay_us(250);
        }
        assert_eq!(clock.now_ms(), 1);
        delay.delay_ms(20);
        assert_eq!(clock.now_ms(), 21);
        assert_eq!(delay.total_ms, 21);
    }

    #[test]
    fn tap_presses_then_releases() {
        let clock = MockClock::new();
        let mut buttons = MockButtons::scripted(clock.clone()).tap(40, Button::NsCount, 60);
        assert!(!buttons.sample().ns_count);
        clock.set(40);
        assert!(buttons.sample().ns_count);
        clock.set(100);
        assert!(!buttons.sample().ns_count);
        assert_eq!(buttons.sample_count, 3);
    }

    #[test]
    fn failing_signals_record_nothing() {
        let mut signals = MockSignals::new();
        signals.set_fail(true);
        assert!(signals.apply(&LampVector::all_red()).is_err());
        assert!(signals.history.is_empty());
        assert_eq!(signals.current(), LampVector::dark());
    }

    #[test]
    fn display_tracks_lines() {
        let mut display = MockDisplay::new();
        display.show_lines("a", "b").unwrap();
        display.show_lines("c", "d").unwrap();
        assert_eq!(display.line1(), "c");
        assert_eq!(display.line2(), "d");
        assert!(display.showed("a"));
        assert!(!display.showed("b"));
    }
}
