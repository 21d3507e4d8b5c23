//! Hardware abstraction traits for signal lamps, push buttons, and time.
//!
//! This module defines the core hardware interfaces that allow crossing-ctl to
//! work across different platforms (ESP32, desktop mocks, etc.).
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`SignalOutputs`] | The eight signal lamps, addressed by [`Lamp`] |
//! | [`ButtonInputs`] | The three momentary buttons, addressed by [`Button`] |
//! | [`Clock`] | Monotonic millisecond time source |
//!
//! Blocking waits use [`embedded_hal::delay::DelayNs`] directly rather than a
//! crate-specific trait.
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. Any `embedded-hal` pin works through
//! [`crate::hal::GpioSignals`] and [`crate::hal::GpioButtons`].
//!
//! # Example
//!
//! ```rust
//! use crossing_ctl::traits::{Lamp, SignalOutputs};
//! use crossing_ctl::hal::MockSignals;
//!
//! let mut signals = MockSignals::new();
//! signals.set_lamp(Lamp::NsGreen, true).unwrap();
//! assert!(signals.is_on(Lamp::NsGreen));
//! assert!(!signals.is_on(Lamp::EwGreen));
//! ```

use crate::render::LampVector;

/// One of the eight signal lamps at the junction.
///
/// The discriminant doubles as the index into a [`LampVector`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Lamp {
    /// North-South red.
    NsRed,
    /// North-South yellow.
    NsYellow,
    /// North-South green.
    NsGreen,
    /// East-West red.
    EwRed,
    /// East-West yellow.
    EwYellow,
    /// East-West green.
    EwGreen,
    /// Pedestrian "don't walk".
    PedRed,
    /// Pedestrian "walk".
    PedGreen,
}

impl Lamp {
    /// Number of lamps.
    pub const COUNT: usize = 8;

    /// All lamps in index order.
    pub const ALL: [Lamp; Lamp::COUNT] = [
        Lamp::NsRed,
        Lamp::NsYellow,
        Lamp::NsGreen,
        Lamp::EwRed,
        Lamp::EwYellow,
        Lamp::EwGreen,
        Lamp::PedRed,
        Lamp::PedGreen,
    ];

    /// Position of this lamp in [`Lamp::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the lamp name as a short lowercase string.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossing_ctl::traits::Lamp;
    ///
    /// assert_eq!(Lamp::NsRed.as_str(), "ns-red");
    /// assert_eq!(Lamp::PedGreen.as_str(), "ped-green");
    /// ```
    pub const fn as_str(self) -> &'static str {
        match self {
            Lamp::NsRed => "ns-red",
            Lamp::NsYellow => "ns-yellow",
            Lamp::NsGreen => "ns-green",
            Lamp::EwRed => "ew-red",
            Lamp::EwYellow => "ew-yellow",
            Lamp::EwGreen => "ew-green",
            Lamp::PedRed => "ped-red",
            Lamp::PedGreen => "ped-green",
        }
    }
}

impl core::fmt::Display for Lamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three momentary push buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Button {
    /// Adds one car to the North-South queue count.
    NsCount,
    /// Adds one car to the East-West queue count.
    EwCount,
    /// Requests a pedestrian crossing.
    PedRequest,
}

impl Button {
    /// Number of buttons.
    pub const COUNT: usize = 3;

    /// All buttons in index order.
    pub const ALL: [Button; Button::COUNT] = [Button::NsCount, Button::EwCount, Button::PedRequest];

    /// Position of this button in [`Button::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the button name as a short lowercase string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Button::NsCount => "ns-count",
            Button::EwCount => "ew-count",
            Button::PedRequest => "ped-request",
        }
    }

    /// Parse a button from a keyboard shortcut or its name.
    ///
    /// Input is trimmed and case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossing_ctl::traits::Button;
    ///
    /// assert_eq!(Button::from_text("n"), Some(Button::NsCount));
    /// assert_eq!(Button::from_text(" EW "), Some(Button::EwCount));
    /// assert_eq!(Button::from_text("ped-request"), Some(Button::PedRequest));
    /// assert_eq!(Button::from_text("x"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "ns" | "ns-count" => Some(Button::NsCount),
            "e" | "ew" | "ew-count" => Some(Button::EwCount),
            "p" | "ped" | "ped-request" => Some(Button::PedRequest),
            _ => None,
        }
    }
}

impl core::fmt::Display for Button {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signal lamp driver.
///
/// Implement this for whatever drives the lamps: GPIO pins, a shift
/// register, an I/O expander. The controller only ever calls
/// [`apply`](Self::apply) with a complete, safe [`LampVector`].
///
/// # Example Implementation
///
/// ```rust,ignore
/// use crossing_ctl::traits::{Lamp, SignalOutputs};
///
/// struct ShiftRegister { /* ... */ }
///
/// impl SignalOutputs for ShiftRegister {
///     type Error = ();
///
///     fn set_lamp(&mut self, lamp: Lamp, on: bool) -> Result<(), ()> {
///         // Update the bit for `lamp` and latch...
///         Ok(())
///     }
/// }
/// ```
pub trait SignalOutputs {
    /// Error type for output operations.
    type Error;

    /// Switch a single lamp on or off.
    fn set_lamp(&mut self, lamp: Lamp, on: bool) -> Result<(), Self::Error>;

    /// Drive all eight lamps to the given vector.
    ///
    /// Lamps going dark are switched off before any lamp is switched on,
    /// so a half-applied vector never shows two proceed aspects at once.
    fn apply(&mut self, lamps: &LampVector) -> Result<(), Self::Error> {
        for lamp in Lamp::ALL {
            if !lamps.is_on(lamp) {
                self.set_lamp(lamp, false)?;
            }
        }
        for lamp in Lamp::ALL {
            if lamps.is_on(lamp) {
                self.set_lamp(lamp, true)?;
            }
        }
        Ok(())
    }
}

/// Instantaneous levels of the three buttons, already converted to
/// "pressed" polarity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonLevels {
    /// NS count button is held.
    pub ns_count: bool,
    /// EW count button is held.
    pub ew_count: bool,
    /// Pedestrian request button is held.
    pub ped_request: bool,
}

impl ButtonLevels {
    /// Returns whether `button` is held in this sample.
    pub const fn is_pressed(&self, button: Button) -> bool {
        match button {
            Button::NsCount => self.ns_count,
            Button::EwCount => self.ew_count,
            Button::PedRequest => self.ped_request,
        }
    }

    /// Sets the level of a single button.
    pub fn set(&mut self, button: Button, pressed: bool) {
        match button {
            Button::NsCount => self.ns_count = pressed,
            Button::EwCount => self.ew_count = pressed,
            Button::PedRequest => self.ped_request = pressed,
        }
    }
}

/// Momentary button input trait.
///
/// Implementations report the *logical* level: `true` means the button is
/// held, regardless of whether the wiring is active-low or active-high.
///
/// # Implementation Notes
///
/// - Reads must not block
/// - A failed read should report "released"; the next poll retries
/// - Debouncing is done by [`crate::InputSampler`], not here
pub trait ButtonInputs {
    /// Returns true if `button` is currently held.
    fn is_pressed(&mut self, button: Button) -> bool;

    /// Samples all three buttons at once.
    fn sample(&mut self) -> ButtonLevels {
        ButtonLevels {
            ns_count: self.is_pressed(Button::NsCount),
            ew_count: self.is_pressed(Button::EwCount),
            ped_request: self.is_pressed(Button::PedRequest),
        }
    }
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds for phase deadlines and
/// debounce windows. On desktop, this wraps `std::time::Instant`. On
/// embedded, use a hardware timer.
///
/// # Example
///
/// ```rust
/// use crossing_ctl::traits::Clock;
/// use crossing_ctl::hal::MockClock;
///
/// let clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Expected to be monotonic. Callers tolerate a clock that steps
    /// backwards by treating the negative difference as zero.
    fn now_ms(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    // =========================================================================
    // Lamp / Button Tests
    // =========================================================================

    #[test]
    fn lamp_indices_match_all_order() {
        for (i, lamp) in Lamp::ALL.iter().enumerate() {
            assert_eq!(lamp.index(), i);
        }
    }

    #[test]
    fn button_indices_match_all_order() {
        for (i, button) in Button::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
        }
    }

    #[test]
    fn lamp_display() {
        assert_eq!(format!("{}", Lamp::EwYellow), "ew-yellow");
    }

    #[test]
    fn button_from_text_variants() {
        assert_eq!(Button::from_text("N"), Some(Button::NsCount));
        assert_eq!(Button::from_text("ns"), Some(Button::NsCount));
        assert_eq!(Button::from_text("e"), Some(Button::EwCount));
        assert_eq!(Button::from_text("\tp\n"), Some(Button::PedRequest));
        assert_eq!(Button::from_text("ped"), Some(Button::PedRequest));
        assert_eq!(Button::from_text(""), None);
        assert_eq!(Button::from_text("walk"), None);
    }

    #[test]
    fn button_levels_set_and_read() {
        let mut levels = ButtonLevels::default();
        assert!(!levels.is_pressed(Button::EwCount));

        levels.set(Button::EwCount, true);
        assert!(levels.is_pressed(Button::EwCount));
        assert!(!levels.is_pressed(Button::NsCount));
        assert!(!levels.is_pressed(Button::PedRequest));
    }

    // =========================================================================
    // SignalOutputs Default Methods Tests
    // =========================================================================

    struct RecordingSignals {
        writes: Vec<(Lamp, bool)>,
    }

    impl SignalOutputs for RecordingSignals {
        type Error = ();

        fn set_lamp(&mut self, lamp: Lamp, on: bool) -> Result<(), ()> {
            self.writes.push((lamp, on));
            Ok(())
        }
    }

    #[test]
    fn apply_writes_every_lamp_once() {
        let mut signals = RecordingSignals { writes: Vec::new() };
        signals.apply(&LampVector::all_red()).unwrap();

        assert_eq!(signals.writes.len(), Lamp::COUNT);
        for lamp in Lamp::ALL {
            assert_eq!(signals.writes.iter().filter(|(l, _)| *l == lamp).count(), 1);
        }
    }

    #[test]
    fn apply_switches_off_before_on() {
        let mut signals = RecordingSignals { writes: Vec::new() };
        signals.apply(&LampVector::all_red()).unwrap();

        let first_on = signals.writes.iter().position(|(_, on)| *on).unwrap();
        assert!(signals.writes[first_on..].iter().all(|(_, on)| *on));
    }

    // =========================================================================
    // ButtonInputs Default Methods Tests
    // =========================================================================

    struct HeldButton(Button);

    impl ButtonInputs for HeldButton {
        fn is_pressed(&mut self, button: Button) -> bool {
            button == self.0
        }
    }

    #[test]
    fn sample_reads_each_button() {
        let mut input = HeldButton(Button::PedRequest);
        let levels = input.sample();
        assert_eq!(
            levels,
            ButtonLevels {
                ns_count: false,
                ew_count: false,
                ped_request: true,
            }
        );
    }
}
