//! Lamps and buttons on plain `embedded-hal` GPIO pins.
//!
//! Works with any HAL that implements the `embedded-hal` 1.0 digital
//! traits: ESP-IDF `PinDriver`s, RP2040, STM32, or the mocks in tests.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::traits::{Button, ButtonInputs, Lamp, SignalOutputs};

/// Eight output pins, one per lamp, in [`Lamp::ALL`] order.
///
/// A lamp is lit by driving its pin high.
///
/// # Example
///
/// ```ignore
/// let signals = GpioSignals::new([
///     ns_red, ns_yellow, ns_green,
///     ew_red, ew_yellow, ew_green,
///     ped_red, ped_green,
/// ]);
/// ```
pub struct GpioSignals<P: OutputPin> {
    pins: [P; Lamp::COUNT],
}

impl<P: OutputPin> GpioSignals<P> {
    /// Wraps the lamp pins, ordered as [`Lamp::ALL`].
    pub fn new(pins: [P; Lamp::COUNT]) -> Self {
        Self { pins }
    }

    /// Returns the pins.
    pub fn release(self) -> [P; Lamp::COUNT] {
        self.pins
    }
}

impl<P: OutputPin> SignalOutputs for GpioSignals<P> {
    type Error = P::Error;

    fn set_lamp(&mut self, lamp: Lamp, on: bool) -> Result<(), Self::Error> {
        let pin = &mut self.pins[lamp.index()];
        if on {
            pin.set_high()
        } else {
            pin.set_low()
        }
    }
}

/// Three input pins, one per button, in [`Button::ALL`] order.
pub struct GpioButtons<P: InputPin> {
    pins: [P; Button::COUNT],
    active_low: bool,
}

impl<P: InputPin> GpioButtons<P> {
    /// Wraps the button pins, ordered as [`Button::ALL`].
    ///
    /// With `active_low`, a pin reading low means pressed (pull-up wiring).
    pub fn new(pins: [P; Button::COUNT], active_low: bool) -> Self {
        Self { pins, active_low }
    }

    /// Returns the pins.
    pub fn release(self) -> [P; Button::COUNT] {
        self.pins
    }
}

impl<P: InputPin> ButtonInputs for GpioButtons<P> {
    fn is_pressed(&mut self, button: Button) -> bool {
        let pin = &mut self.pins[button.index()];
        let level = if self.active_low {
            pin.is_low()
        } else {
            pin.is_high()
        };
        // A failed read counts as released; the next poll retries.
        level.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::ErrorType;

    #[derive(Debug, Default)]
    struct FakePin {
        high: bool,
        broken: bool,
    }

    #[derive(Debug)]
    struct FakeError;

    impl embedded_hal::digital::Error for FakeError {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    impl ErrorType for FakePin {
        type Error = FakeError;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), FakeError> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), FakeError> {
            if self.broken {
                return Err(FakeError);
            }
            self.high = true;
            Ok(())
        }
    }

    impl InputPin for FakePin {
        fn is_high(&mut self) -> Result<bool, FakeError> {
            if self.broken {
                return Err(FakeError);
            }
            Ok(self.high)
        }

        fn is_low(&mut self) -> Result<bool, FakeError> {
            self.is_high().map(|high| !high)
        }
    }

    fn pins<const N: usize>() -> [FakePin; N] {
        core::array::from_fn(|_| FakePin::default())
    }

    #[test]
    fn lamp_pins_follow_vector() {
        let mut signals = GpioSignals::new(pins::<8>());
        signals
            .apply(&crate::render::lamps_for(crate::Phase::EwYellow))
            .unwrap();
        let pins = signals.release();
        let lit: [bool; 8] = core::array::from_fn(|i| pins[i].high);
        assert_eq!(lit, [true, false, false, false, true, false, true, false]);
    }

    #[test]
    fn output_error_propagates() {
        let mut raw = pins::<8>();
        raw[Lamp::PedRed.index()].broken = true;
        let mut signals = GpioSignals::new(raw);
        assert!(signals.set_lamp(Lamp::PedRed, true).is_err());
        assert!(signals.set_lamp(Lamp::PedRed, false).is_ok());
    }

    #[test]
    fn active_low_polarity() {
        let mut raw = pins::<3>();
        raw[0].high = false;
        raw[1].high = true;
        let mut buttons = GpioButtons::new(raw, true);
        assert!(buttons.is_pressed(Button::NsCount));
        assert!(!buttons.is_pressed(Button::EwCount));
    }

    #[test]
    fn active_high_polarity() {
        let mut raw = pins::<3>();
        raw[2].high = true;
        let mut buttons = GpioButtons::new(raw, false);
        let levels = buttons.sample();
        assert!(levels.ped_request);
        assert!(!levels.ns_count);
    }

    #[test]
    fn read_error_is_released() {
        let mut raw = pins::<3>();
        raw[0].broken = true;
        let mut buttons = GpioButtons::new(raw, true);
        assert!(!buttons.is_pressed(Button::NsCount));
    }
}
