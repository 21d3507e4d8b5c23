//! SSD1306 OLED status display for ESP32.
//!
//! Draws the two status lines in a 6x10 font with a divider between the
//! header and the body, so a 16-character line fits with room to spare.
//!
//! # Wiring
//!
//! - SDA → GPIO32
//! - SCL → GPIO33
//! - VCC → 3.3V
//! - GND → GND

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle},
    text::Text,
};
use esp_idf_hal::i2c::I2cDriver;
use ssd1306::{mode::BufferedGraphicsMode, prelude::*, I2CDisplayInterface, Ssd1306};

use crate::traits::StatusDisplay;

/// SSD1306 display type alias for cleaner code.
type DisplayDriver<'d> = Ssd1306<
    I2CInterface<I2cDriver<'d>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

/// SSD1306 OLED display for ESP32.
///
/// # Display Layout
///
/// ```text
/// ┌────────────────────────────┐
/// │  NS Green 10+10s           │  line 1
/// │ ────────────────────────── │
/// │  T=17 EW=3                 │  line 2
/// └────────────────────────────┘
/// ```
pub struct Esp32Display<'d> {
    display: DisplayDriver<'d>,
}

impl<'d> Esp32Display<'d> {
    /// Wraps an I2C driver configured for the display pins.
    ///
    /// Nothing is sent until [`StatusDisplay::init`].
    pub fn new(i2c: I2cDriver<'d>) -> Self {
        let interface = I2CDisplayInterface::new(i2c);
        let display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();

        Self { display }
    }
}

impl StatusDisplay for Esp32Display<'_> {
    type Error = DisplayError;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.display.init()?;
        self.clear()
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.display.clear(BinaryColor::Off)?;
        self.display.flush()?;
        Ok(())
    }

    fn show_lines(&mut self, line1: &str, line2: &str) -> Result<(), Self::Error> {
        self.display.clear(BinaryColor::Off)?;

        let text_style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let rule_style = PrimitiveStyle::with_stroke(BinaryColor::On, 1);

        Text::new(line1, Point::new(4, 20), text_style).draw(&mut self.display)?;
        Line::new(Point::new(4, 30), Point::new(123, 30))
            .into_styled(rule_style)
            .draw(&mut self.display)?;
        Text::new(line2, Point::new(4, 46), text_style).draw(&mut self.display)?;

        self.display.flush()?;
        Ok(())
    }
}

/// Display error type.
#[derive(Debug)]
pub struct DisplayError;

impl From<display_interface::DisplayError> for DisplayError {
    fn from(_: display_interface::DisplayError) -> Self {
        DisplayError
    }
}
