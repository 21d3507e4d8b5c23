//! ESP32 hardware abstraction layer for the junction controller.
//!
//! Lamps and buttons go through [`crate::hal::GpioSignals`] and
//! [`crate::hal::GpioButtons`] over ESP-IDF `PinDriver`s; this module adds
//! the board-specific pieces.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32 DevKit (Xtensa dual core, 240MHz)
//! - **Signals**: eight LEDs (or relay inputs), active high
//! - **Buttons**: three momentary switches to ground, internal pull-ups
//! - **Display**: SSD1306 128x64 OLED (I2C), optional
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for GPIO assignments.

mod clock;

pub use clock::Esp32Clock;

#[cfg(feature = "display")]
mod display;
#[cfg(feature = "display")]
pub use display::{DisplayError, Esp32Display};

/// Pin assignments for the ESP32 DevKit junction board.
///
/// These constants match the breadboard wiring:
/// - North-South head on GPIO2/4/5
/// - East-West head on GPIO18/19/21
/// - Pedestrian head on GPIO22/23
/// - Buttons on GPIO12-14 (active low)
/// - I2C display on GPIO32/33
pub mod pins {
    // =========================================================================
    // North-South Head
    // =========================================================================

    /// NS red lamp
    pub const NS_RED: i32 = 2;

    /// NS yellow lamp
    pub const NS_YELLOW: i32 = 4;

    /// NS green lamp
    pub const NS_GREEN: i32 = 5;

    // =========================================================================
    // East-West Head
    // =========================================================================

    /// EW red lamp
    pub const EW_RED: i32 = 18;

    /// EW yellow lamp
    pub const EW_YELLOW: i32 = 19;

    /// EW green lamp
    pub const EW_GREEN: i32 = 21;

    // =========================================================================
    // Pedestrian Head
    // =========================================================================

    /// Pedestrian "don't walk" lamp
    pub const PED_RED: i32 = 22;

    /// Pedestrian "walk" lamp
    pub const PED_GREEN: i32 = 23;

    // =========================================================================
    // Buttons (to ground, internal pull-up)
    // =========================================================================

    /// North-South traffic count button
    pub const BTN_NS_COUNT: i32 = 12;

    /// East-West traffic count button
    pub const BTN_EW_COUNT: i32 = 13;

    /// Pedestrian request button
    pub const BTN_PED: i32 = 14;

    // =========================================================================
    // I2C Display (SSD1306)
    // =========================================================================

    /// I2C data line
    pub const I2C_SDA: i32 = 32;

    /// I2C clock line
    pub const I2C_SCL: i32 = 33;

    /// Default I2C address for SSD1306 OLED
    pub const OLED_I2C_ADDR: u8 = 0x3C;
}
