//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `gpio`: Lamps and buttons on any `embedded-hal` 1.0 pins
//! - `host`: Host clock, delay and console display (requires `std` feature)
//! - `esp32`: ESP32 clock, pin map and OLED display (requires `esp32` feature)

pub mod gpio;
pub mod mock;

#[cfg(feature = "std")]
pub mod host;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use gpio::*;
pub use mock::*;

#[cfg(feature = "std")]
pub use host::*;

#[cfg(feature = "esp32")]
pub use esp32::*;
