//! Trait definitions for hardware abstraction, display, and green-time policy.
//!
//! This module defines the core abstractions that allow crossing-ctl to:
//! - Run on different hardware (ESP32, any `embedded-hal` board, desktop mock)
//! - Report status on different displays
//! - Swap the traffic-count to green-time mapping
//!
//! # Submodules
//!
//! - `hardware`: Signal lamps, buttons, clock
//! - `display`: Two-line status display trait
//! - `policy`: Green-time policy trait and the tiered table
//!
//! # Hardware Abstraction
//!
//! The key hardware traits are:
//!
//! - [`SignalOutputs`]: The eight signal lamps
//! - [`ButtonInputs`]: NS-count, EW-count and pedestrian buttons
//! - [`Clock`]: Time source for `no_std` environments
//!
//! # Green Time
//!
//! Green-phase length comes from a [`GreenTimePolicy`]; the built-in
//! [`TieredGreenTime`] implements the base-plus-extra table.

pub mod display;
pub mod hardware;
pub mod policy;

pub use display::*;
pub use hardware::*;
pub use policy::*;
