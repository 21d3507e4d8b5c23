//! # crossing-ctl
//!
//! A two-road traffic intersection controller with count-based green
//! extension and pedestrian requests.
//!
//! ## Features
//!
//! - **Hardware abstraction**: Traits for signal lamps, push buttons, clock and status display
//! - **Count-based greens**: Each approach's green grows with the cars counted while it was red
//! - **Pedestrian requests**: A latched request diverts the cycle into a walk after the next yellow
//! - **Two scheduling styles**: Non-blocking ticks or blocking waits over `embedded-hal` delays
//! - **no_std core**: Runs on ESP32 or any `embedded-hal` board; tests run on the desktop
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware abstractions and the green-time policy
//! - `phase` - Phases, approaches and the transition rule
//! - `controller` - The phase state machine
//! - `input` - Button edge detection, debouncing and counting
//! - `render` - Lamp vectors and status text
//! - `intersection` - Driver that ties everything together
//! - `shared` - Lock-free press capture for interrupt handlers
//! - `hal` - Concrete implementations (mock for testing, gpio, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use crossing_ctl::{Config, Intersection, Phase};
//! use crossing_ctl::hal::{MockButtons, MockDisplay, MockSignals};
//! use crossing_ctl::traits::Button;
//!
//! let mut junction = Intersection::new(
//!     MockSignals::new(),
//!     MockButtons::new(),
//!     MockDisplay::new(),
//!     &Config::default(),
//! );
//! junction.power_on().unwrap();
//! junction.start(0).unwrap();
//!
//! // Three cars queue on East-West while North-South is green
//! for (i, t) in [100, 300, 500].into_iter().enumerate() {
//!     junction.buttons_mut().press(Button::EwCount);
//!     junction.tick(t).unwrap();
//!     junction.buttons_mut().release(Button::EwCount);
//!     junction.tick(t + 100).unwrap();
//!     assert_eq!(junction.snapshot(t).state.ew_count, i as u16 + 1);
//! }
//!
//! // Update in your main loop
//! let mut now = 600;
//! while junction.controller().phase() != Phase::EwGreen {
//!     now += 20; // 20ms tick
//!     junction.tick(now).unwrap();
//! }
//! assert_eq!(junction.snapshot(now).duration_secs, 10);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Core traits for hardware abstraction and green-time policy.
pub mod traits;

/// Shared configuration system for desktop and ESP32.
pub mod config;

/// The phase state machine.
pub mod controller;
/// Button sampling and counting.
pub mod input;
/// Intersection driver for tick and blocking scheduling.
pub mod intersection;
/// Phases, approaches and the transition rule.
pub mod phase;
/// Lamp vectors and status text.
pub mod render;
/// Interrupt-safe press capture.
pub mod shared;

// Re-exports for convenience
pub use config::{Config, ConfigError, CountGating, DebounceScope, InputConfig, TimingConfig};
pub use controller::{ControllerSnapshot, ControllerState, PhaseController};
pub use input::{InputSampler, SampleEvent, SampleReport};
pub use intersection::{Intersection, TickOutcome};
pub use phase::{Approach, Phase};
pub use render::{lamps_for, status_lines, LampVector, StatusText};
pub use shared::{PendingPresses, PressLatch};
pub use traits::{
    // Hardware
    Button,
    ButtonInputs,
    ButtonLevels,
    Clock,
    Lamp,
    SignalOutputs,
    // Display
    StatusDisplay,
    // Policy
    GreenTimePolicy,
    TieredGreenTime,
};
