//! Shared configuration system for desktop and ESP32.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! # Example
//!
//! ```rust
//! use crossing_ctl::config::{Config, InputConfig, TimingConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert!(config.validate().is_ok());
//!
//! // Or customize
//! let config = Config::default()
//!     .with_timing(TimingConfig::default().with_pedestrian_secs(12))
//!     .with_input(InputConfig::default().with_max_count(Some(10)));
//! ```

use heapless::String as HString;

use crate::traits::TieredGreenTime;

/// Maximum length for short config strings (device names)
pub const MAX_SHORT_STRING: usize = 32;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    for c in s.chars() {
        if hs.push(c).is_err() {
            break;
        }
    }
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Phase durations and loop timing
    pub timing: TimingConfig,
    /// Button sampling and counting rules
    pub input: InputConfig,
    /// Device identification
    pub device: DeviceConfig,
}

impl Config {
    /// Set timing configuration
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Set input configuration
    pub fn with_input(mut self, input: InputConfig) -> Self {
        self.input = input;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }

    /// Check every section for values the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// A configuration value the controller refuses to run with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Base green time is zero seconds.
    ZeroGreen,
    /// Yellow time is zero seconds.
    ZeroYellow,
    /// Pedestrian walk time is zero seconds.
    ZeroPedestrian,
    /// Loop step is zero milliseconds.
    ZeroStep,
    /// Green tiers are not in strictly increasing threshold order.
    UnorderedTiers,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            ConfigError::ZeroGreen => "base green time must be at least one second",
            ConfigError::ZeroYellow => "yellow time must be at least one second",
            ConfigError::ZeroPedestrian => "pedestrian time must be at least one second",
            ConfigError::ZeroStep => "loop step must be at least one millisecond",
            ConfigError::UnorderedTiers => "green tiers must have increasing thresholds",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

// ============================================================================
// Timing Config
// ============================================================================

/// Phase durations and loop timing
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingConfig {
    /// Green time table, indexed by the approach's traffic count
    pub green: TieredGreenTime,
    /// Yellow phase length in seconds
    pub yellow_secs: u16,
    /// Pedestrian walk length in seconds
    pub pedestrian_secs: u16,
    /// All-red hold after the walk, in milliseconds (0 disables it)
    pub clearance_ms: u32,
    /// Control loop step in milliseconds (tick period, or blocking poll step)
    pub step_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            green: TieredGreenTime::CANONICAL,
            yellow_secs: 3,
            pedestrian_secs: 8,
            clearance_ms: 500,
            step_ms: 20,
        }
    }
}

impl TimingConfig {
    /// Set the green time table
    pub fn with_green(mut self, green: TieredGreenTime) -> Self {
        self.green = green;
        self
    }

    /// Set the yellow duration
    pub fn with_yellow_secs(mut self, secs: u16) -> Self {
        self.yellow_secs = secs;
        self
    }

    /// Set the pedestrian walk duration
    pub fn with_pedestrian_secs(mut self, secs: u16) -> Self {
        self.pedestrian_secs = secs;
        self
    }

    /// Set the all-red hold that ends a walk
    pub fn with_clearance_ms(mut self, ms: u32) -> Self {
        self.clearance_ms = ms;
        self
    }

    /// Set the loop step
    pub fn with_step_ms(mut self, ms: u32) -> Self {
        self.step_ms = ms;
        self
    }

    /// Reject durations of zero and unreachable green tiers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.green.base_secs == 0 {
            return Err(ConfigError::ZeroGreen);
        }
        if self.yellow_secs == 0 {
            return Err(ConfigError::ZeroYellow);
        }
        if self.pedestrian_secs == 0 {
            return Err(ConfigError::ZeroPedestrian);
        }
        if self.step_ms == 0 {
            return Err(ConfigError::ZeroStep);
        }
        if !self.green.is_monotonic() {
            return Err(ConfigError::UnorderedTiers);
        }
        Ok(())
    }
}

// ============================================================================
// Input Config
// ============================================================================

/// When a count button press is added to its approach's counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CountGating {
    /// Count only while the approach shows red.
    #[default]
    WhileRed,
    /// Count every press.
    Always,
}

/// Which presses a debounce window blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DebounceScope {
    /// Each button has its own window.
    #[default]
    PerButton,
    /// One window shared by all buttons; a press on one masks the others.
    Shared,
}

/// Button sampling and counting rules
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputConfig {
    /// Minimum time between accepted edges in milliseconds
    pub debounce_ms: u32,
    /// Whether windows are per button or shared
    pub debounce_scope: DebounceScope,
    /// When count presses register
    pub gating: CountGating,
    /// Upper bound for each traffic counter (None = saturate at u16::MAX)
    pub max_count: Option<u16>,
    /// Buttons pull the line low when pressed
    pub active_low: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            debounce_scope: DebounceScope::PerButton,
            gating: CountGating::WhileRed,
            max_count: None,
            active_low: true,
        }
    }
}

impl InputConfig {
    /// Set the debounce window
    pub fn with_debounce_ms(mut self, ms: u32) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Set the debounce scope
    pub fn with_debounce_scope(mut self, scope: DebounceScope) -> Self {
        self.debounce_scope = scope;
        self
    }

    /// Set the count gating rule
    pub fn with_gating(mut self, gating: CountGating) -> Self {
        self.gating = gating;
        self
    }

    /// Set the counter clamp
    pub fn with_max_count(mut self, max: Option<u16>) -> Self {
        self.max_count = max;
        self
    }

    /// Set button polarity
    pub fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Name shown on the boot splash
    pub name: ShortString,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("Traffic System"),
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
