//! ESP32 clock implementation using the ESP-IDF high-resolution timer.

use crate::traits::Clock;

/// ESP32 clock using the hardware timer.
///
/// `esp_timer_get_time()` counts microseconds since boot and never wraps
/// in practice, so phase deadlines can be plain `u64` milliseconds.
///
/// # Example
///
/// ```ignore
/// use crossing_ctl::hal::esp32::Esp32Clock;
/// use crossing_ctl::traits::Clock;
///
/// let clock = Esp32Clock::new();
/// intersection.tick(clock.now_ms())?;
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Esp32Clock;

impl Esp32Clock {
    /// Creates a new ESP32 clock instance.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for Esp32Clock {
    #[inline]
    fn now_ms(&self) -> u64 {
        // SAFETY: read-only query of the system timer
        let micros = unsafe { esp_idf_hal::sys::esp_timer_get_time() };
        u64::try_from(micros / 1000).unwrap_or(0)
    }
}
