//! Host implementations backed by the standard library.
//!
//! Used by the desktop simulator: a wall clock that can run faster than
//! real time, a sleeping delay that matches it, and a display that prints
//! to the terminal.

use std::io::Write as _;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

use crate::traits::{Clock, StatusDisplay};

/// Wall clock measured from construction, optionally sped up.
///
/// ```rust
/// use crossing_ctl::hal::StdClock;
/// use crossing_ctl::traits::Clock;
///
/// let clock = StdClock::with_speed(10);
/// assert!(clock.now_ms() < 1_000);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct StdClock {
    epoch: Instant,
    speed: u32,
}

impl StdClock {
    /// Real-time clock.
    pub fn new() -> Self {
        Self::with_speed(1)
    }

    /// Clock running `speed` times faster than real time (minimum 1).
    pub fn with_speed(speed: u32) -> Self {
        Self {
            epoch: Instant::now(),
            speed: speed.max(1),
        }
    }

    /// The speed-up factor.
    pub fn speed(&self) -> u32 {
        self.speed
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn now_ms(&self) -> u64 {
        let real = u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX);
        real.saturating_mul(u64::from(self.speed))
    }
}

/// Delay that sleeps the thread, divided by the same speed-up factor
/// as a [`StdClock`].
#[derive(Clone, Copy, Debug)]
pub struct StdDelay {
    speed: u32,
}

impl StdDelay {
    /// Delay matching `clock`'s speed.
    pub fn matching(clock: &StdClock) -> Self {
        Self {
            speed: clock.speed(),
        }
    }
}

impl Default for StdDelay {
    fn default() -> Self {
        Self { speed: 1 }
    }
}

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns / self.speed.max(1))));
    }
}

/// Two-line display drawn on stdout.
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    last: Option<(String, String)>,
}

impl ConsoleDisplay {
    /// Creates a console display.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusDisplay for ConsoleDisplay {
    type Error = std::io::Error;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.clear()
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.last = None;
        Ok(())
    }

    fn show_lines(&mut self, line1: &str, line2: &str) -> Result<(), Self::Error> {
        let changed = self
            .last
            .as_ref()
            .map_or(true, |(l1, l2)| l1 != line1 || l2 != line2);
        if !changed {
            return Ok(());
        }
        let mut out = std::io::stdout().lock();
        writeln!(out, "+----------------+")?;
        writeln!(out, "|{:<16}|", line1)?;
        writeln!(out, "|{:<16}|", line2)?;
        writeln!(out, "+----------------+")?;
        out.flush()?;
        self.last = Some((line1.to_owned(), line2.to_owned()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_is_at_least_one() {
        assert_eq!(StdClock::with_speed(0).speed(), 1);
        assert_eq!(StdDelay::matching(&StdClock::with_speed(5)).speed, 5);
    }

    #[test]
    fn clock_starts_near_zero() {
        let clock = StdClock::new();
        assert!(clock.now_ms() < 1_000);
    }
}
