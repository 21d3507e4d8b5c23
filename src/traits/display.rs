//! Display abstraction for intersection status text.
//!
//! This module defines the [`StatusDisplay`] trait for showing the two
//! status lines produced by [`crate::render`] on a character LCD, a small
//! OLED, a terminal, or a test double.

use crate::render::StatusText;

/// Display trait for two-line status text.
///
/// The display is purely observational: the controller never makes a
/// decision based on whether a write succeeded. Failures are logged and
/// the next refresh tries again.
///
/// # Example
///
/// ```ignore
/// use crossing_ctl::traits::StatusDisplay;
///
/// struct Lcd1602 { /* ... */ }
///
/// impl StatusDisplay for Lcd1602 {
///     type Error = ();
///
///     fn init(&mut self) -> Result<(), ()> { Ok(()) }
///     fn clear(&mut self) -> Result<(), ()> { Ok(()) }
///     fn show_lines(&mut self, line1: &str, line2: &str) -> Result<(), ()> {
///         // set cursor (0,0), print line1, set cursor (0,1), print line2
///         Ok(())
///     }
/// }
/// ```
pub trait StatusDisplay {
    /// Error type for display operations.
    type Error: core::fmt::Debug;

    /// Initializes the display hardware.
    ///
    /// Called once at startup, before the first [`show_lines`](Self::show_lines).
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Clears the display.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Replaces the screen contents with two lines of text.
    ///
    /// Lines are at most [`crate::render::LINE_WIDTH`] characters when they
    /// come from the renderer.
    fn show_lines(&mut self, line1: &str, line2: &str) -> Result<(), Self::Error>;

    /// Shows rendered status text.
    fn render(&mut self, text: &StatusText) -> Result<(), Self::Error> {
        self.show_lines(text.line1.as_str(), text.line2.as_str())
    }
}

/// Display that discards everything.
///
/// For builds with no display attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDisplay;

impl StatusDisplay for NoDisplay {
    type Error = core::convert::Infallible;

    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn show_lines(&mut self, _line1: &str, _line2: &str) -> Result<(), Self::Error> {
        Ok(())
    }
}
