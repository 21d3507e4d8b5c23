//! Output rendering: phase to lamp levels, state to status text.
//!
//! Everything here is a pure function of its input. The signal table is:
//!
//! | Phase | NS R/Y/G | EW R/Y/G | Ped R/G |
//! |---|---|---|---|
//! | NsGreen | off/off/on | on/off/off | on/off |
//! | NsYellow | off/on/off | on/off/off | on/off |
//! | EwGreen | on/off/off | off/off/on | on/off |
//! | EwYellow | on/off/off | off/on/off | on/off |
//! | PedestrianWalk | on/off/off | on/off/off | off/on |
//!
//! # Example
//!
//! ```rust
//! use crossing_ctl::render::lamps_for;
//! use crossing_ctl::traits::Lamp;
//! use crossing_ctl::Phase;
//!
//! let lamps = lamps_for(Phase::PedestrianWalk);
//! assert!(lamps.is_on(Lamp::PedGreen));
//! assert!(lamps.is_on(Lamp::NsRed) && lamps.is_on(Lamp::EwRed));
//! assert!(lamps.is_safe());
//! ```

use core::fmt::Write;

use heapless::String as HString;

use crate::controller::ControllerSnapshot;
use crate::input::SampleEvent;
use crate::phase::Phase;
use crate::traits::Lamp;

// ============================================================================
// Lamp Vector
// ============================================================================

/// On/off level for each of the eight lamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LampVector {
    levels: [bool; Lamp::COUNT],
}

impl LampVector {
    /// Every lamp dark.
    pub const fn dark() -> Self {
        Self {
            levels: [false; Lamp::COUNT],
        }
    }

    /// Vehicles red in both directions, pedestrians red.
    ///
    /// The startup state and the state shown before the first phase.
    pub const fn all_red() -> Self {
        Self::dark()
            .with(Lamp::NsRed, true)
            .with(Lamp::EwRed, true)
            .with(Lamp::PedRed, true)
    }

    /// Returns a copy with `lamp` set to `on`.
    pub const fn with(mut self, lamp: Lamp, on: bool) -> Self {
        self.levels[lamp.index()] = on;
        self
    }

    /// Returns whether `lamp` is lit.
    #[inline]
    pub const fn is_on(&self, lamp: Lamp) -> bool {
        self.levels[lamp.index()]
    }

    /// Iterates `(lamp, on)` pairs in [`Lamp::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Lamp, bool)> + '_ {
        Lamp::ALL.iter().map(move |&lamp| (lamp, self.is_on(lamp)))
    }

    /// Returns true if no approach is lit with red and a proceed aspect,
    /// at most one approach proceeds, exactly one pedestrian aspect is lit,
    /// and pedestrian walk implies both vehicle reds.
    pub fn is_safe(&self) -> bool {
        let head_ok = |red: Lamp, yellow: Lamp, green: Lamp| {
            let lit = [self.is_on(red), self.is_on(yellow), self.is_on(green)];
            lit.iter().filter(|&&on| on).count() == 1
        };
        let ns_ok = head_ok(Lamp::NsRed, Lamp::NsYellow, Lamp::NsGreen);
        let ew_ok = head_ok(Lamp::EwRed, Lamp::EwYellow, Lamp::EwGreen);
        let ped_ok = self.is_on(Lamp::PedRed) != self.is_on(Lamp::PedGreen);

        let both_moving = !self.is_on(Lamp::NsRed) && !self.is_on(Lamp::EwRed);
        let walk_conflict =
            self.is_on(Lamp::PedGreen) && !(self.is_on(Lamp::NsRed) && self.is_on(Lamp::EwRed));

        ns_ok && ew_ok && ped_ok && !both_moving && !walk_conflict
    }
}

/// The lamp vector shown during `phase`.
pub const fn lamps_for(phase: Phase) -> LampVector {
    let held = LampVector::dark().with(Lamp::PedRed, true);
    match phase {
        Phase::NsGreen => held.with(Lamp::NsGreen, true).with(Lamp::EwRed, true),
        Phase::NsYellow => held.with(Lamp::NsYellow, true).with(Lamp::EwRed, true),
        Phase::EwGreen => held.with(Lamp::NsRed, true).with(Lamp::EwGreen, true),
        Phase::EwYellow => held.with(Lamp::NsRed, true).with(Lamp::EwYellow, true),
        Phase::PedestrianWalk => LampVector::dark()
            .with(Lamp::NsRed, true)
            .with(Lamp::EwRed, true)
            .with(Lamp::PedGreen, true),
    }
}

// ============================================================================
// Status Text
// ============================================================================

/// Characters per display line.
pub const LINE_WIDTH: usize = 16;

/// One display line.
pub type Line = HString<LINE_WIDTH>;

/// Two lines of status text for a 16x2 display.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusText {
    /// Top line.
    pub line1: Line,
    /// Bottom line.
    pub line2: Line,
}

impl StatusText {
    /// Builds status text from two strings, cutting each to [`LINE_WIDTH`].
    ///
    /// # Examples
    ///
    /// ```
    /// use crossing_ctl::render::StatusText;
    ///
    /// let text = StatusText::new("Pedestrian Request", "Stored.");
    /// assert_eq!(text.line1.as_str(), "Pedestrian Reque");
    /// assert_eq!(text.line2.as_str(), "Stored.");
    /// ```
    pub fn new(line1: &str, line2: &str) -> Self {
        let mut text = Self::default();
        let _ = text.line1_writer().write_str(line1);
        let _ = text.line2_writer().write_str(line2);
        text
    }

    fn line1_writer(&mut self) -> LineWriter<'_> {
        LineWriter(&mut self.line1)
    }

    fn line2_writer(&mut self) -> LineWriter<'_> {
        LineWriter(&mut self.line2)
    }
}

/// `fmt::Write` adapter that drops whatever does not fit on the line.
struct LineWriter<'a>(&'a mut Line);

impl Write for LineWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Status text for the controller's current state.
///
/// Layouts:
///
/// ```text
/// NS Green 10+10s      NS Yellow T=3s      PEDESTRIAN        Traffic System
/// T=17 EW=3            EW=3                T=8 WALK          Ready
/// ```
///
/// During the all-red hold after a walk the text is `PEDESTRIAN` / `STOP`.
pub fn status_lines(snapshot: &ControllerSnapshot) -> StatusText {
    if !snapshot.running {
        return StatusText::new("Traffic System", "Ready");
    }

    let mut text = StatusText::default();
    let state = &snapshot.state;

    match (state.phase.approach(), state.phase.is_yellow()) {
        (Some(approach), false) => {
            let waiting = approach.other();
            let extra = snapshot.duration_secs.saturating_sub(snapshot.base_green_secs);
            let _ = write!(
                text.line1_writer(),
                "{} Green {}+{}s",
                approach,
                snapshot.base_green_secs,
                extra
            );
            let _ = write!(
                text.line2_writer(),
                "T={} {}={}",
                snapshot.remaining_secs,
                waiting,
                state.count(waiting)
            );
        }
        (Some(approach), true) => {
            let waiting = approach.other();
            let _ = write!(
                text.line1_writer(),
                "{} Yellow T={}s",
                approach,
                snapshot.remaining_secs
            );
            let _ = write!(text.line2_writer(), "{}={}", waiting, state.count(waiting));
        }
        (None, _) if snapshot.clearing => {
            return StatusText::new("PEDESTRIAN", "STOP");
        }
        (None, _) => {
            let _ = text.line1_writer().write_str("PEDESTRIAN");
            let _ = write!(text.line2_writer(), "T={} WALK", snapshot.remaining_secs);
        }
    }

    text
}

/// Feedback text for an accepted button edge.
pub fn event_message(event: &SampleEvent) -> StatusText {
    let mut text = StatusText::default();
    match *event {
        SampleEvent::Counted { approach, count } => {
            let _ = write!(text.line1_writer(), "{} RED: Count", approach);
            let _ = write!(text.line2_writer(), "{}={}", approach, count);
        }
        SampleEvent::NotRed { approach } => {
            let _ = write!(text.line1_writer(), "{} not RED", approach);
            let _ = text.line2_writer().write_str("No count");
        }
        SampleEvent::PedestrianRequested { .. } => {
            return StatusText::new("Pedestrian Req", "Stored.");
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerState;
    use crate::phase::Approach;

    fn snapshot(phase: Phase, remaining: u16, duration: u16) -> ControllerSnapshot {
        ControllerSnapshot {
            state: ControllerState {
                phase,
                ns_count: 3,
                ew_count: 7,
                ped_requested: false,
            },
            running: true,
            remaining_secs: remaining,
            duration_secs: duration,
            base_green_secs: 10,
            clearing: false,
        }
    }

    // =========================================================================
    // Lamp Table Tests
    // =========================================================================

    fn row(phase: Phase) -> [bool; 8] {
        let lamps = lamps_for(phase);
        let mut out = [false; 8];
        for (lamp, on) in lamps.iter() {
            out[lamp.index()] = on;
        }
        out
    }

    #[test]
    fn lamp_table_rows() {
        //                          NS R   Y      G      EW R   Y      G      Ped R  G
        assert_eq!(row(Phase::NsGreen), [false, false, true, true, false, false, true, false]);
        assert_eq!(row(Phase::NsYellow), [false, true, false, true, false, false, true, false]);
        assert_eq!(row(Phase::EwGreen), [true, false, false, false, false, true, true, false]);
        assert_eq!(row(Phase::EwYellow), [true, false, false, false, true, false, true, false]);
        assert_eq!(
            row(Phase::PedestrianWalk),
            [true, false, false, true, false, false, false, true]
        );
    }

    #[test]
    fn every_phase_is_safe() {
        for phase in Phase::ALL {
            assert!(lamps_for(phase).is_safe(), "{phase}");
        }
        assert!(LampVector::all_red().is_safe());
    }

    #[test]
    fn phases_render_distinct_vectors() {
        for a in Phase::ALL {
            for b in Phase::ALL {
                assert_eq!(a == b, lamps_for(a) == lamps_for(b));
            }
        }
    }

    #[test]
    fn unsafe_vectors_detected() {
        assert!(!LampVector::dark().is_safe());

        let both_green = LampVector::dark()
            .with(Lamp::NsGreen, true)
            .with(Lamp::EwGreen, true)
            .with(Lamp::PedRed, true);
        assert!(!both_green.is_safe());

        let red_and_green = lamps_for(Phase::NsGreen).with(Lamp::NsRed, true);
        assert!(!red_and_green.is_safe());

        let walk_into_traffic = lamps_for(Phase::NsGreen)
            .with(Lamp::PedRed, false)
            .with(Lamp::PedGreen, true);
        assert!(!walk_into_traffic.is_safe());
    }

    // =========================================================================
    // Status Text Tests
    // =========================================================================

    #[test]
    fn green_status_shows_split_and_waiting_count() {
        let text = status_lines(&snapshot(Phase::NsGreen, 17, 20));
        assert_eq!(text.line1.as_str(), "NS Green 10+10s");
        assert_eq!(text.line2.as_str(), "T=17 EW=7");

        let text = status_lines(&snapshot(Phase::EwGreen, 5, 10));
        assert_eq!(text.line1.as_str(), "EW Green 10+0s");
        assert_eq!(text.line2.as_str(), "T=5 NS=3");
    }

    #[test]
    fn yellow_status() {
        let text = status_lines(&snapshot(Phase::NsYellow, 3, 3));
        assert_eq!(text.line1.as_str(), "NS Yellow T=3s");
        assert_eq!(text.line2.as_str(), "EW=7");

        let text = status_lines(&snapshot(Phase::EwYellow, 1, 3));
        assert_eq!(text.line1.as_str(), "EW Yellow T=1s");
        assert_eq!(text.line2.as_str(), "NS=3");
    }

    #[test]
    fn pedestrian_status() {
        let text = status_lines(&snapshot(Phase::PedestrianWalk, 8, 8));
        assert_eq!(text.line1.as_str(), "PEDESTRIAN");
        assert_eq!(text.line2.as_str(), "T=8 WALK");

        let mut snap = snapshot(Phase::PedestrianWalk, 0, 8);
        snap.clearing = true;
        let text = status_lines(&snap);
        assert_eq!(text.line1.as_str(), "PEDESTRIAN");
        assert_eq!(text.line2.as_str(), "STOP");
    }

    #[test]
    fn idle_status() {
        let mut snap = snapshot(Phase::NsGreen, 0, 0);
        snap.running = false;
        let text = status_lines(&snap);
        assert_eq!(text.line1.as_str(), "Traffic System");
        assert_eq!(text.line2.as_str(), "Ready");
    }

    #[test]
    fn long_numbers_are_cut_to_line_width() {
        let mut snap = snapshot(Phase::NsGreen, u16::MAX, u16::MAX);
        snap.base_green_secs = u16::MAX;
        snap.state.ew_count = u16::MAX;
        let text = status_lines(&snap);
        assert!(text.line1.chars().count() <= LINE_WIDTH);
        assert!(text.line2.chars().count() <= LINE_WIDTH);
    }

    #[test]
    fn event_messages() {
        let text = event_message(&SampleEvent::Counted {
            approach: Approach::NorthSouth,
            count: 4,
        });
        assert_eq!(text.line1.as_str(), "NS RED: Count");
        assert_eq!(text.line2.as_str(), "NS=4");

        let text = event_message(&SampleEvent::NotRed {
            approach: Approach::EastWest,
        });
        assert_eq!(text.line1.as_str(), "EW not RED");
        assert_eq!(text.line2.as_str(), "No count");

        let text = event_message(&SampleEvent::PedestrianRequested {
            already_pending: false,
        });
        assert_eq!(text.line1.as_str(), "Pedestrian Req");
        assert_eq!(text.line2.as_str(), "Stored.");
    }

    #[test]
    fn status_text_new_truncates_multibyte_safely() {
        let text = StatusText::new("ÄÖÜÄÖÜÄÖÜÄÖÜÄÖÜÄÖÜ", "");
        assert_eq!(text.line1.chars().count(), 8);
    }
}
