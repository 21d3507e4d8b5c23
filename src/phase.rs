//! Signal phases, approaches, and the cyclic transition rule.
//!
//! ```text
//! NsGreen -> NsYellow -+-> EwGreen -> EwYellow -+-> NsGreen -> ...
//!                      |       ^                |       ^
//!                      +-> PedestrianWalk ------+-------+
//!                         (only when requested)
//! ```
//!
//! After a yellow phase, a pending pedestrian request diverts the cycle into
//! [`Phase::PedestrianWalk`]; the walk always hands over to
//! [`Phase::NsGreen`].

/// One road direction through the junction.
///
/// NS and EW behave identically apart from which lamps and which counter
/// they own, so everything direction-specific goes through this type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Approach {
    /// The North-South road.
    NorthSouth,
    /// The East-West road.
    EastWest,
}

impl Approach {
    /// Both approaches, NS first.
    pub const ALL: [Approach; 2] = [Approach::NorthSouth, Approach::EastWest];

    /// The green phase serving this approach.
    pub const fn green(self) -> Phase {
        match self {
            Approach::NorthSouth => Phase::NsGreen,
            Approach::EastWest => Phase::EwGreen,
        }
    }

    /// The yellow phase ending this approach's green.
    pub const fn yellow(self) -> Phase {
        match self {
            Approach::NorthSouth => Phase::NsYellow,
            Approach::EastWest => Phase::EwYellow,
        }
    }

    /// The crossing approach.
    pub const fn other(self) -> Approach {
        match self {
            Approach::NorthSouth => Approach::EastWest,
            Approach::EastWest => Approach::NorthSouth,
        }
    }

    /// Returns true if this approach shows red during `phase`.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossing_ctl::{Approach, Phase};
    ///
    /// assert!(Approach::NorthSouth.is_red_during(Phase::EwYellow));
    /// assert!(Approach::NorthSouth.is_red_during(Phase::PedestrianWalk));
    /// assert!(!Approach::NorthSouth.is_red_during(Phase::NsYellow));
    /// ```
    pub const fn is_red_during(self, phase: Phase) -> bool {
        match phase.approach() {
            Some(served) => !matches!(
                (served, self),
                (Approach::NorthSouth, Approach::NorthSouth) | (Approach::EastWest, Approach::EastWest)
            ),
            None => true,
        }
    }

    /// Two-letter label used on the status display.
    pub const fn label(self) -> &'static str {
        match self {
            Approach::NorthSouth => "NS",
            Approach::EastWest => "EW",
        }
    }
}

impl core::fmt::Display for Approach {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// The active combination of signal aspects.
///
/// Exactly one phase is active at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Phase {
    /// North-South proceeds; East-West and pedestrians hold.
    #[default]
    NsGreen,
    /// North-South clears; everyone else holds.
    NsYellow,
    /// East-West proceeds; North-South and pedestrians hold.
    EwGreen,
    /// East-West clears; everyone else holds.
    EwYellow,
    /// All vehicles hold; pedestrians cross.
    PedestrianWalk,
}

impl Phase {
    /// Every phase, in nominal cycle order.
    pub const ALL: [Phase; 5] = [
        Phase::NsGreen,
        Phase::NsYellow,
        Phase::EwGreen,
        Phase::EwYellow,
        Phase::PedestrianWalk,
    ];

    /// The vehicle approach this phase serves, if any.
    pub const fn approach(self) -> Option<Approach> {
        match self {
            Phase::NsGreen | Phase::NsYellow => Some(Approach::NorthSouth),
            Phase::EwGreen | Phase::EwYellow => Some(Approach::EastWest),
            Phase::PedestrianWalk => None,
        }
    }

    /// The approach whose green this is, if this is a green phase.
    pub const fn green_of(self) -> Option<Approach> {
        match self {
            Phase::NsGreen => Some(Approach::NorthSouth),
            Phase::EwGreen => Some(Approach::EastWest),
            _ => None,
        }
    }

    /// Returns true for [`Phase::NsYellow`] and [`Phase::EwYellow`].
    pub const fn is_yellow(self) -> bool {
        matches!(self, Phase::NsYellow | Phase::EwYellow)
    }

    /// The phase that follows this one.
    ///
    /// `ped_requested` only matters after a yellow phase; everywhere else the
    /// successor is fixed.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossing_ctl::Phase;
    ///
    /// assert_eq!(Phase::NsGreen.successor(true), Phase::NsYellow);
    /// assert_eq!(Phase::NsYellow.successor(false), Phase::EwGreen);
    /// assert_eq!(Phase::NsYellow.successor(true), Phase::PedestrianWalk);
    /// assert_eq!(Phase::EwYellow.successor(false), Phase::NsGreen);
    /// assert_eq!(Phase::PedestrianWalk.successor(true), Phase::NsGreen);
    /// ```
    pub const fn successor(self, ped_requested: bool) -> Phase {
        match (self, ped_requested) {
            (Phase::NsGreen, _) => Phase::NsYellow,
            (Phase::EwGreen, _) => Phase::EwYellow,
            (Phase::NsYellow | Phase::EwYellow, true) => Phase::PedestrianWalk,
            (Phase::NsYellow, false) => Phase::EwGreen,
            (Phase::EwYellow, false) => Phase::NsGreen,
            (Phase::PedestrianWalk, _) => Phase::NsGreen,
        }
    }

    /// Returns the phase as a snake_case string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::NsGreen => "ns_green",
            Phase::NsYellow => "ns_yellow",
            Phase::EwGreen => "ew_green",
            Phase::EwYellow => "ew_yellow",
            Phase::PedestrianWalk => "pedestrian_walk",
        }
    }
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
