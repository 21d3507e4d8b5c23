//! Green-time policy: how long an approach stays green given its queue count.
//!
//! This module defines the [`GreenTimePolicy`] trait and the built-in
//! [`TieredGreenTime`] table.
//!
//! # Canonical Table
//!
//! | Count | Base | Extra | Green |
//! |-------|------|-------|-------|
//! | 0-4   | 10 s | 0 s   | 10 s  |
//! | 5-9   | 10 s | 10 s  | 20 s  |
//! | 10-14 | 10 s | 20 s  | 30 s  |
//! | 15+   | 10 s | 30 s  | 40 s  |
//!
//! Tiers are checked from the highest threshold down; a count equal to a
//! threshold belongs to that threshold's tier.
//!
//! # Examples
//!
//! ```rust
//! use crossing_ctl::traits::{GreenTimePolicy, TieredGreenTime};
//!
//! let policy = TieredGreenTime::default();
//! assert_eq!(policy.green_secs(0), 10);
//! assert_eq!(policy.green_secs(5), 20);
//! assert_eq!(policy.green_secs(14), 30);
//! assert_eq!(policy.green_secs(500), 40);
//! ```

/// Maps a traffic count to a green-phase length.
///
/// Implementations must be pure: the same count always yields the same
/// duration, so the duration can be computed once at phase entry.
pub trait GreenTimePolicy {
    /// Minimum green time in whole seconds (the zero-traffic case).
    fn base_secs(&self) -> u16;

    /// Total green time in whole seconds for `count` queued cars.
    fn green_secs(&self, count: u16) -> u16;

    /// Seconds granted on top of the base for `count` queued cars.
    fn extra_secs(&self, count: u16) -> u16 {
        self.green_secs(count).saturating_sub(self.base_secs())
    }
}

/// One step of a [`TieredGreenTime`] table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GreenTier {
    /// Smallest count that earns this tier.
    pub min_count: u16,
    /// Seconds added to the base green time.
    pub extra_secs: u16,
}

impl GreenTier {
    /// Creates a tier.
    pub const fn new(min_count: u16, extra_secs: u16) -> Self {
        Self {
            min_count,
            extra_secs,
        }
    }
}

/// Number of extension tiers in a [`TieredGreenTime`] table.
pub const GREEN_TIERS: usize = 3;

/// Base-plus-extra green time table.
///
/// `tiers` are kept in ascending `min_count` order; lookup walks them from
/// the top so the highest satisfied threshold wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TieredGreenTime {
    /// Green time with no extension.
    pub base_secs: u16,
    /// Extension tiers, ascending by `min_count`.
    pub tiers: [GreenTier; GREEN_TIERS],
}

impl TieredGreenTime {
    /// The canonical table: 10 s base, +10/+20/+30 s at 5/10/15 cars.
    pub const CANONICAL: Self = Self {
        base_secs: 10,
        tiers: [
            GreenTier::new(5, 10),
            GreenTier::new(10, 20),
            GreenTier::new(15, 30),
        ],
    };

    /// Set the base green time.
    pub fn with_base_secs(mut self, secs: u16) -> Self {
        self.base_secs = secs;
        self
    }

    /// Replace the extension tiers.
    pub fn with_tiers(mut self, tiers: [GreenTier; GREEN_TIERS]) -> Self {
        self.tiers = tiers;
        self
    }

    /// Returns true if thresholds strictly increase and extras never shrink.
    ///
    /// A table that fails this check still yields a duration for every
    /// count, but some tiers would be unreachable.
    pub fn is_monotonic(&self) -> bool {
        self.tiers.windows(2).all(|pair| {
            pair[0].min_count < pair[1].min_count && pair[0].extra_secs <= pair[1].extra_secs
        })
    }
}

impl Default for TieredGreenTime {
    fn default() -> Self {
        Self::CANONICAL
    }
}

impl GreenTimePolicy for TieredGreenTime {
    fn base_secs(&self) -> u16 {
        self.base_secs
    }

    fn green_secs(&self, count: u16) -> u16 {
        let extra = self
            .tiers
            .iter()
            .rev()
            .find(|tier| count >= tier.min_count)
            .map_or(0, |tier| tier.extra_secs);
        self.base_secs.saturating_add(extra)
    }
}
