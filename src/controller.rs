//! Phase controller: the signal state machine.
//!
//! This module provides [`PhaseController`], which owns the
//! [`ControllerState`], sizes each phase on entry and moves through the
//! cycle as time passes.
//!
//! # Overview
//!
//! The controller:
//! - Drives the lamps on phase entry, and once more for the walk clearance
//! - Computes a green's length from its approach's count at entry
//! - Clears an approach's count when its green completes
//! - Diverts into the pedestrian walk after a yellow when requested
//! - Ends the walk with a short all-red clearance, then clears the latch
//! - Provides state snapshots for the display and diagnostics
//!
//! # Example
//!
//! ```rust
//! use crossing_ctl::{PhaseController, Phase, config::TimingConfig, hal::MockSignals};
//!
//! let mut controller = PhaseController::new(MockSignals::new(), &TimingConfig::default());
//! controller.all_red().unwrap();
//! controller.start(0).unwrap();
//! assert_eq!(controller.phase(), Phase::NsGreen);
//!
//! // Main loop - call advance() every tick (e.g., 20ms)
//! let mut now = 0;
//! while controller.advance(now).unwrap().is_none() {
//!     now += 20;
//! }
//! assert_eq!(controller.phase(), Phase::NsYellow);
//! assert_eq!(now, 10_000);
//! ```

use crate::config::TimingConfig;
use crate::phase::{Approach, Phase};
use crate::render::{lamps_for, LampVector};
use crate::traits::{GreenTimePolicy, SignalOutputs, TieredGreenTime};

// ============================================================================
// Controller State
// ============================================================================

/// Everything the cycle depends on: the phase, both counters and the
/// pedestrian latch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerState {
    /// Active phase.
    pub phase: Phase,
    /// Cars counted waiting on North-South.
    pub ns_count: u16,
    /// Cars counted waiting on East-West.
    pub ew_count: u16,
    /// A pedestrian walk is pending.
    pub ped_requested: bool,
}

impl ControllerState {
    /// Initial state: NS green next, no traffic, no request.
    pub const fn new() -> Self {
        Self {
            phase: Phase::NsGreen,
            ns_count: 0,
            ew_count: 0,
            ped_requested: false,
        }
    }

    /// The counter owned by `approach`.
    pub const fn count(&self, approach: Approach) -> u16 {
        match approach {
            Approach::NorthSouth => self.ns_count,
            Approach::EastWest => self.ew_count,
        }
    }

    fn count_mut(&mut self, approach: Approach) -> &mut u16 {
        match approach {
            Approach::NorthSouth => &mut self.ns_count,
            Approach::EastWest => &mut self.ew_count,
        }
    }

    /// Adds one car to `approach`, never exceeding `max` (or `u16::MAX`).
    ///
    /// Returns the new count.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossing_ctl::{Approach, ControllerState};
    ///
    /// let mut state = ControllerState::new();
    /// assert_eq!(state.add_count(Approach::EastWest, Some(2)), 1);
    /// assert_eq!(state.add_count(Approach::EastWest, Some(2)), 2);
    /// assert_eq!(state.add_count(Approach::EastWest, Some(2)), 2);
    /// ```
    pub fn add_count(&mut self, approach: Approach, max: Option<u16>) -> u16 {
        let limit = max.unwrap_or(u16::MAX);
        let count = self.count_mut(approach);
        *count = count.saturating_add(1).min(limit);
        *count
    }

    /// Zeroes the counter owned by `approach`.
    pub fn reset_count(&mut self, approach: Approach) {
        *self.count_mut(approach) = 0;
    }

    /// Returns true if `approach` shows red in the current phase.
    pub const fn is_red(&self, approach: Approach) -> bool {
        approach.is_red_during(self.phase)
    }

    /// Latches a pedestrian request.
    ///
    /// Returns true if a request was already pending.
    pub fn request_pedestrian(&mut self) -> bool {
        core::mem::replace(&mut self.ped_requested, true)
    }
}

// ============================================================================
// Phase Controller
// ============================================================================

#[derive(Clone, Copy, Debug)]
struct ActivePhase {
    started_ms: u64,
    duration_secs: u16,
    /// Set once the walk has run out and the all-red hold began.
    clearing_since: Option<u64>,
}

impl ActivePhase {
    fn duration_ms(&self) -> u64 {
        u64::from(self.duration_secs) * 1000
    }

    fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_ms)
    }
}

/// The signal state machine.
///
/// Until [`start`](Self::start) the controller is idle and the lamps are
/// whatever [`all_red`](Self::all_red) left them at.
///
/// # Type Parameters
///
/// - `S`: The lamp outputs ([`SignalOutputs`] trait)
/// - `P`: Green-time policy, [`TieredGreenTime`] unless replaced
pub struct PhaseController<S: SignalOutputs, P: GreenTimePolicy = TieredGreenTime> {
    signals: S,
    policy: P,
    yellow_secs: u16,
    pedestrian_secs: u16,
    clearance_ms: u32,
    state: ControllerState,
    active: Option<ActivePhase>,
}

impl<S: SignalOutputs> PhaseController<S, TieredGreenTime> {
    /// Create a controller using the green table from `timing`.
    pub fn new(signals: S, timing: &TimingConfig) -> Self {
        Self::with_policy(signals, timing.green, timing)
    }
}

impl<S: SignalOutputs, P: GreenTimePolicy> PhaseController<S, P> {
    /// Create a controller with a custom green-time policy.
    ///
    /// `timing.green` is ignored; yellow and pedestrian lengths still come
    /// from `timing`.
    pub fn with_policy(signals: S, policy: P, timing: &TimingConfig) -> Self {
        Self {
            signals,
            policy,
            yellow_secs: timing.yellow_secs,
            pedestrian_secs: timing.pedestrian_secs,
            clearance_ms: timing.clearance_ms,
            state: ControllerState::new(),
            active: None,
        }
    }

    /// Stop the cycle and show vehicles red, pedestrians red.
    pub fn all_red(&mut self) -> Result<(), S::Error> {
        self.active = None;
        self.signals.apply(&LampVector::all_red())?;
        log::info!("all red");
        Ok(())
    }

    /// Begin the cycle with North-South green.
    ///
    /// Returns the green's duration in seconds.
    pub fn start(&mut self, now_ms: u64) -> Result<u16, S::Error> {
        self.enter_phase(Phase::NsGreen, now_ms)
    }

    /// Seconds `phase` would last if entered now.
    pub fn phase_duration_secs(&self, phase: Phase) -> u16 {
        match phase.green_of() {
            Some(approach) => self.policy.green_secs(self.state.count(approach)),
            None if phase.is_yellow() => self.yellow_secs,
            None => self.pedestrian_secs,
        }
    }

    /// Make `phase` active from `now_ms` and drive its lamps.
    ///
    /// Returns the phase's duration in seconds.
    pub fn enter_phase(&mut self, phase: Phase, now_ms: u64) -> Result<u16, S::Error> {
        let duration_secs = self.phase_duration_secs(phase);
        self.signals.apply(&lamps_for(phase))?;

        self.state.phase = phase;
        self.active = Some(ActivePhase {
            started_ms: now_ms,
            duration_secs,
            clearing_since: None,
        });

        match phase.green_of() {
            Some(approach) => log::info!(
                "{} for {}s ({} waiting)",
                phase,
                duration_secs,
                self.state.count(approach)
            ),
            None => log::info!("{} for {}s", phase, duration_secs),
        }
        Ok(duration_secs)
    }

    /// Finish the active phase and enter its successor at `now_ms`.
    ///
    /// A completed green clears its approach's counter and a completed walk
    /// clears the pedestrian latch, so presses during the walk are dropped.
    /// Nothing changes if the successor's lamps cannot be driven. If the
    /// controller is idle this starts the cycle instead. Returns the
    /// entered phase.
    pub fn complete_phase(&mut self, now_ms: u64) -> Result<Phase, S::Error> {
        if self.active.is_none() {
            self.start(now_ms)?;
            return Ok(self.state.phase);
        }

        let current = self.state.phase;
        let next = current.successor(self.state.ped_requested);
        self.enter_phase(next, now_ms)?;

        if let Some(approach) = current.green_of() {
            self.state.reset_count(approach);
        }
        if current == Phase::PedestrianWalk {
            self.state.ped_requested = false;
        }
        Ok(next)
    }

    /// Complete the phase if its time is up.
    ///
    /// Never blocks. Returns the newly entered phase, or `None` while the
    /// active phase still has time left or the controller is idle. A clock
    /// reading earlier than the phase start counts as no time elapsed.
    ///
    /// When the walk runs out, every lamp goes red for the clearance time
    /// before North-South green is entered.
    pub fn advance(&mut self, now_ms: u64) -> Result<Option<Phase>, S::Error> {
        let Some(active) = self.active else {
            return Ok(None);
        };
        if active.elapsed_ms(now_ms) < active.duration_ms() {
            return Ok(None);
        }
        if self.state.phase == Phase::PedestrianWalk && self.clearance_ms > 0 {
            match active.clearing_since {
                None => {
                    self.begin_clearance(now_ms)?;
                    return Ok(None);
                }
                Some(since) if now_ms.saturating_sub(since) < u64::from(self.clearance_ms) => {
                    return Ok(None);
                }
                Some(_) => {}
            }
        }
        self.complete_phase(now_ms).map(Some)
    }

    fn begin_clearance(&mut self, now_ms: u64) -> Result<(), S::Error> {
        self.signals.apply(&LampVector::all_red())?;
        if let Some(active) = self.active.as_mut() {
            active.clearing_since = Some(now_ms);
        }
        log::info!("pedestrian clearance for {}ms", self.clearance_ms);
        Ok(())
    }

    /// Whole seconds left in the active phase, rounded up.
    pub fn remaining_secs(&self, now_ms: u64) -> u16 {
        let Some(active) = self.active else {
            return 0;
        };
        let left_ms = active
            .duration_ms()
            .saturating_sub(active.elapsed_ms(now_ms));
        u16::try_from(left_ms.div_ceil(1000)).unwrap_or(u16::MAX)
    }

    /// Full state snapshot for the display and diagnostics.
    pub fn snapshot(&self, now_ms: u64) -> ControllerSnapshot {
        ControllerSnapshot {
            state: self.state,
            running: self.active.is_some(),
            remaining_secs: self.remaining_secs(now_ms),
            duration_secs: self.active.map_or(0, |a| a.duration_secs),
            base_green_secs: self.policy.base_secs(),
            clearing: self.is_clearing(),
        }
    }

    /// Current state.
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Mutable state, for the input sampler.
    pub fn state_mut(&mut self) -> &mut ControllerState {
        &mut self.state
    }

    /// Active phase.
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Returns true once [`start`](Self::start) has run and
    /// [`all_red`](Self::all_red) has not stopped the cycle since.
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Returns true during the all-red hold that ends a walk.
    pub fn is_clearing(&self) -> bool {
        self.active.is_some_and(|a| a.clearing_since.is_some())
    }

    /// The lamp outputs.
    pub fn signals(&self) -> &S {
        &self.signals
    }

    /// The green-time policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Copyable controller snapshot.
///
/// Implements `serde::Serialize` when the `serde` feature is enabled.
///
/// # Example
///
/// ```rust
/// use crossing_ctl::{PhaseController, config::TimingConfig, hal::MockSignals};
///
/// let controller = PhaseController::new(MockSignals::new(), &TimingConfig::default());
///
/// let snapshot = controller.snapshot(0);
/// assert!(!snapshot.running);
/// assert_eq!(snapshot.remaining_secs, 0);
/// assert_eq!(snapshot.base_green_secs, 10);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerSnapshot {
    /// Phase, counters and latch.
    pub state: ControllerState,
    /// The cycle has started.
    pub running: bool,
    /// Whole seconds left in the active phase.
    pub remaining_secs: u16,
    /// Length of the active phase in seconds.
    pub duration_secs: u16,
    /// Green length with no extension.
    pub base_green_secs: u16,
    /// Vehicles and pedestrians are held red after the walk.
    pub clearing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockSignals;
    use crate::traits::Lamp;

    fn controller() -> PhaseController<MockSignals> {
        PhaseController::new(MockSignals::new(), &TimingConfig::default())
    }

    fn run_to_end(c: &mut PhaseController<MockSignals>, now: &mut u64) -> Phase {
        loop {
            *now += 20;
            if let Some(next) = c.advance(*now).unwrap() {
                return next;
            }
        }
    }

    // =========================================================================
    // State Tests
    // =========================================================================

    #[test]
    fn add_count_saturates() {
        let mut state = ControllerState::new();
        state.ns_count = u16::MAX;
        assert_eq!(state.add_count(Approach::NorthSouth, None), u16::MAX);
    }

    #[test]
    fn request_pedestrian_reports_previous() {
        let mut state = ControllerState::new();
        assert!(!state.request_pedestrian());
        assert!(state.request_pedestrian());
        assert!(state.ped_requested);
    }

    // =========================================================================
    // Controller Tests
    // =========================================================================

    #[test]
    fn new_controller_is_idle() {
        let mut c = controller();
        assert!(!c.is_running());
        assert_eq!(c.advance(1_000_000).unwrap(), None);
        assert_eq!(c.remaining_secs(0), 0);
    }

    #[test]
    fn all_red_drives_safe_state() {
        let mut c = controller();
        c.all_red().unwrap();
        assert_eq!(c.signals().current(), LampVector::all_red());
    }

    #[test]
    fn start_enters_ns_green() {
        let mut c = controller();
        assert_eq!(c.start(0).unwrap(), 10);
        assert_eq!(c.phase(), Phase::NsGreen);
        assert!(c.signals().is_on(Lamp::NsGreen));
        assert!(c.signals().is_on(Lamp::EwRed));
        assert!(c.signals().is_on(Lamp::PedRed));
    }

    #[test]
    fn green_duration_sampled_at_entry() {
        let mut c = controller();
        c.state_mut().ns_count = 6;
        assert_eq!(c.start(0).unwrap(), 20);

        // Later presses do not stretch the running green.
        c.state_mut().ns_count = 20;
        assert_eq!(c.snapshot(0).duration_secs, 20);
        assert_eq!(c.advance(19_999).unwrap(), None);
        assert_eq!(c.advance(20_000).unwrap(), Some(Phase::NsYellow));
    }

    #[test]
    fn green_completion_clears_own_counter_only() {
        let mut c = controller();
        c.state_mut().ns_count = 6;
        c.state_mut().ew_count = 4;
        c.start(0).unwrap();
        c.complete_phase(20_000).unwrap();
        assert_eq!(c.state().ns_count, 0);
        assert_eq!(c.state().ew_count, 4);
    }

    #[test]
    fn yellow_and_walk_lengths() {
        let c = controller();
        assert_eq!(c.phase_duration_secs(Phase::NsYellow), 3);
        assert_eq!(c.phase_duration_secs(Phase::EwYellow), 3);
        assert_eq!(c.phase_duration_secs(Phase::PedestrianWalk), 8);
    }

    #[test]
    fn full_cycle_without_requests() {
        let mut c = controller();
        let mut now = 0;
        c.start(now).unwrap();
        assert_eq!(run_to_end(&mut c, &mut now), Phase::NsYellow);
        assert_eq!(now, 10_000);
        assert_eq!(run_to_end(&mut c, &mut now), Phase::EwGreen);
        assert_eq!(now, 13_000);
        assert_eq!(run_to_end(&mut c, &mut now), Phase::EwYellow);
        assert_eq!(run_to_end(&mut c, &mut now), Phase::NsGreen);
        assert_eq!(now, 26_000);
    }

    #[test]
    fn walk_completion_clears_latch_and_drops_presses_during_walk() {
        let mut c = controller();
        c.start(0).unwrap();
        c.complete_phase(10_000).unwrap();
        c.state_mut().request_pedestrian();
        assert_eq!(c.complete_phase(13_000).unwrap(), Phase::PedestrianWalk);
        assert!(c.signals().is_on(Lamp::PedGreen));

        // Still latched while honored; another press changes nothing.
        assert!(c.state_mut().request_pedestrian());
        assert_eq!(c.complete_phase(21_000).unwrap(), Phase::NsGreen);
        assert!(!c.state().ped_requested);

        assert_eq!(c.complete_phase(31_000).unwrap(), Phase::NsYellow);
        assert_eq!(c.complete_phase(34_000).unwrap(), Phase::EwGreen);
    }

    #[test]
    fn walk_ends_with_all_red_clearance() {
        let mut c = controller();
        c.state_mut().ped_requested = true;
        c.start(0).unwrap();
        c.complete_phase(10_000).unwrap();
        assert_eq!(c.complete_phase(13_000).unwrap(), Phase::PedestrianWalk);

        assert_eq!(c.advance(20_999).unwrap(), None);
        assert!(!c.is_clearing());

        assert_eq!(c.advance(21_000).unwrap(), None);
        assert!(c.is_clearing());
        assert_eq!(c.phase(), Phase::PedestrianWalk);
        assert_eq!(c.signals().current(), LampVector::all_red());
        assert!(c.snapshot(21_000).clearing);
        assert!(c.state().ped_requested);

        // A clock step backwards does not cut the hold short.
        assert_eq!(c.advance(400).unwrap(), None);
        assert_eq!(c.advance(21_499).unwrap(), None);
        assert_eq!(c.advance(21_500).unwrap(), Some(Phase::NsGreen));
        assert!(!c.is_clearing());
        assert!(!c.state().ped_requested);
    }

    #[test]
    fn zero_clearance_goes_straight_to_green() {
        let timing = TimingConfig::default().with_clearance_ms(0);
        let mut c = PhaseController::new(MockSignals::new(), &timing);
        c.state_mut().ped_requested = true;
        c.start(0).unwrap();
        c.complete_phase(10_000).unwrap();
        c.complete_phase(13_000).unwrap();
        assert_eq!(c.advance(21_000).unwrap(), Some(Phase::NsGreen));
        assert!(!c.state().ped_requested);
    }

    #[test]
    fn remaining_rounds_up() {
        let mut c = controller();
        c.start(1_000).unwrap();
        assert_eq!(c.remaining_secs(1_000), 10);
        assert_eq!(c.remaining_secs(1_001), 10);
        assert_eq!(c.remaining_secs(1_999), 10);
        assert_eq!(c.remaining_secs(2_000), 9);
        assert_eq!(c.remaining_secs(10_999), 1);
        assert_eq!(c.remaining_secs(11_000), 0);
        assert_eq!(c.remaining_secs(50_000), 0);
    }

    #[test]
    fn clock_going_backwards_counts_as_no_elapsed_time() {
        let mut c = controller();
        c.start(5_000).unwrap();
        assert_eq!(c.advance(0).unwrap(), None);
        assert_eq!(c.remaining_secs(0), 10);
        assert_eq!(c.advance(15_000).unwrap(), Some(Phase::NsYellow));
    }

    #[test]
    fn lamp_failure_leaves_state_unchanged() {
        let mut c = controller();
        c.state_mut().ns_count = 6;
        c.start(0).unwrap();
        c.state_mut().ped_requested = true;
        c.signals_fail(true);
        assert!(c.complete_phase(20_000).is_err());
        assert_eq!(c.phase(), Phase::NsGreen);
        assert_eq!(c.state().ns_count, 6);
        assert!(c.state().ped_requested);

        // The completion is retried on the next advance.
        c.signals_fail(false);
        assert_eq!(c.advance(20_020).unwrap(), Some(Phase::NsYellow));
        assert_eq!(c.state().ns_count, 0);
    }

    #[test]
    fn lamp_failure_during_clearance_is_retried() {
        let mut c = controller();
        c.state_mut().ped_requested = true;
        c.start(0).unwrap();
        c.complete_phase(10_000).unwrap();
        c.complete_phase(13_000).unwrap();

        c.signals_fail(true);
        assert!(c.advance(21_000).is_err());
        assert!(!c.is_clearing());
        assert!(c.signals().is_on(Lamp::PedGreen));

        c.signals_fail(false);
        assert_eq!(c.advance(21_020).unwrap(), None);
        assert!(c.is_clearing());
    }

    #[test]
    fn complete_phase_while_idle_starts_cycle() {
        let mut c = controller();
        assert_eq!(c.complete_phase(0).unwrap(), Phase::NsGreen);
        assert!(c.is_running());
    }

    #[test]
    fn custom_policy() {
        struct Fixed;
        impl GreenTimePolicy for Fixed {
            fn base_secs(&self) -> u16 {
                5
            }
            fn green_secs(&self, _count: u16) -> u16 {
                7
            }
        }

        let mut c = PhaseController::with_policy(MockSignals::new(), Fixed, &TimingConfig::default());
        assert_eq!(c.start(0).unwrap(), 7);
        assert_eq!(c.snapshot(0).base_green_secs, 5);
    }

    impl PhaseController<MockSignals> {
        fn signals_fail(&mut self, fail: bool) {
            self.signals.set_fail(fail);
        }
    }
}
