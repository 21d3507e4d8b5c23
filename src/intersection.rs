//! The intersection driver: buttons in, lamps and status text out.
//!
//! [`Intersection`] owns a [`PhaseController`], an [`InputSampler`], the
//! button inputs and the status display, and offers two ways to run them:
//!
//! - [`tick`](Intersection::tick): non-blocking, call every few
//!   milliseconds from a main loop or timer
//! - [`run_phase_blocking`](Intersection::run_phase_blocking): runs one
//!   phase to completion, sleeping in fixed steps and polling the buttons
//!   between steps
//!
//! Both produce the same phase sequence for the same inputs.
//!
//! # Example
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
//! assert_eq!(junction.display().line1(), "NS Green 10+0s");
//!
//! // Pedestrian presses during NS green...
//! junction.buttons_mut().press(Button::PedRequest);
//! junction.tick(20).unwrap();
//! assert_eq!(junction.display().line2(), "Stored.");
//!
//! // ...and crosses after NS yellow.
//! let mut now = 20;
//! while junction.controller().phase() != Phase::PedestrianWalk {
//!     now += 20;
//!     junction.tick(now).unwrap();
//! }
//! assert_eq!(now, 13_000);
//! ```

use embedded_hal::delay::DelayNs;

use crate::config::{Config, ShortString};
use crate::controller::{ControllerSnapshot, PhaseController};
use crate::input::{InputSampler, SampleReport};
use crate::phase::Phase;
use crate::render::{event_message, status_lines, StatusText};
use crate::shared::PendingPresses;
use crate::traits::{
    ButtonInputs, Clock, GreenTimePolicy, SignalOutputs, StatusDisplay, TieredGreenTime,
};

/// What one [`Intersection::tick`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Phase entered during this tick, if the previous one ran out.
    pub entered: Option<Phase>,
    /// Button edges accepted during this tick.
    pub events: SampleReport,
}

/// A complete junction: controller, sampler, buttons and display.
pub struct Intersection<S, B, D, P = TieredGreenTime>
where
    S: SignalOutputs,
    B: ButtonInputs,
    D: StatusDisplay,
    P: GreenTimePolicy,
{
    controller: PhaseController<S, P>,
    sampler: InputSampler,
    buttons: B,
    display: D,
    name: ShortString,
    step_ms: u32,
    last_shown: Option<(Phase, u16, bool)>,
}

impl<S, B, D> Intersection<S, B, D, TieredGreenTime>
where
    S: SignalOutputs,
    B: ButtonInputs,
    D: StatusDisplay,
{
    /// Build a junction from its hardware and configuration.
    pub fn new(signals: S, buttons: B, display: D, config: &Config) -> Self {
        let controller = PhaseController::new(signals, &config.timing);
        Self::with_controller(controller, buttons, display, config)
    }
}

impl<S, B, D, P> Intersection<S, B, D, P>
where
    S: SignalOutputs,
    B: ButtonInputs,
    D: StatusDisplay,
    P: GreenTimePolicy,
{
    /// Build a junction around an existing controller (for a custom
    /// green-time policy).
    pub fn with_controller(
        controller: PhaseController<S, P>,
        buttons: B,
        display: D,
        config: &Config,
    ) -> Self {
        Self {
            controller,
            sampler: InputSampler::new(&config.input),
            buttons,
            display,
            name: config.device.name.clone(),
            step_ms: config.timing.step_ms.max(1),
            last_shown: None,
        }
    }

    // ------------------------------------------------------------------------
    // Startup
    // ------------------------------------------------------------------------

    /// Initialize the display, show the boot splash and hold all red.
    pub fn power_on(&mut self) -> Result<(), S::Error> {
        if let Err(e) = self.display.init() {
            log::warn!("display init failed: {:?}", e);
        }
        let splash = StatusText::new(&self.name, "Starting...");
        self.show(&splash);
        self.controller.all_red()?;
        self.last_shown = None;
        Ok(())
    }

    /// Show the ready screen.
    ///
    /// It stays up until [`start`](Self::start); callers hold it for as
    /// long as they want it seen.
    pub fn show_ready(&mut self) {
        let ready = StatusText::new(&self.name, "Ready");
        self.show(&ready);
    }

    /// Enter North-South green at `now_ms` and show its countdown.
    pub fn start(&mut self, now_ms: u64) -> Result<(), S::Error> {
        self.controller.start(now_ms)?;
        self.last_shown = None;
        self.refresh(now_ms);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------------

    /// Poll the buttons, advance the controller and refresh the display.
    ///
    /// Never blocks. Accepted button edges are shown as feedback text until
    /// the countdown next changes.
    pub fn tick(&mut self, now_ms: u64) -> Result<TickOutcome, S::Error> {
        let levels = self.buttons.sample();
        let events = self
            .sampler
            .poll(levels, now_ms, self.controller.state_mut());
        self.show_feedback(&events);

        let entered = self.controller.advance(now_ms)?;
        self.refresh(now_ms);

        Ok(TickOutcome { entered, events })
    }

    /// Run the active phase to completion, sleeping `step_ms` between polls.
    ///
    /// Starts the cycle first if it is not running. Returns the phase that
    /// follows.
    pub fn run_phase_blocking<C, T>(&mut self, clock: &C, delay: &mut T) -> Result<Phase, S::Error>
    where
        C: Clock,
        T: DelayNs,
    {
        if !self.controller.is_running() {
            self.start(clock.now_ms())?;
        }
        loop {
            if let Some(next) = self.tick(clock.now_ms())?.entered {
                return Ok(next);
            }
            delay.delay_ms(self.step_ms);
        }
    }

    /// Apply presses captured by an interrupt handler.
    pub fn apply_pending(&mut self, pending: PendingPresses) -> SampleReport {
        if pending.is_empty() {
            return SampleReport::new();
        }
        let events = self
            .sampler
            .apply_pending(pending, self.controller.state_mut());
        self.show_feedback(&events);
        events
    }

    // ------------------------------------------------------------------------
    // Display
    // ------------------------------------------------------------------------

    fn show(&mut self, text: &StatusText) {
        if let Err(e) = self.display.render(text) {
            log::warn!("display update failed: {:?}", e);
        }
    }

    fn show_feedback(&mut self, events: &SampleReport) {
        for event in events {
            let text = event_message(event);
            self.show(&text);
        }
    }

    fn refresh(&mut self, now_ms: u64) {
        if !self.controller.is_running() {
            return;
        }
        let snapshot = self.controller.snapshot(now_ms);
        let key = (
            snapshot.state.phase,
            snapshot.remaining_secs,
            snapshot.clearing,
        );
        if self.last_shown != Some(key) {
            self.show(&status_lines(&snapshot));
            self.last_shown = Some(key);
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// The phase controller.
    pub fn controller(&self) -> &PhaseController<S, P> {
        &self.controller
    }

    /// Mutable phase controller.
    pub fn controller_mut(&mut self) -> &mut PhaseController<S, P> {
        &mut self.controller
    }

    /// Controller snapshot at `now_ms`.
    pub fn snapshot(&self, now_ms: u64) -> ControllerSnapshot {
        self.controller.snapshot(now_ms)
    }

    /// The button inputs.
    pub fn buttons_mut(&mut self) -> &mut B {
        &mut self.buttons
    }

    /// The status display.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Mutable status display.
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Poll step in milliseconds.
    pub fn step_ms(&self) -> u32 {
        self.step_ms
    }
}
