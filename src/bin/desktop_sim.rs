//! Desktop junction simulator.
//!
//! Runs the full controller against mock lamps, prints the status display
//! to the terminal and takes button presses from stdin:
//!
//! - `n` + Enter: car waiting on North-South
//! - `e` + Enter: car waiting on East-West
//! - `p` + Enter: pedestrian request
//! - `q` + Enter: quit
//!
//! ```bash
//! RUST_LOG=info cargo run --features sim --bin desktop_sim -- --speed 10
//! ```

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, Command};
use embedded_hal::delay::DelayNs;
use tokio::io::{AsyncBufReadExt, BufReader};

use crossing_ctl::hal::{ConsoleDisplay, MockButtons, MockSignals, StdClock, StdDelay};
use crossing_ctl::shared::PressLatch;
use crossing_ctl::traits::{Button, ButtonInputs, ButtonLevels, Clock};
use crossing_ctl::{Config, Intersection, Lamp, LampVector, Phase};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug shows every accepted press)
    env_logger::init();

    let matches = Command::new("desktop_sim")
        .about("Traffic intersection simulator")
        .arg(
            Arg::new("speed")
                .long("speed")
                .short('s')
                .help("Run this many times faster than real time")
                .value_parser(value_parser!(u32).range(1..=1000))
                .default_value("1"),
        )
        .arg(
            Arg::new("blocking")
                .long("blocking")
                .help("Use the blocking-wait scheduler instead of ticks")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let speed = matches.get_one::<u32>("speed").copied().unwrap_or(1);
    let blocking = matches.get_flag("blocking");

    let config = Config::default();
    config.validate()?;

    let clock = StdClock::with_speed(speed);
    let latch = Arc::new(PressLatch::new(config.input.debounce_ms));

    println!("crossing-ctl simulator (x{speed}{})", if blocking { ", blocking" } else { "" });
    println!("keys: n = NS car, e = EW car, p = pedestrian, q = quit");

    let keyboard = tokio::spawn(read_keys(Arc::clone(&latch), clock));

    if blocking {
        let buttons = KeyboardButtons::new(Arc::clone(&latch));
        let junction = Intersection::new(MockSignals::new(), buttons, ConsoleDisplay::new(), &config);
        let runner = tokio::task::spawn_blocking(move || run_blocking(junction, clock));
        tokio::select! {
            result = runner => result??,
            _ = keyboard => {}
        }
    } else {
        let junction = Intersection::new(
            MockSignals::new(),
            MockButtons::new(),
            ConsoleDisplay::new(),
            &config,
        );
        tokio::select! {
            result = run_ticks(junction, clock, latch, config.timing.step_ms) => result?,
            _ = keyboard => {}
        }
    }

    println!("bye");
    // stdin and a blocking worker may still be parked; don't wait for them
    std::process::exit(0)
}

// ============================================================================
// Schedulers
// ============================================================================

/// Time the ready screen stays up, in simulated milliseconds.
const READY_MS: u32 = 1000;

type TickJunction = Intersection<MockSignals, MockButtons, ConsoleDisplay>;
type BlockingJunction = Intersection<MockSignals, KeyboardButtons, ConsoleDisplay>;

/// Non-blocking style: drain captured presses and tick on an interval.
async fn run_ticks(
    mut junction: TickJunction,
    clock: StdClock,
    latch: Arc<PressLatch>,
    step_ms: u32,
) -> Result<()> {
    junction.power_on().map_err(lamp_error)?;
    junction.show_ready();
    tokio::time::sleep(Duration::from_millis(u64::from(READY_MS / clock.speed()))).await;
    junction.start(clock.now_ms()).map_err(lamp_error)?;
    print_lamps(Phase::NsGreen, &junction.controller().signals().current());

    let period = Duration::from_millis(u64::from((step_ms / clock.speed()).max(1)));
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        junction.apply_pending(latch.drain());
        let outcome = junction.tick(clock.now_ms()).map_err(lamp_error)?;
        if let Some(phase) = outcome.entered {
            print_lamps(phase, &junction.controller().signals().current());
        }
    }
}

/// Blocking style: run one phase at a time on a worker thread.
fn run_blocking(mut junction: BlockingJunction, clock: StdClock) -> Result<()> {
    let mut delay = StdDelay::matching(&clock);
    junction.power_on().map_err(lamp_error)?;
    junction.show_ready();
    delay.delay_ms(READY_MS);
    loop {
        let phase = junction
            .run_phase_blocking(&clock, &mut delay)
            .map_err(lamp_error)?;
        print_lamps(phase, &junction.controller().signals().current());
    }
}

fn lamp_error(_: ()) -> anyhow::Error {
    anyhow::anyhow!("lamp write failed")
}

// ============================================================================
// Keyboard
// ============================================================================

/// Reads key lines from stdin into the latch until `q` or end of input.
async fn read_keys(latch: Arc<PressLatch>, clock: StdClock) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let key = line.trim();
        if key == "q" {
            break;
        }
        match Button::from_text(key) {
            // wrapping truncation; the latch compares with wrapping_sub
            Some(button) => {
                if !latch.record(button, clock.now_ms() as u32) {
                    log::debug!("{} ignored (debounce)", button);
                }
            }
            None if key.is_empty() => {}
            None => println!("unknown key {key:?} (n, e, p or q)"),
        }
    }
}

/// Buttons fed from the keyboard latch for the blocking scheduler.
///
/// A drained press reads as held for one sample and released on the next,
/// so the sampler sees a clean edge.
struct KeyboardButtons {
    latch: Arc<PressLatch>,
    held: ButtonLevels,
}

impl KeyboardButtons {
    fn new(latch: Arc<PressLatch>) -> Self {
        Self {
            latch,
            held: ButtonLevels::default(),
        }
    }
}

impl ButtonInputs for KeyboardButtons {
    fn is_pressed(&mut self, button: Button) -> bool {
        self.held.is_pressed(button)
    }

    fn sample(&mut self) -> ButtonLevels {
        if self.held != ButtonLevels::default() {
            self.held = ButtonLevels::default();
        } else {
            let pending = self.latch.drain();
            for button in Button::ALL {
                self.held.set(button, pending.presses(button) > 0);
            }
        }
        self.held
    }
}

// ============================================================================
// Output
// ============================================================================

fn print_lamps(phase: Phase, lamps: &LampVector) {
    let head = |red: Lamp, yellow: Lamp, green: Lamp| {
        if lamps.is_on(green) {
            'G'
        } else if lamps.is_on(yellow) {
            'Y'
        } else if lamps.is_on(red) {
            'R'
        } else {
            '-'
        }
    };
    let mut row = String::new();
    let _ = write!(
        row,
        "NS:{} EW:{} PED:{}",
        head(Lamp::NsRed, Lamp::NsYellow, Lamp::NsGreen),
        head(Lamp::EwRed, Lamp::EwYellow, Lamp::EwGreen),
        if lamps.is_on(Lamp::PedGreen) { "WALK" } else { "WAIT" },
    );
    println!(">> {:<16} {}", phase, row);
}
