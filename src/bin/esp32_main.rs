//! ESP32 traffic intersection controller.
//!
//! This is the main entry point for the physical junction. It runs a 50Hz
//! control loop that:
//! - Samples the NS-count, EW-count and pedestrian buttons
//! - Advances the signal phase when its time is up
//! - Drives the eight signal lamps on phase changes
//! - Renders the countdown to the OLED display (if enabled)
//!
//! # Hardware Setup
//!
//! See [`crossing_ctl::hal::esp32::pins`] for the wiring.
//!
//! # Build
//!
//! ```bash
//! # Lamps and buttons only
//! cargo build --release --features esp32 --bin esp32_main
//!
//! # With OLED display
//! cargo build --release --features display --bin esp32_main
//! ```

use std::thread;
use std::time::Duration;

use esp_idf_hal::gpio::{PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::log::EspLogger;

use crossing_ctl::hal::esp32::Esp32Clock;
use crossing_ctl::hal::{GpioButtons, GpioSignals};
use crossing_ctl::traits::{ButtonInputs, Clock, SignalOutputs, StatusDisplay};
use crossing_ctl::{Config, Intersection};

/// Time the boot splash stays up before the cycle starts.
const SPLASH_MS: u64 = 1000;

/// Time the ready screen stays up.
const READY_MS: u64 = 1000;

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    EspLogger::initialize_default();

    println!();
    println!("================================");
    println!("  crossing-ctl Junction Controller");
    println!("================================");
    println!();

    // =========================================================================
    // Configuration
    // =========================================================================
    let config = Config::default();
    config.validate()?;

    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    // =========================================================================
    // Signal Lamps (NS 2/4/5, EW 18/19/21, Ped 22/23)
    // =========================================================================
    let signals = GpioSignals::new([
        PinDriver::output(pins.gpio2.downgrade_output())?,
        PinDriver::output(pins.gpio4.downgrade_output())?,
        PinDriver::output(pins.gpio5.downgrade_output())?,
        PinDriver::output(pins.gpio18.downgrade_output())?,
        PinDriver::output(pins.gpio19.downgrade_output())?,
        PinDriver::output(pins.gpio21.downgrade_output())?,
        PinDriver::output(pins.gpio22.downgrade_output())?,
        PinDriver::output(pins.gpio23.downgrade_output())?,
    ]);
    println!("[OK] Signals initialized (GPIO2/4/5, 18/19/21, 22/23)");

    // =========================================================================
    // Buttons (GPIO12/13/14, pull-up, active low)
    // =========================================================================
    let mut inputs = [
        PinDriver::input(pins.gpio12.downgrade())?,
        PinDriver::input(pins.gpio13.downgrade())?,
        PinDriver::input(pins.gpio14.downgrade())?,
    ];
    for input in inputs.iter_mut() {
        input.set_pull(Pull::Up)?;
    }
    let buttons = GpioButtons::new(inputs, config.input.active_low);
    println!("[OK] Buttons initialized (GPIO12/13/14)");

    // =========================================================================
    // Display (SSD1306 on GPIO32/33) - Optional
    // =========================================================================
    #[cfg(feature = "display")]
    let display = {
        use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
        use esp_idf_hal::prelude::*;
        use crossing_ctl::hal::esp32::Esp32Display;

        let i2c = I2cDriver::new(
            peripherals.i2c0,
            pins.gpio32, // SDA
            pins.gpio33, // SCL
            &I2cConfig::new().baudrate(400.kHz().into()),
        )?;
        println!("[OK] Display initialized (GPIO32/33 I2C)");
        Esp32Display::new(i2c)
    };

    #[cfg(not(feature = "display"))]
    let display = crossing_ctl::traits::NoDisplay;

    let junction = Intersection::new(signals, buttons, display, &config);
    run(junction, &config)
}

/// Boot sequence followed by the tick loop. Never returns unless a lamp
/// write fails.
fn run<S, B, D>(mut junction: Intersection<S, B, D>, config: &Config) -> anyhow::Result<()>
where
    S: SignalOutputs,
    S::Error: std::error::Error + Send + Sync + 'static,
    B: ButtonInputs,
    D: StatusDisplay,
{
    let clock = Esp32Clock::new();

    junction.power_on()?;
    println!("[OK] All red");
    thread::sleep(Duration::from_millis(SPLASH_MS));
    junction.show_ready();
    thread::sleep(Duration::from_millis(READY_MS));

    junction.start(clock.now_ms())?;
    println!();
    println!(
        "Running: green {}s + count bonus, yellow {}s, walk {}s",
        config.timing.green.base_secs, config.timing.yellow_secs, config.timing.pedestrian_secs
    );
    println!();

    let step = Duration::from_millis(u64::from(junction.step_ms()));
    loop {
        let now = clock.now_ms();
        let outcome = junction.tick(now)?;

        if let Some(phase) = outcome.entered {
            let snapshot = junction.snapshot(now);
            println!(
                "[{:>8}ms] {} {}s  NS={} EW={} ped={}",
                now,
                phase,
                snapshot.duration_secs,
                snapshot.state.ns_count,
                snapshot.state.ew_count,
                snapshot.state.ped_requested
            );
        }

        thread::sleep(step);
    }
}
