//! Property tests for the cycle, counters and press capture

use proptest::prelude::*;

use crossing_ctl::hal::{MockButtons, MockDisplay, MockSignals};
use crossing_ctl::shared::PressLatch;
use crossing_ctl::traits::{Button, ButtonLevels};
use crossing_ctl::{
    lamps_for, status_lines, Approach, Config, ControllerState, GreenTimePolicy, InputConfig,
    Intersection, LampVector, Phase, TieredGreenTime,
};

fn levels_from_mask(mask: u8) -> ButtonLevels {
    ButtonLevels {
        ns_count: mask & 0b001 != 0,
        ew_count: mask & 0b010 != 0,
        ped_request: mask & 0b100 != 0,
    }
}

proptest! {
    #[test]
    fn green_time_is_monotonic_and_bounded(a in any::<u16>(), b in any::<u16>()) {
        let policy = TieredGreenTime::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(policy.green_secs(lo) <= policy.green_secs(hi));
        prop_assert!([10, 20, 30, 40].contains(&policy.green_secs(a)));
    }

    #[test]
    fn counts_saturate_and_respect_clamp(
        start in any::<u16>(),
        presses in 0usize..64,
        max in proptest::option::of(1u16..100),
    ) {
        let mut state = ControllerState {
            phase: Phase::NsGreen,
            ew_count: start,
            ..ControllerState::new()
        };
        for _ in 0..presses {
            let count = state.add_count(Approach::EastWest, max);
            if let Some(max) = max {
                prop_assert!(count <= max.max(start));
            }
        }
        prop_assert!(state.ew_count >= start.min(max.unwrap_or(u16::MAX)));
    }

    #[test]
    fn repeated_requests_latch_once(requests in 1usize..20) {
        let mut state = ControllerState::new();
        let mut already = Vec::new();
        for _ in 0..requests {
            already.push(state.request_pedestrian());
        }
        prop_assert!(state.ped_requested);
        prop_assert!(!already[0]);
        prop_assert!(already[1..].iter().all(|&pending| pending));
    }

    #[test]
    fn latch_counts_only_accepted_presses(gaps in proptest::collection::vec(0u32..120, 1..40)) {
        let latch = PressLatch::new(50);
        let mut now = 0u32;
        let mut accepted = 0u16;
        for gap in gaps {
            now = now.wrapping_add(gap);
            if latch.record(Button::NsCount, now) {
                accepted += 1;
            }
        }
        let pending = latch.drain();
        prop_assert_eq!(pending.ns_count, accepted);
        prop_assert!(accepted >= 1);
        prop_assert!(latch.drain().is_empty());
    }

    #[test]
    fn random_inputs_never_break_the_cycle(
        steps in proptest::collection::vec((0u8..8, 1u64..1500), 1..400),
        clamp in proptest::option::of(1u16..30),
    ) {
        let config = Config::default().with_input(InputConfig::default().with_max_count(clamp));
        let mut junction = Intersection::new(
            MockSignals::new(),
            MockButtons::new(),
            MockDisplay::new(),
            &config,
        );
        junction.power_on().unwrap();
        junction.start(0).unwrap();

        let mut now = 0u64;
        let mut phase = Phase::NsGreen;
        for (mask, step) in steps {
            let requested = junction.controller().state().ped_requested;
            junction.buttons_mut().set(levels_from_mask(mask));
            now += step;
            let outcome = junction.tick(now).unwrap();

            if let Some(entered) = outcome.entered {
                prop_assert!(
                    entered == phase.successor(false) || entered == phase.successor(true),
                    "{:?} -> {:?}", phase, entered
                );
                if entered == Phase::PedestrianWalk {
                    prop_assert!(phase.is_yellow());
                    // A walk needs a request from before or during this tick.
                    prop_assert!(requested || mask & 0b100 != 0);
                }
                if phase == Phase::PedestrianWalk {
                    prop_assert!(!junction.controller().state().ped_requested);
                }
                phase = entered;
            }

            let snapshot = junction.snapshot(now);
            let controller = junction.controller();
            prop_assert_eq!(controller.phase(), phase);
            let expected = if snapshot.clearing {
                LampVector::all_red()
            } else {
                lamps_for(phase)
            };
            prop_assert_eq!(controller.signals().current(), expected);

            prop_assert!(snapshot.remaining_secs <= snapshot.duration_secs);
            if let Some(max) = clamp {
                prop_assert!(snapshot.state.ns_count <= max);
                prop_assert!(snapshot.state.ew_count <= max);
            }
            let text = status_lines(&snapshot);
            prop_assert!(text.line1.len() <= 16 && text.line2.len() <= 16);
        }

        let history = &junction.controller().signals().history;
        prop_assert!(history.iter().all(|lamps| lamps.is_safe()));
    }
}
