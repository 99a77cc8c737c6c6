#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::{Duration, Instant};

use issuewatch_core::Schedule;
use proptest::prelude::*;

proptest! {
    #[test]
    fn next_fire_stays_on_the_start_grid(
        interval_ms in 1u64..10_000,
        runtimes in proptest::collection::vec(0u64..50_000, 1..40),
    ) {
        let interval = Duration::from_millis(interval_ms);
        let t0 = Instant::now();
        let mut schedule = Schedule::new(interval, t0).unwrap();

        for run_ms in runtimes {
            let fired = schedule.next_fire();
            let finished = fired + Duration::from_millis(run_ms);
            let adv = schedule.advance(finished);

            let offset = adv.next_fire.duration_since(t0).as_nanos();
            prop_assert_eq!(offset % interval.as_nanos(), 0);
            prop_assert!(adv.next_fire > finished);
            // at most one boundary in the future: no catch-up burst
            prop_assert!(adv.next_fire - finished <= interval);
        }
    }
}
