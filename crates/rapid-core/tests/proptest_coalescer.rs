//! Property-based tests for the coalescing scheduler.
//!
//! 1. Throttle: at most one leading fire per window, and the last pushed
//!    value is always delivered eventually
//! 2. Debounce: never fires while pushes keep arriving inside the window
//! 3. Delivered values preserve push order

use std::time::Duration;

use proptest::prelude::*;
use rapid_core::Coalescer;
use web_time::Instant;

const WINDOW_MS: u64 = 200;

/// Gaps (ms) between successive pushes.
fn gaps() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..400, 1..80)
}

/// Drive pushes with polls in between; return (push index, fire time).
fn run(mut c: Coalescer<usize>, gaps: &[u64]) -> Vec<(usize, Instant)> {
    let t0 = Instant::now();
    let mut now = t0;
    let mut fired = Vec::new();
    for (i, gap) in gaps.iter().enumerate() {
        let target = now + Duration::from_millis(*gap);
        // poll every millisecond between pushes
        while now < target {
            now += Duration::from_millis(1);
            if let Some(v) = c.poll(now) {
                fired.push((v, now));
            }
        }
        if let Some(v) = c.push(i, now) {
            fired.push((v, now));
        }
    }
    let end = now + Duration::from_millis(WINDOW_MS * 2);
    while now < end {
        now += Duration::from_millis(1);
        if let Some(v) = c.poll(now) {
            fired.push((v, now));
        }
    }
    fired
}

proptest! {
    #[test]
    fn throttle_delivers_last_value(gaps in gaps()) {
        let last = gaps.len() - 1;
        let fired = run(Coalescer::throttle(Duration::from_millis(WINDOW_MS)), &gaps);
        prop_assert_eq!(fired.last().map(|(v, _)| *v), Some(last));
    }

    #[test]
    fn throttle_fires_are_spaced_by_window(gaps in gaps()) {
        let fired = run(Coalescer::throttle(Duration::from_millis(WINDOW_MS)), &gaps);
        for pair in fired.windows(2) {
            let spacing = pair[1].1 - pair[0].1;
            prop_assert!(spacing >= Duration::from_millis(WINDOW_MS) || pair[1].1 == pair[0].1,
                "fires {:?} too close", pair);
        }
    }

    #[test]
    fn delivered_values_keep_push_order(gaps in gaps()) {
        let fired = run(Coalescer::throttle(Duration::from_millis(WINDOW_MS)), &gaps);
        prop_assert!(fired.windows(2).all(|w| w[0].0 < w[1].0));
        let fired = run(Coalescer::debounce(Duration::from_millis(WINDOW_MS)), &gaps);
        prop_assert!(fired.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn debounce_waits_for_quiet(gaps in prop::collection::vec(0u64..WINDOW_MS, 1..40)) {
        // every gap is shorter than the window, so only the final push fires
        let fired = run(Coalescer::debounce(Duration::from_millis(WINDOW_MS)), &gaps);
        prop_assert_eq!(fired.len(), 1);
        prop_assert_eq!(fired[0].0, gaps.len() - 1);
    }
}
