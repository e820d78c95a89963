// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_advances() {
    let clock = FakeClock::new();
    let start = clock.epoch_ms();
    clock.advance(Duration::from_millis(1500));
    assert_eq!(clock.epoch_ms(), start + 1500);
}

#[test]
fn fake_clock_clones_share_time() {
    let clock = FakeClock::new();
    let other = clock.clone();
    clock.advance(Duration::from_secs(1));
    assert_eq!(other.epoch_ms(), clock.epoch_ms());
}

#[test]
fn utc_now_matches_epoch_ms() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_000);
    assert_eq!(clock.utc_now().timestamp_millis(), 1_000);
    assert_eq!(clock.utc_now().to_rfc3339(), "1970-01-01T00:00:01+00:00");
}

#[test]
fn system_clock_is_after_2020() {
    assert!(SystemClock.epoch_ms() > 1_577_836_800_000);
}
