// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Duration;
use yare::parameterized;

#[parameterized(
    seconds = { 42, "42s" },
    minutes = { 150, "2m" },
    hours = { 7300, "2h" },
    days = { 200_000, "2d" },
)]
fn time_ago_buckets(elapsed: i64, expected: &str) {
    let now = Utc::now();
    assert_eq!(format_time_ago(now - Duration::seconds(elapsed), now), expected);
}

#[test]
fn future_timestamps_read_as_now() {
    let now = Utc::now();
    assert_eq!(format_time_ago(now + Duration::seconds(30), now), "0s");
}

#[parameterized(
    bytes = { 512, "512 B" },
    kib = { 2048, "2.0 KiB" },
    mib = { 80 * 1024 * 1024, "80.0 MiB" },
    gib = { 1536 * 1024 * 1024, "1.5 GiB" },
)]
fn bytes_use_binary_units(bytes: u64, expected: &str) {
    assert_eq!(format_bytes(bytes), expected);
}

#[parameterized(
    secs = { 5, "5s" },
    mins = { 65, "1m 5s" },
    hours = { 3725, "1h 2m 5s" },
)]
fn uptime(secs: u64, expected: &str) {
    assert_eq!(format_uptime(secs), expected);
}

#[test]
fn json_flag_selects_format() {
    assert_eq!(OutputFormat::from_json_flag(true), OutputFormat::Json);
    assert_eq!(OutputFormat::from_json_flag(false), OutputFormat::Text);
}
