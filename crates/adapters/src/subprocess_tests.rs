// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio::process::Command;
use yare::parameterized;

#[tokio::test]
async fn terminate_kills_running_child() {
    let child = Command::new("sleep").arg("10").spawn().unwrap();
    terminate(child, Duration::from_secs(5), "sleep").await.unwrap();
}

#[tokio::test]
async fn terminate_exited_child_is_ok() {
    let mut child = Command::new("true").spawn().unwrap();
    child.wait().await.unwrap();
    terminate(child, Duration::from_secs(5), "true").await.unwrap();
}

#[parameterized(
    typical = { "Name:\tchromium\nVmRSS:\t  204800 kB\nThreads:\t12\n", Some(204_800 * 1024) },
    missing = { "Name:\tzombie\nState:\tZ\n", None },
    garbled = { "VmRSS:\tlots kB\n", None },
)]
fn parses_vm_rss(status: &str, expected: Option<u64>) {
    assert_eq!(parse_vm_rss(status), expected);
}

#[cfg(target_os = "linux")]
#[test]
fn rss_of_self_is_nonzero() {
    assert!(rss_bytes(std::process::id()).unwrap() > 0);
}
