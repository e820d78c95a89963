// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn write_atomic_leaves_no_tmp() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested/workspaces.json");

    write_atomic(&path, b"{\"v\":2}").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "{\"v\":2}");
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn write_atomic_replaces_existing_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("workspaces.json");

    write_atomic(&path, b"first, and longer").unwrap();
    write_atomic(&path, b"second").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "second");
}

#[cfg(unix)]
#[test]
fn write_atomic_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let path = dir.path().join("workspaces.json");
    write_atomic(&path, b"{}").unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn quarantine_moves_file_to_bak() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("workspaces.json");
    fs::write(&path, b"garbage").unwrap();

    let bak = quarantine(&path).unwrap();

    assert!(!path.exists());
    assert_eq!(bak, path.with_extension("bak"));
    assert_eq!(fs::read(&bak).unwrap(), b"garbage");
}

#[test]
fn bak_rotation_keeps_three() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("workspaces.json");

    for n in 1..=4 {
        fs::write(&path, format!("corrupt-{n}")).unwrap();
        quarantine(&path).unwrap();
    }

    let read = |ext: &str| fs::read_to_string(path.with_extension(ext)).unwrap();
    assert_eq!(read("bak"), "corrupt-4");
    assert_eq!(read("bak.2"), "corrupt-3");
    assert_eq!(read("bak.3"), "corrupt-2");
    assert!(!path.with_extension("bak.4").exists());
}
