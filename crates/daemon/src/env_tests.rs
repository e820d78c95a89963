// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

const OVERRIDES: [&str; 4] = [
    "BERTH_MAX_ACTIVE_VIEWS",
    "BERTH_MEMORY_THRESHOLD_BYTES",
    "BERTH_EVICTION_SWEEP_MS",
    "BERTH_DEFAULT_ISOLATION",
];

fn clear_overrides() {
    for var in OVERRIDES {
        std::env::remove_var(var);
    }
}

#[test]
#[serial(env)]
fn state_dir_precedence() {
    std::env::set_var("BERTH_STATE_DIR", "/tmp/berth-explicit");
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/berth-explicit"));

    std::env::remove_var("BERTH_STATE_DIR");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/xdg/berth"));

    std::env::remove_var("XDG_STATE_HOME");
    let home = std::env::var("HOME").unwrap();
    assert_eq!(
        state_dir().unwrap(),
        PathBuf::from(home).join(".local/state/berth")
    );
}

#[test]
#[serial(env)]
fn no_overrides_keeps_config() {
    clear_overrides();
    let mut config = ManagerConfig::default();
    apply_overrides(&mut config).unwrap();
    assert_eq!(config, ManagerConfig::default());
}

#[test]
#[serial(env)]
fn overrides_replace_file_values() {
    clear_overrides();
    std::env::set_var("BERTH_MAX_ACTIVE_VIEWS", "2");
    std::env::set_var("BERTH_MEMORY_THRESHOLD_BYTES", " 1048576 ");
    std::env::set_var("BERTH_EVICTION_SWEEP_MS", "500");
    std::env::set_var("BERTH_DEFAULT_ISOLATION", "Isolated");

    let mut config = ManagerConfig::default();
    apply_overrides(&mut config).unwrap();
    clear_overrides();

    assert_eq!(
        config,
        ManagerConfig {
            max_active_views: 2,
            memory_threshold_bytes: 1_048_576,
            eviction_sweep_interval_ms: 500,
            default_isolation_mode: IsolationMode::Isolated,
        }
    );
}

#[test]
#[serial(env)]
fn invalid_override_names_the_variable() {
    clear_overrides();
    std::env::set_var("BERTH_MAX_ACTIVE_VIEWS", "lots");

    let err = apply_overrides(&mut ManagerConfig::default()).unwrap_err();
    clear_overrides();

    assert!(matches!(
        err,
        StartupError::InvalidEnv { var: "BERTH_MAX_ACTIVE_VIEWS", .. }
    ));
}

#[test]
#[serial(env)]
fn unknown_isolation_mode_is_rejected() {
    clear_overrides();
    std::env::set_var("BERTH_DEFAULT_ISOLATION", "sandboxed");

    let err = apply_overrides(&mut ManagerConfig::default()).unwrap_err();
    clear_overrides();

    assert!(matches!(err, StartupError::InvalidEnv { .. }));
}
