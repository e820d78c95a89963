// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use berth_core::IsolationMode;
use serial_test::serial;
use tempfile::tempdir;

fn clear_env() {
    for var in [
        "BERTH_RENDERER",
        "BERTH_MAX_ACTIVE_VIEWS",
        "BERTH_MEMORY_THRESHOLD_BYTES",
        "BERTH_EVICTION_SWEEP_MS",
        "BERTH_DEFAULT_ISOLATION",
    ] {
        std::env::remove_var(var);
    }
}

#[test]
fn config_paths_live_under_state_dir() {
    let config = Config::at(PathBuf::from("/tmp/berth-state"));
    assert_eq!(config.socket_path, PathBuf::from("/tmp/berth-state/daemon.sock"));
    assert_eq!(config.lock_path, PathBuf::from("/tmp/berth-state/daemon.pid"));
    assert_eq!(config.log_path, PathBuf::from("/tmp/berth-state/daemon.log"));
    assert_eq!(config.store_path, PathBuf::from("/tmp/berth-state/workspaces.json"));
    assert_eq!(config.partitions_path, PathBuf::from("/tmp/berth-state/partitions"));
}

#[test]
#[serial(env)]
fn manager_config_defaults_without_file() {
    clear_env();
    let dir = tempdir().unwrap();
    let config = Config::at(dir.path().to_path_buf());

    assert_eq!(config.manager_config().unwrap(), ManagerConfig::default());
}

#[test]
#[serial(env)]
fn env_overrides_win_over_config_file() {
    clear_env();
    let dir = tempdir().unwrap();
    let config = Config::at(dir.path().to_path_buf());
    std::fs::write(
        &config.config_path,
        "maxActiveViews = 3\ndefaultIsolationMode = \"isolated\"\n",
    )
    .unwrap();
    std::env::set_var("BERTH_MAX_ACTIVE_VIEWS", "9");

    let manager = config.manager_config().unwrap();
    clear_env();

    assert_eq!(manager.max_active_views, 9);
    assert_eq!(manager.default_isolation_mode, IsolationMode::Isolated);
}

#[test]
#[serial(env)]
fn bad_config_file_is_a_config_error() {
    clear_env();
    let dir = tempdir().unwrap();
    let config = Config::at(dir.path().to_path_buf());
    std::fs::write(&config.config_path, "evictionSweepIntervalMs = 0\n").unwrap();

    assert!(matches!(
        config.manager_config(),
        Err(StartupError::Config(_))
    ));
}

#[tokio::test]
#[serial(env)]
async fn startup_binds_socket_and_saves_fresh_graph() {
    clear_env();
    let dir = tempdir().unwrap();
    let config = Config::at(dir.path().join("state"));

    let StartupResult { mut daemon, listener } = startup(&config).await.unwrap();

    assert!(config.socket_path.exists());
    assert!(config.store_path.exists());
    let pid = std::fs::read_to_string(&config.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());
    assert_eq!(daemon.manager.list_workspaces().len(), 1);

    drop(listener);
    daemon.shutdown().await;
    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
}

#[tokio::test]
#[serial(env)]
async fn second_startup_fails_on_lock_and_leaves_files() {
    clear_env();
    let dir = tempdir().unwrap();
    let config = Config::at(dir.path().to_path_buf());

    let StartupResult { mut daemon, listener } = startup(&config).await.unwrap();

    let err = startup(&config).await.err().unwrap();
    assert!(matches!(err, StartupError::LockFailed(_)));
    assert!(config.socket_path.exists());
    let pid = std::fs::read_to_string(&config.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());

    drop(listener);
    daemon.shutdown().await;
}

#[tokio::test]
#[serial(env)]
async fn failed_startup_cleans_up_its_files() {
    clear_env();
    let dir = tempdir().unwrap();
    let config = Config::at(dir.path().to_path_buf());
    std::env::set_var("BERTH_EVICTION_SWEEP_MS", "soon");

    let result = startup(&config).await;
    clear_env();

    assert!(matches!(result, Err(StartupError::InvalidEnv { .. })));
    assert!(!config.lock_path.exists());
    assert!(!config.socket_path.exists());
}

#[tokio::test]
#[serial(env)]
async fn restart_reloads_saved_workspaces() {
    clear_env();
    let dir = tempdir().unwrap();
    let config = Config::at(dir.path().to_path_buf());

    let StartupResult { mut daemon, listener } = startup(&config).await.unwrap();
    daemon
        .manager
        .create_workspace(berth_core::WorkspaceSpec::named("Work"))
        .await
        .unwrap();
    drop(listener);
    daemon.shutdown().await;
    drop(daemon);

    let StartupResult { mut daemon, listener } = startup(&config).await.unwrap();
    let names: Vec<String> = daemon
        .manager
        .list_workspaces()
        .into_iter()
        .map(|w| w.name)
        .collect();
    assert!(names.contains(&"Work".to_string()));

    drop(listener);
    daemon.shutdown().await;
}
