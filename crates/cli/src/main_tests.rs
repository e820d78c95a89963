// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::anyhow;
use berth_core::IsolationMode;
use clap::error::ErrorKind;
use clap::FromArgMatches;

use super::*;
use crate::commands::view::ViewCommand;
use crate::commands::workspace::WorkspaceCommand;

fn parse(args: &[&str]) -> Cli {
    let matches = cli_command().try_get_matches_from(args).unwrap();
    Cli::from_arg_matches(&matches).unwrap()
}

#[test]
fn cli_definition_is_consistent() {
    cli_command().debug_assert();
}

#[test]
fn version_flag() {
    let err = cli_command()
        .try_get_matches_from(["berth", "--version"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayVersion);
}

#[test]
fn no_subcommand_parses() {
    let cli = parse(&["berth"]);
    assert!(cli.command.is_none());
    assert!(!cli.json);
}

#[test]
fn json_flag_is_global() {
    let cli = parse(&["berth", "workspace", "list", "--json"]);
    assert!(cli.json);
    assert_eq!(OutputFormat::from_json_flag(cli.json), OutputFormat::Json);
}

#[test]
fn workspace_create_collects_options() {
    let cli = parse(&[
        "berth",
        "workspace",
        "create",
        "Side Project",
        "--isolation",
        "isolated",
        "--member",
        "alice",
        "--member",
        "bob",
    ]);
    let Some(Commands::Workspace(args)) = cli.command else {
        panic!("expected workspace command");
    };
    match args.command {
        WorkspaceCommand::Create {
            name,
            isolation,
            members,
            abbreviation,
            ..
        } => {
            assert_eq!(name, "Side Project");
            assert_eq!(isolation, Some(IsolationMode::Isolated));
            assert_eq!(members, vec!["alice", "bob"]);
            assert_eq!(abbreviation, None);
        }
        _ => panic!("expected create"),
    }
}

#[test]
fn unknown_isolation_mode_is_rejected() {
    let err = cli_command()
        .try_get_matches_from(["berth", "workspace", "create", "X", "--isolation", "sandboxed"])
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
}

#[test]
fn view_pin_and_unpin() {
    let cli = parse(&["berth", "view", "pin", "ws-1", "svc-1", "--unpin"]);
    let Some(Commands::View(args)) = cli.command else {
        panic!("expected view command");
    };
    assert!(matches!(args.command, ViewCommand::Pin { unpin: true, .. }));
}

#[test]
fn service_enable_conflicts_with_disable() {
    let err = cli_command()
        .try_get_matches_from([
            "berth", "service", "update", "ws-1", "svc-1", "--enable", "--disable",
        ])
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
}

#[yare::parameterized(
    workspace_list = { &["berth", "workspace", "list"], true },
    workspace_show = { &["berth", "workspace", "show", "ws-1"], true },
    workspace_switch = { &["berth", "workspace", "switch", "ws-1"], false },
    service_add = { &["berth", "service", "add", "ws-1", "Mail", "https://mail.example.com"], false },
    view_list = { &["berth", "view", "list"], true },
    view_load = { &["berth", "view", "load", "ws-1", "svc-1"], false },
    partition_list = { &["berth", "partition", "list"], true },
    partition_clear = { &["berth", "partition", "clear", "ws-1"], false },
    window_list = { &["berth", "window", "list"], true },
    settings_show = { &["berth", "settings", "show"], true },
    settings_set = { &["berth", "settings", "set", "--auto-switch", "true"], false },
    events = { &["berth", "events"], true },
)]
fn query_commands_do_not_start_daemon(args: &[&str], is_query: bool) {
    let command = parse(args).command.unwrap();
    assert_eq!(command.is_query(), is_query);
}

#[test]
fn redundant_error_chain_is_collapsed() {
    let err = anyhow!("disk full").context("Failed to save: disk full");
    assert_eq!(format_error(&err), "Failed to save: disk full");
}

#[test]
fn distinct_error_chain_is_rendered() {
    let err = anyhow!("disk full").context("Failed to save");
    assert_eq!(
        format_error(&err),
        "Failed to save\n\nCaused by:\n    0: disk full"
    );
}
