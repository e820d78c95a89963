// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clap::FromArgMatches;
use std::io::Write;

fn parse(args: &[&str]) -> DaemonCommand {
    let matches = crate::cli_command().try_get_matches_from(args).unwrap();
    match crate::Cli::from_arg_matches(&matches).unwrap().command {
        Some(crate::Commands::Daemon(args)) => args.command,
        _ => panic!("expected daemon command"),
    }
}

#[test]
fn start_foreground_flag() {
    assert!(matches!(
        parse(&["berth", "daemon", "start", "--foreground"]),
        DaemonCommand::Start { foreground: true }
    ));
}

#[test]
fn logs_defaults_to_fifty_lines() {
    assert!(matches!(
        parse(&["berth", "daemon", "logs"]),
        DaemonCommand::Logs {
            limit: 50,
            no_limit: false
        }
    ));
}

#[test]
fn daemon_requires_a_subcommand() {
    assert!(crate::cli_command()
        .try_get_matches_from(["berth", "daemon"])
        .is_err());
}

#[test]
fn last_lines_are_kept() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "one\ntwo\nthree").unwrap();

    assert_eq!(
        read_last_lines(file.path(), Some(2)).unwrap(),
        vec!["two", "three"]
    );
    assert_eq!(read_last_lines(file.path(), None).unwrap().len(), 3);
    assert_eq!(read_last_lines(file.path(), Some(10)).unwrap().len(), 3);
}
