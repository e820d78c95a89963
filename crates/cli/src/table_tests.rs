// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn render(table: &Table) -> Vec<String> {
    let mut buf = Vec::new();
    table.render(&mut buf);
    String::from_utf8(buf)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn empty_table_prints_nothing() {
    let table = Table::with_color(vec![Column::left("NAME")], false);
    assert!(render(&table).is_empty());
}

#[test]
fn columns_fit_widest_cell_and_last_is_unpadded() {
    let mut table = Table::with_color(vec![Column::left("ID"), Column::left("NAME")], false);
    table.row(vec!["ws-1".into(), "Personal".into()]);
    table.row(vec!["workspace-2".into(), "Work".into()]);

    assert_eq!(
        render(&table),
        vec![
            "ID           NAME",
            "ws-1         Personal",
            "workspace-2  Work",
        ]
    );
}

#[test]
fn right_aligned_numbers() {
    let mut table = Table::with_color(
        vec![Column::left("KEY"), Column::right("BYTES"), Column::left("LABEL")],
        false,
    );
    table.row(vec!["a".into(), "5".into(), "x".into()]);
    table.row(vec!["b".into(), "1024".into(), "y".into()]);

    assert_eq!(
        render(&table),
        vec!["KEY  BYTES  LABEL", "a        5  x", "b     1024  y"]
    );
}

#[test]
fn max_width_cuts_by_character() {
    let mut table = Table::with_color(vec![Column::left("NAME").with_max(3), Column::left("X")], false);
    table.row(vec!["Ünïcode".into(), "1".into()]);

    assert_eq!(render(&table)[1], "Ünï   1");
}

#[test]
fn color_applies_after_padding() {
    let mut table = Table::with_color(vec![Column::status("STATE"), Column::muted("ID")], true);
    table.row(vec!["active".into(), "ws-1".into()]);

    let lines = render(&table);
    assert!(lines[1].starts_with("\x1b[32mactive\x1b[0m"));
    assert!(lines[1].contains("\x1b[38;5;240mws-1\x1b[0m"));
}

#[test]
fn no_escapes_without_color() {
    let mut table = Table::with_color(vec![Column::status("STATE")], false);
    table.row(vec!["active".into()]);
    assert!(!render(&table).concat().contains('\x1b'));
}
