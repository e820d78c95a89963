// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::borrow::Borrow;
use std::collections::BTreeMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId;
}

#[test]
fn define_id_display_and_conversions() {
    let id: TestId = "borrowed".into();
    assert_eq!(id.as_str(), "borrowed");
    assert_eq!(id.to_string(), "borrowed");

    let owned: TestId = String::from("owned").into();
    assert_eq!(owned, "owned");
    assert_eq!(owned, *"owned");
}

#[test]
fn define_id_serializes_as_plain_string() {
    let id = TestId::new("ws-1");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"ws-1\"");
    let back: TestId = serde_json::from_str("\"ws-1\"").unwrap();
    assert_eq!(back, id);
}

#[test]
fn define_id_orders_lexically() {
    let mut map = BTreeMap::new();
    map.insert(TestId::new("b"), 2);
    map.insert(TestId::new("a"), 1);
    let keys: Vec<&str> = map.keys().map(|k| k.borrow()).collect();
    assert_eq!(keys, vec!["a", "b"]);
}

#[yare::parameterized(
    shorter = { "abc", 8, "abc" },
    exact = { "abcdefgh", 8, "abcdefgh" },
    truncated = { "0f3c9a1e-44aa", 8, "0f3c9a1e" },
    multibyte = { "ééééé", 2, "éé" },
)]
fn define_id_short(input: &str, n: usize, expected: &str) {
    assert_eq!(TestId::new(input).short(n), expected);
}

#[test]
fn sequential_id_gen_is_ordered_and_unique() {
    let ids = SequentialIdGen::new("svc");
    let a = ids.next();
    let b = ids.next();
    assert_eq!(a, "svc-0001");
    assert_eq!(b, "svc-0002");
    assert!(a < b);

    // Clones share the counter
    let clone = ids.clone();
    assert_eq!(clone.next(), "svc-0003");
}

#[test]
fn uuid_id_gen_produces_distinct_ids() {
    let ids = UuidIdGen;
    assert_ne!(ids.next(), ids.next());
}
