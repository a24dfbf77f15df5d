// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn bare_category_header_is_category_only() {
    let doc = parse("[app]\nActions = a\n").unwrap();
    let group = doc.get("app").unwrap();
    assert_eq!(group.get("Actions"), Some("a"));
}

#[test]
fn quoted_header_preserves_embedded_space() {
    let doc = parse("[\"app ping\"]\nActions = a\n").unwrap();
    assert!(doc.get("app ping").is_some());
}

#[test]
fn quoted_star_header_round_trips_literally() {
    let doc = parse("[\"app *\"]\nActions = a\n").unwrap();
    assert!(doc.get("app *").is_some());
}

#[test]
fn comments_and_blank_lines_are_skipped() {
    let doc = parse("# a comment\n\n[app]\n# another\nActions = a\n").unwrap();
    assert_eq!(doc.get("app").unwrap().get("Actions"), Some("a"));
}

#[test]
fn list_values_are_stored_raw_and_split_by_the_group() {
    let doc = parse("[app]\nActions = a;b;c\n").unwrap();
    assert_eq!(doc.get("app").unwrap().get_list("Actions"), vec!["a", "b", "c"]);
}

#[test]
fn multiple_groups_parse_in_order() {
    let doc = parse("[app]\nActions = a\n[other]\nActions = b\n").unwrap();
    let headers: Vec<&str> = doc.iter().map(|(h, _)| h).collect();
    assert_eq!(headers, vec!["app", "other"]);
}

#[test]
fn key_before_any_group_is_an_error() {
    assert_eq!(parse("Actions = a\n"), Err(ConfigError::KeyBeforeGroup { line: 1 }));
}

#[test]
fn entry_without_equals_is_an_error() {
    let err = parse("[app]\njust-text\n").unwrap_err();
    assert_eq!(err, ConfigError::MalformedEntry { line: 2, text: "just-text".to_string() });
}

#[test]
fn unterminated_quoted_header_is_an_error() {
    assert!(parse("[\"app ping]\nActions = a\n").is_err());
}

#[parameterized(
    bare = { "[app]", "app" },
    quoted_plain = { "[\"plain\"]", "plain" },
    quoted_with_space = { "[\"a b\"]", "a b" },
)]
fn header_variants_dequote_to_expected_text(line: &str, expected: &str) {
    let doc = parse(&format!("{line}\nX = 1\n")).unwrap();
    assert!(doc.get(expected).is_some());
}
