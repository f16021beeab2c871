//! Tests for statement splitting.

use super::split_statements;

#[test]
fn splits_on_delimiter() {
    let statements = split_statements(
        "CREATE TABLE users (id INTEGER); INSERT INTO users VALUES (1);",
        ';',
    );
    assert_eq!(
        statements,
        vec![
            "CREATE TABLE users (id INTEGER)",
            "INSERT INTO users VALUES (1)",
        ]
    );
}

#[test]
fn drops_empty_statements() {
    let statements = split_statements("  ;  ; CREATE TABLE t (id INTEGER);  ;  ", ';');
    assert_eq!(statements, vec!["CREATE TABLE t (id INTEGER)"]);
}

#[test]
fn keeps_statement_without_trailing_delimiter() {
    let statements = split_statements("SELECT 1", ';');
    assert_eq!(statements, vec!["SELECT 1"]);
}

#[test]
fn delimiter_inside_string_does_not_split() {
    let statements = split_statements("INSERT INTO t VALUES ('a;b'); SELECT 1;", ';');
    assert_eq!(
        statements,
        vec!["INSERT INTO t VALUES ('a;b')", "SELECT 1"]
    );
}

#[test]
fn doubled_quote_stays_inside_string() {
    let statements = split_statements("INSERT INTO t VALUES ('it''s;fine'); SELECT 1;", ';');
    assert_eq!(
        statements,
        vec!["INSERT INTO t VALUES ('it''s;fine')", "SELECT 1"]
    );
}

#[test]
fn delimiter_inside_line_comment_does_not_split() {
    let statements = split_statements("SELECT 1 -- trailing; note\n; SELECT 2;", ';');
    assert_eq!(statements.len(), 2);
    assert!(statements[0].starts_with("SELECT 1"));
    assert_eq!(statements[1], "SELECT 2");
}

#[test]
fn delimiter_inside_block_comment_does_not_split() {
    let statements = split_statements("SELECT 1 /* a;b */; SELECT 2;", ';');
    assert_eq!(statements, vec!["SELECT 1 /* a;b */", "SELECT 2"]);
}

#[test]
fn empty_script_yields_no_statements() {
    assert!(split_statements("", ';').is_empty());
    assert!(split_statements("   \n  ", ';').is_empty());
}
