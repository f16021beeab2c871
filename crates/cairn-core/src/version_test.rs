//! Tests for version parsing, ordering, and display.

use super::Version;

fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

// ── Parsing ────────────────────────────────────────────────────────────

#[test]
fn parses_single_component() {
    assert_eq!(v("1"), Version::Numbered(vec![1]));
    assert_eq!(v("42"), Version::Numbered(vec![42]));
}

#[test]
fn parses_dotted_and_underscored() {
    assert_eq!(v("1.2.3"), Version::Numbered(vec![1, 2, 3]));
    assert_eq!(v("1_2_3"), Version::Numbered(vec![1, 2, 3]));
    assert_eq!(v("1_2.3"), Version::Numbered(vec![1, 2, 3]));
}

#[test]
fn empty_string_is_empty_sentinel() {
    assert_eq!(v(""), Version::Empty);
}

#[test]
fn latest_is_case_insensitive() {
    assert_eq!(v("latest"), Version::Latest);
    assert_eq!(v("LATEST"), Version::Latest);
    assert_eq!(v("Latest"), Version::Latest);
}

#[test]
fn rejects_empty_component() {
    assert!(Version::parse("1..2").is_err());
    assert!(Version::parse("1.").is_err());
    assert!(Version::parse(".1").is_err());
    assert!(Version::parse("1__2").is_err());
}

#[test]
fn rejects_non_digits() {
    assert!(Version::parse("1.a").is_err());
    assert!(Version::parse("v1").is_err());
    assert!(Version::parse("1.2-rc1").is_err());
    assert!(Version::parse("-1").is_err());
}

#[test]
fn error_names_the_offending_version() {
    let err = Version::parse("1.x").unwrap_err();
    assert!(err.to_string().contains("1.x"));
}

// ── Equality and canonical form ────────────────────────────────────────

#[test]
fn trailing_zeros_are_trimmed() {
    assert_eq!(v("1.0"), v("1"));
    assert_eq!(v("1.2.0.0"), v("1.2"));
    assert_eq!(v("0"), Version::Numbered(vec![0]));
    assert_eq!(v("0.0"), v("0"));
}

#[test]
fn interior_zeros_are_kept() {
    assert_ne!(v("1.0.1"), v("1.1"));
    assert_eq!(v("1.0.1"), Version::Numbered(vec![1, 0, 1]));
}

// ── Ordering ───────────────────────────────────────────────────────────

#[test]
fn orders_numerically_not_lexically() {
    assert!(v("2") < v("10"));
    assert!(v("1.9") < v("1.10"));
}

#[test]
fn orders_by_component() {
    assert!(v("1") < v("1.1"));
    assert!(v("1.1") < v("2"));
    assert!(v("1.2.3") < v("1.2.4"));
}

#[test]
fn sentinels_bracket_all_versions() {
    assert!(Version::Empty < v("0"));
    assert!(Version::Empty < v("999"));
    assert!(v("999") < Version::Latest);
    assert!(Version::Empty < Version::Latest);
}

#[test]
fn sorts_ascending() {
    let mut versions = vec![v("2"), v("1.1"), v("10"), v("1")];
    versions.sort();
    assert_eq!(versions, vec![v("1"), v("1.1"), v("2"), v("10")]);
}

// ── Display ────────────────────────────────────────────────────────────

#[test]
fn displays_canonical_dotted_form() {
    assert_eq!(v("1_2_3").to_string(), "1.2.3");
    assert_eq!(v("1.0").to_string(), "1");
    assert_eq!(v("0").to_string(), "0");
}

#[test]
fn displays_sentinels() {
    assert_eq!(Version::Latest.to_string(), "latest");
    assert_eq!(Version::Empty.to_string(), "<< empty >>");
}

#[test]
fn from_str_round_trips() {
    let version: Version = "4.5".parse().unwrap();
    assert_eq!(version.to_string(), "4.5");
}
