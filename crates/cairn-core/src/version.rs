//! Migration version numbers.
//!
//! A [`Version`] is an ordered sequence of numeric components parsed from a
//! dotted or underscored string (`"1"`, `"1.2"`, `"1_2_3"`). Two sentinels
//! bracket the real versions: [`Version::Empty`] sorts below everything and
//! marks a database with no applied migrations; [`Version::Latest`] sorts
//! above everything and is only ever used as a target cap. Sentinels are
//! never stored in the ledger.

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::str::FromStr;

/// Reserved target string that maps to [`Version::Latest`].
pub const LATEST: &str = "latest";

/// A migration version.
///
/// Numbered versions are kept in canonical form: trailing zero components
/// beyond the first are trimmed at parse time, so `1.0` and `1` compare and
/// hash as the same version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
    /// Below every real version. The state of an untouched database.
    Empty,
    /// A real, dotted-numeric version.
    Numbered(Vec<u64>),
    /// Above every real version. Valid only as a migration target.
    Latest,
}

impl Version {
    /// Parse a version string.
    ///
    /// Components are separated by `.` or `_`. The empty string parses to
    /// [`Version::Empty`] and the reserved string `latest` (case
    /// insensitive) to [`Version::Latest`]. Empty components and non-digit
    /// characters are rejected.
    pub fn parse(s: &str) -> CoreResult<Self> {
        if s.is_empty() {
            return Ok(Version::Empty);
        }
        if s.eq_ignore_ascii_case(LATEST) {
            return Ok(Version::Latest);
        }

        let mut components = Vec::new();
        for part in s.replace('_', ".").split('.') {
            if part.is_empty() {
                return Err(CoreError::InvalidVersion {
                    version: s.to_string(),
                    reason: "empty version component".to_string(),
                });
            }
            let n: u64 = part.parse().map_err(|_| CoreError::InvalidVersion {
                version: s.to_string(),
                reason: format!("non-numeric component '{part}'"),
            })?;
            components.push(n);
        }

        // Canonical form: "1.0" is the same version as "1".
        while components.len() > 1 && components.last() == Some(&0) {
            components.pop();
        }
        Ok(Version::Numbered(components))
    }

    /// Whether this is a real (numbered) version rather than a sentinel.
    pub fn is_numbered(&self) -> bool {
        matches!(self, Version::Numbered(_))
    }
}

impl FromStr for Version {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Empty => write!(f, "<< empty >>"),
            Version::Latest => write!(f, "{LATEST}"),
            Version::Numbered(components) => {
                let parts: Vec<String> = components.iter().map(u64::to_string).collect();
                write!(f, "{}", parts.join("."))
            }
        }
    }
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
