//! Placeholder substitution for migration scripts.
//!
//! Tokens of the form `<prefix><name><suffix>` (by default `${name}`) are
//! replaced with configured values before a script is executed. A token
//! whose name has no configured value is an error.

use crate::error::{CoreError, CoreResult};
use std::collections::HashMap;

/// A set of placeholder values together with the token delimiters.
#[derive(Debug, Clone)]
pub struct PlaceholderMap {
    prefix: String,
    suffix: String,
    values: HashMap<String, String>,
}

impl PlaceholderMap {
    pub fn new(prefix: &str, suffix: &str, values: HashMap<String, String>) -> Self {
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            values,
        }
    }

    /// A map with the default `${` / `}` delimiters and no values.
    pub fn empty() -> Self {
        Self::new("${", "}", HashMap::new())
    }

    /// Replace every placeholder token in `script`.
    ///
    /// `script_name` is only used in error messages. Text after a prefix
    /// with no matching suffix is left untouched.
    pub fn substitute(&self, script: &str, script_name: &str) -> CoreResult<String> {
        let mut out = String::with_capacity(script.len());
        let mut rest = script;

        while let Some(start) = rest.find(&self.prefix) {
            out.push_str(&rest[..start]);
            let after_prefix = &rest[start + self.prefix.len()..];

            let Some(end) = after_prefix.find(&self.suffix) else {
                // No closing delimiter: not a token.
                out.push_str(&rest[start..]);
                rest = "";
                break;
            };

            let name = &after_prefix[..end];
            match self.values.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    return Err(CoreError::UnresolvedPlaceholder {
                        token: format!("{}{}{}", self.prefix, name, self.suffix),
                        script: script_name.to_string(),
                    });
                }
            }
            rest = &after_prefix[end + self.suffix.len()..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

#[cfg(test)]
#[path = "placeholder_test.rs"]
mod tests;
