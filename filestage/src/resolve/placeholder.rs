//! Placeholder directory patterns.
//!
//! A target key of the form `(prefix<var>suffix)` names a family of
//! directories rather than a single one. The single `<var>` placeholder is
//! turned into a glob wildcard to enumerate candidate directories, and into
//! a named capture group to extract the matched text, which becomes the
//! target basename of the node rooted at each match.
//!
//! The glob/regex construction lives here as one pure function so it can
//! be tested directly rather than only through end-to-end tree resolution.

use regex::Regex;

use crate::error::{Error, Result};

/// A parsed placeholder pattern: the enumeration glob and the extraction
/// regex derived from one `prefix<var>suffix` pattern.
#[derive(Debug, Clone)]
pub struct PlaceholderPattern {
    /// The placeholder variable name.
    pub variable: String,
    /// Glob pattern with the placeholder replaced by `*`, used to
    /// enumerate candidate directories.
    pub glob: String,
    regex: Regex,
}

impl PlaceholderPattern {
    /// Parses a placeholder pattern (without its surrounding parentheses).
    ///
    /// Literal parts are regex-escaped, the `<var>` placeholder becomes a
    /// named capture group, and any glob `*` in the literal parts becomes
    /// `.*` in the extraction regex.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPlaceholder`] when the pattern contains no
    /// `<var>` part, and a validation error for a malformed variable name
    /// or more than one placeholder.
    ///
    /// # Examples
    ///
    /// ```
    /// use filestage::resolve::PlaceholderPattern;
    ///
    /// let pattern = PlaceholderPattern::parse("scenarios/<name>").unwrap();
    /// assert_eq!(pattern.variable, "name");
    /// assert_eq!(pattern.glob, "scenarios/*");
    /// assert_eq!(pattern.extract("scenarios/alpha").as_deref(), Some("alpha"));
    /// assert!(pattern.extract("other/alpha").is_none());
    /// ```
    pub fn parse(pattern: &str) -> Result<Self> {
        let Some(open) = pattern.find('<') else {
            return Err(Error::MissingPlaceholder {
                pattern: pattern.to_string(),
            });
        };
        let Some(close_offset) = pattern[open + 1..].find('>') else {
            return Err(Error::MissingPlaceholder {
                pattern: pattern.to_string(),
            });
        };
        let close = open + 1 + close_offset;
        let variable = &pattern[open + 1..close];
        let suffix = &pattern[close + 1..];

        if !is_valid_variable(variable) {
            return Err(Error::Validation {
                field: pattern.to_string(),
                message: format!("invalid placeholder variable '<{variable}>'"),
            });
        }
        if suffix.contains('<') {
            return Err(Error::Validation {
                field: pattern.to_string(),
                message: "only one placeholder variable is allowed".to_string(),
            });
        }

        let prefix = &pattern[..open];
        let glob = format!("{prefix}*{suffix}");

        let regex_src = format!(
            "^{}(?P<{variable}>.*?){}$",
            escape_literal(prefix),
            escape_literal(suffix)
        );
        let regex = Regex::new(&regex_src).map_err(|e| Error::Validation {
            field: pattern.to_string(),
            message: format!("cannot build extraction regex: {e}"),
        })?;

        Ok(Self {
            variable: variable.to_string(),
            glob,
            regex,
        })
    }

    /// Extracts the placeholder value from a path matched by the glob,
    /// relative to the pattern's base directory.
    ///
    /// Returns `None` when the path does not match, or when the extracted
    /// value is empty.
    #[must_use]
    pub fn extract(&self, relative_path: &str) -> Option<String> {
        let captures = self.regex.captures(relative_path)?;
        let value = captures.name(&self.variable)?.as_str();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }
}

/// Escapes a literal pattern fragment for the extraction regex, turning
/// glob `*` into `.*`.
fn escape_literal(fragment: &str) -> String {
    regex::escape(fragment).replace("\\*", ".*")
}

fn is_valid_variable(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Returns the inner pattern when a target key is a parenthesized
/// placeholder key, e.g. `(scenarios/<name>)`.
#[must_use]
pub fn strip_parentheses(key: &str) -> Option<&str> {
    key.strip_prefix('(')?.strip_suffix(')')
}
