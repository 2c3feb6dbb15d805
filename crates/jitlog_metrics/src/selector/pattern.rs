//! Wildcard patterns for selecting functions by qualified name
//!
//! A pattern is made of literal characters plus two wildcards: `?` matches
//! exactly one character and `*` matches any run of characters, including
//! the empty one. A pattern always has to cover the whole word.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Returns true if `pattern` matches the entire `word`.
///
/// Runs in `O(word.len() * pattern.len())` time using a single row of the
/// `(word_index, pattern_index)` table, so pathological `*` runs cannot blow
/// up the way plain backtracking does.
pub fn matches(word: &str, pattern: &str) -> bool {
    let word: Vec<char> = word.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    // row[j]: does pattern[j..] match word[i..] for the current i
    let mut row = vec![false; pattern.len() + 1];

    // i == word.len(): only a tail made entirely of `*` matches nothing
    row[pattern.len()] = true;
    for j in (0..pattern.len()).rev() {
        row[j] = pattern[j] == '*' && row[j + 1];
    }

    for i in (0..word.len()).rev() {
        let below = row.clone();
        row[pattern.len()] = false;
        for j in (0..pattern.len()).rev() {
            row[j] = match pattern[j] {
                // consume one char and stay on `*`, or let `*` match nothing
                '*' => below[j] || row[j + 1],
                '?' => below[j + 1],
                literal => literal == word[i] && below[j + 1],
            };
        }
    }

    row[0]
}

/// A single wildcard pattern such as `__main__:compute_*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern(String);

impl Pattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this pattern covers all of `word`
    pub fn matches(&self, word: &str) -> bool {
        matches(word, &self.0)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Pattern {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Pattern {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
