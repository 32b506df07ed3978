//! Ignore-list policy.
//!
//! Operators name the checks whose errors should not block the run. Names are
//! matched case-insensitively and the reserved token `all` covers every check.

use std::collections::HashSet;

/// Reserved token that ignores every check's errors.
pub const IGNORE_ALL: &str = "all";

/// Lowercase-normalized set of check names whose errors are downgraded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    tokens: HashSet<String>,
}

impl IgnoreSet {
    /// Create an empty set (nothing ignored)
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated flag value such as `"Swap, NumCPU"`.
    pub fn from_flag_value(value: &str) -> Self {
        value
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect()
    }

    pub fn insert(&mut self, token: impl AsRef<str>) {
        self.tokens.insert(token.as_ref().trim().to_lowercase());
    }

    /// Whether the normalized token is present
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(&token.to_lowercase())
    }

    pub fn ignores_all(&self) -> bool {
        self.tokens.contains(IGNORE_ALL)
    }

    /// Whether errors of the check called `name` are downgraded to warnings.
    pub fn ignores(&self, name: &str) -> bool {
        self.ignores_all() || self.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Tokens in sorted order
    pub fn tokens(&self) -> Vec<&str> {
        let mut tokens: Vec<&str> = self.tokens.iter().map(String::as_str).collect();
        tokens.sort_unstable();
        tokens
    }
}

impl<S: AsRef<str>> FromIterator<S> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = IgnoreSet::new();
        for token in iter {
            set.insert(token);
        }
        set
    }
}
