//! Regex pattern sets for keep/drop branch selection.
//!
//! Patterns match as prefixes: `A_P` matches `A_PX` and `A_PY`, while
//! `PX` does not match `A_PX`. Use `.*PX` to match anywhere.

use regex::Regex;

/// True iff `text` matches at least one of `patterns` (anchored at the
/// start) and that outcome equals `want_match`.
///
/// The patterns must already be anchored, see [`PatternSet::new`].
pub fn matches(patterns: &[Regex], text: &str, want_match: bool) -> bool {
    patterns.iter().any(|p| p.is_match(text)) == want_match
}

/// A compiled list of prefix-anchored patterns, keeping the source text
/// for reporting.
#[derive(Clone, Debug, Default)]
pub struct PatternSet {
    sources: Vec<String>,
    compiled: Vec<Regex>,
}

impl PatternSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, (String, regex::Error)> {
        let mut sources = Vec::with_capacity(patterns.len());
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let re = Regex::new(&format!("^(?:{})", pattern))
                .map_err(|e| (pattern.to_string(), e))?;
            sources.push(pattern.to_string());
            compiled.push(re);
        }
        Ok(Self { sources, compiled })
    }

    pub fn matches(&self, text: &str, want_match: bool) -> bool {
        matches(&self.compiled, text, want_match)
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.matches(text, true)
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }
}

/// Fate of one input branch under a keep/drop configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Retention {
    /// Matched a drop pattern. Drop wins over keep.
    Drop,
    /// Matched a keep pattern and no drop pattern.
    Keep,
    /// Matched neither list.
    Excluded,
}

impl Retention {
    pub fn decide(keep: &PatternSet, drop: &PatternSet, branch: &str) -> Self {
        if drop.is_match(branch) {
            Retention::Drop
        } else if keep.is_match(branch) {
            Retention::Keep
        } else {
            Retention::Excluded
        }
    }
}
