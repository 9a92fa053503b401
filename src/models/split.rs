//! Split markers and ratio annotations
//!
//! A memo such as `"dinner 割勘 2:1"` carries two things: the split marker,
//! which flags the transaction, and the ratio annotation after it. Both are
//! tokenized here with explicit failure modes.

use regex::Regex;

use crate::error::{SplitError, SplitResult};

/// A set of equivalent memo literals that flag a split
///
/// Matching is a case-sensitive substring match; any whitespace around the
/// literal belongs to the marker.
#[derive(Debug, Clone)]
pub struct SplitMarker {
    literals: Vec<String>,
    pattern: Regex,
}

impl SplitMarker {
    /// Build a marker from its literals
    ///
    /// Literals are matched verbatim, never as regex syntax. Blank literals
    /// are ignored; at least one must remain.
    pub fn new<S: AsRef<str>>(literals: &[S]) -> SplitResult<Self> {
        let mut literals: Vec<String> = literals
            .iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        if literals.is_empty() {
            return Err(SplitError::Config("split marker has no literals".into()));
        }

        // Longest first so a literal that extends another wins the alternation
        literals.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        literals.dedup();

        let alternation = literals
            .iter()
            .map(|l| regex::escape(l))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = Regex::new(&format!(r"\s*(?:{})\s*", alternation))
            .map_err(|e| SplitError::Config(format!("invalid split marker: {}", e)))?;

        Ok(Self { literals, pattern })
    }

    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    /// Whether the memo is flagged for splitting
    pub fn is_match(&self, memo: &str) -> bool {
        self.pattern.is_match(memo)
    }

    /// Split a memo at the first marker into (retained memo, annotation)
    pub fn split<'a>(&self, memo: &'a str) -> Option<(&'a str, &'a str)> {
        self.pattern
            .find(memo)
            .map(|m| (&memo[..m.start()], &memo[m.end()..]))
    }
}

/// Each party's proportional weight, as written after the marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioAnnotation {
    pub a: f64,
    pub b: f64,
}

impl RatioAnnotation {
    /// Parse `<a>:<b>` or `<a>;<b>`
    ///
    /// Both values must be non-negative finite numbers and at least one must
    /// be nonzero.
    pub fn parse(text: &str) -> Result<Self, String> {
        let tokens: Vec<&str> = text.trim().split([':', ';']).map(str::trim).collect();

        if tokens.len() != 2 {
            return Err(format!(
                "expected two ratios separated by ':' or ';' in '{}'",
                text.trim()
            ));
        }

        let a = parse_ratio(tokens[0])?;
        let b = parse_ratio(tokens[1])?;

        if a + b <= 0.0 {
            return Err("ratios must not both be zero".to_string());
        }

        Ok(Self { a, b })
    }

    pub fn total(&self) -> f64 {
        self.a + self.b
    }
}

fn parse_ratio(token: &str) -> Result<f64, String> {
    if token.is_empty() {
        return Err("missing ratio value".to_string());
    }
    let value: f64 = token
        .parse()
        .map_err(|_| format!("'{}' is not a number", token))?;
    if !value.is_finite() {
        return Err(format!("'{}' is not a finite number", token));
    }
    if value < 0.0 {
        return Err(format!("'{}' is negative", token));
    }
    Ok(value)
}
