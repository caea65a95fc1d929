//! Engine errors that a randomly generated query may legitimately raise.

/// Message fragments of benign DuckDB errors.
const DUCKDB_EXPECTED: &[&str] = &[
    "Overflow",
    "Out of Range Error",
    "out of range",
    "Conversion Error",
    "Could not convert",
    "must appear in the GROUP BY clause",
    "must appear in select list",
    "must be part of an aggregate function",
    "ORDER BY expressions must appear",
    "division by zero",
];

/// Substring patterns that classify an engine error as expected.
///
/// A query hitting an expected error is skipped silently; any other error is
/// reported as unexpected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedErrors {
    patterns: Vec<String>,
}

impl ExpectedErrors {
    /// An empty list: every error is unexpected.
    pub fn new() -> Self {
        Self::default()
    }

    /// The default list for DuckDB.
    pub fn duckdb() -> Self {
        Self::new().with_patterns(DUCKDB_EXPECTED.iter().copied())
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.add(pattern);
        self
    }

    #[must_use]
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for pattern in patterns {
            self.add(pattern);
        }
        self
    }

    /// Adds a pattern; empty and duplicate patterns are ignored.
    pub fn add(&mut self, pattern: impl Into<String>) {
        let pattern = pattern.into();
        if !pattern.is_empty() && !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_expected(&self, message: &str) -> bool {
        self.patterns.iter().any(|p| message.contains(p.as_str()))
    }
}
