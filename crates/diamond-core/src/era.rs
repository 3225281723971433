// Era bucketing: maps a season year onto a named, contiguous year range.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EraError {
    #[error("era table must contain at least one era")]
    Empty,

    #[error("era `{key}` starts after it ends ({start} > {end})")]
    Inverted { key: String, start: i32, end: i32 },

    #[error("era `{key}` starts in {start}, expected {expected} to follow the previous era")]
    NotContiguous {
        key: String,
        start: i32,
        expected: i32,
    },

    #[error("duplicate era key `{0}`")]
    DuplicateKey(String),

    #[error("era key must not be empty")]
    EmptyKey,
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A named inclusive year range, e.g. the Steroid era 1993–2004.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EraSpan {
    pub key: String,
    pub label: String,
    pub start: i32,
    pub end: i32,
}

impl EraSpan {
    pub fn new(key: &str, label: &str, start: i32, end: i32) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            start,
            end,
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

/// An ordered set of eras that partitions a study window with no gaps and no
/// overlaps. The window itself is the "All" view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EraTable {
    spans: Vec<EraSpan>,
}

impl EraTable {
    /// Build a table from spans, validating that they are sorted and
    /// contiguous.
    pub fn new(spans: Vec<EraSpan>) -> Result<Self, EraError> {
        if spans.is_empty() {
            return Err(EraError::Empty);
        }

        let mut seen = std::collections::HashSet::new();
        let mut previous_end: Option<i32> = None;
        for span in &spans {
            if span.key.trim().is_empty() {
                return Err(EraError::EmptyKey);
            }
            if !seen.insert(span.key.as_str()) {
                return Err(EraError::DuplicateKey(span.key.clone()));
            }
            if span.start > span.end {
                return Err(EraError::Inverted {
                    key: span.key.clone(),
                    start: span.start,
                    end: span.end,
                });
            }
            if let Some(end) = previous_end {
                if span.start != end + 1 {
                    return Err(EraError::NotContiguous {
                        key: span.key.clone(),
                        start: span.start,
                        expected: end + 1,
                    });
                }
            }
            previous_end = Some(span.end);
        }

        Ok(Self { spans })
    }

    /// The 1970–2015 partition: Expansion, Steroid, Modern.
    pub fn canonical() -> Self {
        Self {
            spans: vec![
                EraSpan::new("expansion", "Expansion Era", 1970, 1992),
                EraSpan::new("steroid", "Steroid Era", 1993, 2004),
                EraSpan::new("modern", "Modern Era", 2005, 2015),
            ],
        }
    }

    /// The era a season belongs to, or `None` outside the study window.
    pub fn era_for(&self, year: i32) -> Option<&EraSpan> {
        self.spans.iter().find(|span| span.contains(year))
    }

    /// Inclusive `(first, last)` years covered by the table.
    pub fn window(&self) -> (i32, i32) {
        // Non-empty by construction.
        let first = self.spans.first().map_or(0, |s| s.start);
        let last = self.spans.last().map_or(-1, |s| s.end);
        (first, last)
    }

    pub fn contains(&self, year: i32) -> bool {
        let (first, last) = self.window();
        (first..=last).contains(&year)
    }

    pub fn spans(&self) -> &[EraSpan] {
        &self.spans
    }

    pub fn get(&self, key: &str) -> Option<&EraSpan> {
        self.spans.iter().find(|span| span.key == key)
    }
}

impl Default for EraTable {
    fn default() -> Self {
        Self::canonical()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
