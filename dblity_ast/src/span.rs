//! Source locations.
//!
//! Spans are produced by the host front-end and passed through the checker
//! unchanged, so diagnostics point at exactly what the host reported. Only
//! the byte offsets are required on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of a declaration, annotation or expression in the host file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    /// Exclusive.
    pub end: usize,
    /// 1-based; `0` when the host sent offsets only.
    #[serde(default)]
    pub start_line: usize,
    #[serde(default)]
    pub end_line: usize,
    /// 1-based byte column.
    #[serde(default)]
    pub start_column: usize,
    #[serde(default)]
    pub end_column: usize,
}

impl Span {
    pub fn new(
        start: usize,
        end: usize,
        start_line: usize,
        end_line: usize,
        start_column: usize,
        end_column: usize,
    ) -> Self {
        Self {
            start,
            end,
            start_line,
            end_line,
            start_column,
            end_column,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        let first = if self.start <= other.start { self } else { other };
        let last = if self.end >= other.end { self } else { other };
        Span {
            start: first.start,
            end: last.end,
            start_line: self.start_line.min(other.start_line),
            end_line: self.end_line.max(other.end_line),
            start_column: first.start_column,
            end_column: last.end_column,
        }
    }
}

/// `line:column` of the start, as diagnostics print it.
impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_column)
    }
}
