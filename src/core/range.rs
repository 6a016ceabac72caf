//! Row range selection from `start` / `end` / `prefix`

use serde::Serialize;

use crate::core::options::{OptionKey, ParsedOptions, ValidationError};

/// The set of row keys a read scans
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowRange {
    /// Full table scan
    Unbounded,
    /// `[start, end)`; an empty start means the first row
    Bounded { start: String, end: String },
    /// `[start, ∞)`
    From { start: String },
    /// All keys beginning with `prefix`
    Prefix { prefix: String },
}

impl RowRange {
    /// Build the range for a `read`
    ///
    /// `prefix` cannot be combined with `start` or `end`. Otherwise a prefix
    /// wins, then an end bound (with an optional start), then a bare start.
    pub fn from_options(options: &ParsedOptions) -> Result<Self, ValidationError> {
        let start = options.get(OptionKey::Start);
        let end = options.get(OptionKey::End);
        let prefix = options.get(OptionKey::Prefix);

        if (start.is_some() || end.is_some()) && prefix.is_some() {
            return Err(ValidationError::MixedRange);
        }

        let range = match (prefix, start, end) {
            (Some(prefix), _, _) => RowRange::Prefix {
                prefix: prefix.to_string(),
            },
            (None, start, Some(end)) => RowRange::Bounded {
                start: start.unwrap_or_default().to_string(),
                end: end.to_string(),
            },
            (None, Some(start), None) => RowRange::From {
                start: start.to_string(),
            },
            (None, None, None) => RowRange::Unbounded,
        };

        Ok(range)
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, RowRange::Unbounded)
    }
}

impl std::fmt::Display for RowRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowRange::Unbounded => write!(f, "<unbounded>"),
            RowRange::Bounded { start, end } => write!(f, "[{:?}, {:?})", start, end),
            RowRange::From { start } => write!(f, "[{:?}, ∞)", start),
            RowRange::Prefix { prefix } => write!(f, "{:?}*", prefix),
        }
    }
}
