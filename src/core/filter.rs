//! Row filter chain from `key=value` options
//!
//! Filters are always assembled in [`FILTER_ORDER`], whatever order the
//! options were typed in. The backend applies a chain left to right, so the
//! order is part of the query's meaning.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::options::{OptionKey, ParsedOptions, ValidationError};

/// A single row filter, or a chain of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    /// Row key matches a regular expression
    RowKeyRegex { pattern: String },
    /// Column family matches a regular expression
    FamilyRegex { pattern: String },
    /// Keep only the latest `n` cell versions per column
    LatestN { n: i64 },
    /// Cell timestamp within `[start, end)`; a missing bound is open
    TimestampRange {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
    /// Cell value matches a regular expression
    ValueRegex { pattern: String },
    /// Logical AND of the inner filters, applied in order
    Chain { filters: Vec<Filter> },
}

impl Filter {
    /// Family filter anchored to match `family` exactly
    pub fn family_equals(family: &str) -> Self {
        Filter::FamilyRegex {
            pattern: format!("^{}$", family),
        }
    }

    pub fn row_key_regex(pattern: impl Into<String>) -> Self {
        Filter::RowKeyRegex {
            pattern: pattern.into(),
        }
    }

    pub fn latest_n(n: i64) -> Self {
        Filter::LatestN { n }
    }

    pub fn value_equals(value: impl Into<String>) -> Self {
        Filter::ValueRegex {
            pattern: value.into(),
        }
    }
}

/// One step of filter derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    Regex,
    Family,
    Version,
    Timestamp,
    Value,
}

/// The order filters are derived and chained in
pub const FILTER_ORDER: [FilterStage; 5] = [
    FilterStage::Regex,
    FilterStage::Family,
    FilterStage::Version,
    FilterStage::Timestamp,
    FilterStage::Value,
];

impl FilterStage {
    /// Filter contributed by this stage, if its options are set
    fn derive(self, options: &ParsedOptions) -> Result<Option<Filter>, ValidationError> {
        let filter = match self {
            FilterStage::Regex => options.get(OptionKey::Regex).map(Filter::row_key_regex),
            FilterStage::Family => options.get(OptionKey::Family).map(Filter::family_equals),
            FilterStage::Version => options.int(OptionKey::Version)?.map(Filter::latest_n),
            FilterStage::Timestamp => {
                let start = timestamp(options, OptionKey::From)?;
                let end = timestamp(options, OptionKey::To)?;
                if start.is_some() || end.is_some() {
                    Some(Filter::TimestampRange { start, end })
                } else {
                    None
                }
            }
            FilterStage::Value => options.get(OptionKey::Value).map(Filter::value_equals),
        };
        Ok(filter)
    }
}

/// Unix seconds option as a UTC instant
fn timestamp(
    options: &ParsedOptions,
    key: OptionKey,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let Some(secs) = options.int(key)? else {
        return Ok(None);
    };
    DateTime::from_timestamp(secs, 0)
        .map(Some)
        .ok_or_else(|| ValidationError::TimestampOutOfRange {
            key,
            value: options.get(key).unwrap_or_default().to_string(),
        })
}

/// Filters in application order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    /// Derive the chain and the row limit (`count`)
    ///
    /// The limit caps returned rows and is kept out of the chain.
    pub fn from_options(options: &ParsedOptions) -> Result<(Self, Option<i64>), ValidationError> {
        let mut filters = Vec::new();
        for stage in FILTER_ORDER {
            if let Some(filter) = stage.derive(options)? {
                filters.push(filter);
            }
        }

        let limit = options.int(OptionKey::Count)?;
        Ok((Self { filters }, limit))
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// The single filter to attach to a request
    ///
    /// None when empty, the filter itself when alone, a chain otherwise.
    pub fn into_filter(self) -> Option<Filter> {
        let mut filters = self.filters;
        match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Filter::Chain { filters }),
        }
    }
}
