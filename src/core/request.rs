//! Typed requests handed to the storage backend
//!
//! A request is compiled in one go from raw `key=value` arguments: the
//! option whitelist, the row range and the filter chain are all validated
//! before a request value exists, so a bad option never produces a partial
//! request.

use serde::Serialize;
use thiserror::Error;

use crate::core::decode::DecodeOptions;
use crate::core::filter::{Filter, FilterChain};
use crate::core::options::{OptionError, ParsedOptions, QueryCommand, ValidationError};
use crate::core::range::RowRange;

/// Any failure while turning arguments into a request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error(transparent)]
    Option(#[from] OptionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Per-read modifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadOption {
    /// Restrict returned cells
    RowFilter { filter: Filter },
    /// Cap the number of returned rows
    LimitRows { limit: i64 },
}

/// Build the read options: the filter (if any) first, then the row limit
fn read_options(options: &ParsedOptions) -> Result<Vec<ReadOption>, ValidationError> {
    let (chain, limit) = FilterChain::from_options(options)?;

    let mut read_options = Vec::new();
    if let Some(filter) = chain.into_filter() {
        read_options.push(ReadOption::RowFilter { filter });
    }
    if let Some(limit) = limit {
        read_options.push(ReadOption::LimitRows { limit });
    }
    Ok(read_options)
}

/// Scan of a row range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadRequest {
    pub table: String,
    pub range: RowRange,
    pub options: Vec<ReadOption>,
    pub decode: DecodeOptions,
}

impl ReadRequest {
    /// Compile `read <table> [key=value ...]`
    pub fn compile<S: AsRef<str>>(
        table: &str,
        args: &[S],
        env_decode: Option<String>,
    ) -> Result<Self, QueryError> {
        let parsed = ParsedOptions::parse(QueryCommand::Read, args)?;
        Ok(Self::from_options(table, &parsed, env_decode)?)
    }

    /// Build from already parsed options
    pub fn from_options(
        table: &str,
        parsed: &ParsedOptions,
        env_decode: Option<String>,
    ) -> Result<Self, ValidationError> {
        let range = RowRange::from_options(parsed)?;
        let options = read_options(parsed)?;

        Ok(Self {
            table: table.to_string(),
            range,
            options,
            decode: DecodeOptions::resolve(parsed, env_decode),
        })
    }

    /// The attached row filter, if any
    pub fn filter(&self) -> Option<&Filter> {
        self.options.iter().find_map(|o| match o {
            ReadOption::RowFilter { filter } => Some(filter),
            _ => None,
        })
    }

    /// The row limit, if any
    pub fn limit(&self) -> Option<i64> {
        self.options.iter().find_map(|o| match o {
            ReadOption::LimitRows { limit } => Some(*limit),
            _ => None,
        })
    }
}

/// Fetch of a single row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupRequest {
    pub table: String,
    pub row: String,
    pub options: Vec<ReadOption>,
    pub decode: DecodeOptions,
}

impl LookupRequest {
    /// Compile `lookup <table> <row> [key=value ...]`
    pub fn compile<S: AsRef<str>>(
        table: &str,
        row: &str,
        args: &[S],
        env_decode: Option<String>,
    ) -> Result<Self, QueryError> {
        let parsed = ParsedOptions::parse(QueryCommand::Lookup, args)?;

        Ok(Self {
            table: table.to_string(),
            row: row.to_string(),
            options: read_options(&parsed)?,
            decode: DecodeOptions::resolve(&parsed, env_decode),
        })
    }
}

/// Everything the CLI can ask of the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    ListTables,
    Count { table: String },
    Lookup(LookupRequest),
    Read(ReadRequest),
}
