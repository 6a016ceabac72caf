//! Value decoding hints for row printing

use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::options::{OptionKey, ParsedOptions};

/// Environment variable holding the default decode type
pub const DECODE_TYPE_ENV: &str = "BTCLI_DECODE_TYPE";

/// How cell values should be decoded when rendered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodeOptions {
    /// Decode type for every column without a specific entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Per-column decode types, keyed by column qualifier
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub columns: BTreeMap<String, String>,
}

impl DecodeOptions {
    /// `decode` wins over `env_default`; `decode_columns` is `col:type,col:type`
    ///
    /// Column entries without a `:` are ignored.
    pub fn resolve(options: &ParsedOptions, env_default: Option<String>) -> Self {
        let default = options
            .get(OptionKey::Decode)
            .map(str::to_string)
            .or(env_default.filter(|d| !d.is_empty()));

        let columns = options
            .get(OptionKey::DecodeColumns)
            .map(parse_columns)
            .unwrap_or_default();

        Self { default, columns }
    }

    /// Decode type for a column
    pub fn for_column(&self, column: &str) -> Option<&str> {
        self.columns
            .get(column)
            .or(self.default.as_ref())
            .map(String::as_str)
    }
}

fn parse_columns(arg: &str) -> BTreeMap<String, String> {
    arg.split(',')
        .filter_map(|pair| pair.split_once(':'))
        .map(|(column, kind)| (column.to_string(), kind.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_decode_overrides_env() {
        let options = ParsedOptions::default().with(OptionKey::Decode, "int");
        let decode = DecodeOptions::resolve(&options, Some("string".into()));
        assert_eq!(decode.default.as_deref(), Some("int"));
    }

    #[test]
    fn test_env_default_used() {
        let decode = DecodeOptions::resolve(&ParsedOptions::default(), Some("float".into()));
        assert_eq!(decode.default.as_deref(), Some("float"));

        let decode = DecodeOptions::resolve(&ParsedOptions::default(), Some(String::new()));
        assert_eq!(decode.default, None);
    }

    #[test]
    fn test_decode_columns_skip_malformed_pairs() {
        let options = ParsedOptions::default()
            .with(OptionKey::DecodeColumns, "visits:int,broken,name:string,ts:time:rfc3339");
        let decode = DecodeOptions::resolve(&options, None);

        assert_eq!(decode.columns.len(), 3);
        assert_eq!(decode.for_column("visits"), Some("int"));
        assert_eq!(decode.for_column("ts"), Some("time:rfc3339"));
        assert!(!decode.columns.contains_key("broken"));
    }

    #[test]
    fn test_for_column_falls_back_to_default() {
        let options = ParsedOptions::default()
            .with(OptionKey::Decode, "string")
            .with(OptionKey::DecodeColumns, "visits:int");
        let decode = DecodeOptions::resolve(&options, None);

        assert_eq!(decode.for_column("visits"), Some("int"));
        assert_eq!(decode.for_column("name"), Some("string"));
    }
}
