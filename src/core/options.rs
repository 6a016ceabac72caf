//! `key=value` read options
//!
//! Commands such as `read` take their filters as trailing `key=value` words.
//! [`ParsedOptions`] validates the keys against the command's whitelist up
//! front; the range and filter builders then only deal with values.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Malformed or unknown `key=value` argument
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("Invalid option: {0}")]
    Invalid(String),

    #[error("Unknown option: {0}")]
    Unknown(String),
}

/// Option values that are well-formed but unusable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("\"start\"/\"end\" may not be mixed with \"prefix\"")]
    MixedRange,

    #[error("Invalid {key} value {value:?}: not an integer")]
    NotAnInteger { key: OptionKey, value: String },

    #[error("Invalid {key} value {value:?}: timestamp out of range")]
    TimestampOutOfRange { key: OptionKey, value: String },
}

/// Every option key understood by the query compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    Decode,
    DecodeColumns,
    Count,
    Start,
    End,
    Prefix,
    Regex,
    Version,
    Family,
    Value,
    From,
    To,
}

impl OptionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKey::Decode => "decode",
            OptionKey::DecodeColumns => "decode_columns",
            OptionKey::Count => "count",
            OptionKey::Start => "start",
            OptionKey::End => "end",
            OptionKey::Prefix => "prefix",
            OptionKey::Regex => "regex",
            OptionKey::Version => "version",
            OptionKey::Family => "family",
            OptionKey::Value => "value",
            OptionKey::From => "from",
            OptionKey::To => "to",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "decode" => Ok(OptionKey::Decode),
            "decode_columns" => Ok(OptionKey::DecodeColumns),
            "count" => Ok(OptionKey::Count),
            "start" => Ok(OptionKey::Start),
            "end" => Ok(OptionKey::End),
            "prefix" => Ok(OptionKey::Prefix),
            "regex" => Ok(OptionKey::Regex),
            "version" => Ok(OptionKey::Version),
            "family" => Ok(OptionKey::Family),
            "value" => Ok(OptionKey::Value),
            "from" => Ok(OptionKey::From),
            "to" => Ok(OptionKey::To),
            _ => Err(()),
        }
    }
}

/// Commands that accept `key=value` options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryCommand {
    Lookup,
    Read,
}

impl QueryCommand {
    pub fn name(&self) -> &'static str {
        match self {
            QueryCommand::Lookup => "lookup",
            QueryCommand::Read => "read",
        }
    }

    /// Whitelisted option keys for this command
    pub fn allowed_keys(&self) -> &'static [OptionKey] {
        match self {
            QueryCommand::Lookup => &[
                OptionKey::Decode,
                OptionKey::DecodeColumns,
                OptionKey::Version,
            ],
            QueryCommand::Read => &[
                OptionKey::Decode,
                OptionKey::DecodeColumns,
                OptionKey::Count,
                OptionKey::Start,
                OptionKey::End,
                OptionKey::Prefix,
                OptionKey::Version,
                OptionKey::Family,
                OptionKey::Value,
                OptionKey::From,
                OptionKey::To,
            ],
        }
    }
}

/// Validated option values, keyed by option
///
/// Values are kept verbatim. An empty value counts as unset everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOptions {
    values: BTreeMap<OptionKey, String>,
}

impl ParsedOptions {
    /// Parse arguments for one of the query commands
    pub fn parse<S: AsRef<str>>(command: QueryCommand, args: &[S]) -> Result<Self, OptionError> {
        let parsed = Self::parse_with(args, command.allowed_keys())?;
        tracing::debug!(command = command.name(), options = parsed.len(), "parsed options");
        Ok(parsed)
    }

    /// Parse arguments against an explicit whitelist
    ///
    /// Each argument is split on its first `=`. Later duplicates win.
    pub fn parse_with<S: AsRef<str>>(
        args: &[S],
        allowed: &[OptionKey],
    ) -> Result<Self, OptionError> {
        let mut values = BTreeMap::new();

        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| OptionError::Invalid(arg.to_string()))?;

            let key = key
                .parse::<OptionKey>()
                .ok()
                .filter(|k| allowed.contains(k))
                .ok_or_else(|| OptionError::Unknown(arg.to_string()))?;

            values.insert(key, value.to_string());
        }

        Ok(Self { values })
    }

    /// Set a value directly
    pub fn with(mut self, key: OptionKey, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    /// Non-empty value for `key`
    pub fn get(&self, key: OptionKey) -> Option<&str> {
        self.values
            .get(&key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Integer value for `key`, see [`parse_int`] for the accepted syntax
    pub fn int(&self, key: OptionKey) -> Result<Option<i64>, ValidationError> {
        self.get(key)
            .map(|value| {
                parse_int(value).ok_or_else(|| ValidationError::NotAnInteger {
                    key,
                    value: value.to_string(),
                })
            })
            .transpose()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(OptionKey, String)> for ParsedOptions {
    fn from_iter<I: IntoIterator<Item = (OptionKey, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Parse a signed 64-bit integer literal with an optional base prefix
///
/// Accepts an optional sign followed by `0x`/`0X` (hex), `0b`/`0B` (binary),
/// `0o`/`0O` or a bare leading `0` (octal), or plain decimal digits.
/// Single `_` separators may appear between digits, or right after a base
/// prefix (`1_000`, `0x_ff`).
pub fn parse_int(s: &str) -> Option<i64> {
    let (negative, body) = match s.as_bytes().first().copied()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, prefixed, digits) = if let Some(rest) = strip_base(body, 'x') {
        (16, true, rest)
    } else if let Some(rest) = strip_base(body, 'b') {
        (2, true, rest)
    } else if let Some(rest) = strip_base(body, 'o') {
        (8, true, rest)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, true, &body[1..])
    } else {
        (10, false, body)
    };

    if !separators_ok(digits, prefixed) {
        return None;
    }
    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = i128::from(u64::from_str_radix(&digits, radix).ok()?);
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

/// A base prefix counts as a digit, so `_` may follow it directly
fn separators_ok(digits: &str, prefixed: bool) -> bool {
    !digits.ends_with('_')
        && !digits.contains("__")
        && (prefixed || !digits.starts_with('_'))
}

fn strip_base(s: &str, marker: char) -> Option<&str> {
    let rest = s.strip_prefix('0')?;
    rest.strip_prefix(marker)
        .or_else(|| rest.strip_prefix(marker.to_ascii_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_read_options() {
        let parsed =
            ParsedOptions::parse(QueryCommand::Read, &["start=a", "end=z", "count=10"]).unwrap();
        assert_eq!(parsed.get(OptionKey::Start), Some("a"));
        assert_eq!(parsed.get(OptionKey::End), Some("z"));
        assert_eq!(parsed.get(OptionKey::Count), Some("10"));
        assert_eq!(parsed.len(), 3);
    }

    #[test]
    fn test_split_on_first_equals_only() {
        let parsed = ParsedOptions::parse(QueryCommand::Read, &["value=a=b"]).unwrap();
        assert_eq!(parsed.get(OptionKey::Value), Some("a=b"));
    }

    #[test]
    fn test_values_are_not_trimmed() {
        let parsed = ParsedOptions::parse(QueryCommand::Read, &["prefix= row "]).unwrap();
        assert_eq!(parsed.get(OptionKey::Prefix), Some(" row "));

        let err = ParsedOptions::parse(QueryCommand::Read, &[" prefix=row"]).unwrap_err();
        assert_eq!(err, OptionError::Unknown(" prefix=row".to_string()));
    }

    #[test]
    fn test_missing_equals_is_invalid() {
        let err = ParsedOptions::parse(QueryCommand::Read, &["count=1", "prefix"]).unwrap_err();
        assert_eq!(err, OptionError::Invalid("prefix".to_string()));
        assert_eq!(err.to_string(), "Invalid option: prefix");
    }

    #[test]
    fn test_unknown_key_names_argument() {
        let err = ParsedOptions::parse(QueryCommand::Read, &["foo=bar"]).unwrap_err();
        assert_eq!(err.to_string(), "Unknown option: foo=bar");
    }

    #[test]
    fn test_lookup_whitelist() {
        assert!(ParsedOptions::parse(QueryCommand::Lookup, &["version=1", "decode=string"]).is_ok());

        let err = ParsedOptions::parse(QueryCommand::Lookup, &["count=1"]).unwrap_err();
        assert_eq!(err, OptionError::Unknown("count=1".to_string()));
    }

    #[test]
    fn test_regex_not_whitelisted_for_read() {
        let err = ParsedOptions::parse(QueryCommand::Read, &["regex=^a"]).unwrap_err();
        assert_eq!(err, OptionError::Unknown("regex=^a".to_string()));

        let parsed = ParsedOptions::parse_with(&["regex=^a"], &[OptionKey::Regex]).unwrap();
        assert_eq!(parsed.get(OptionKey::Regex), Some("^a"));
    }

    #[test]
    fn test_last_duplicate_wins() {
        let parsed = ParsedOptions::parse(QueryCommand::Read, &["count=1", "count=2"]).unwrap();
        assert_eq!(parsed.get(OptionKey::Count), Some("2"));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let args = ["family=cf", "version=2", "start=a"];
        let first = ParsedOptions::parse(QueryCommand::Read, &args).unwrap();
        let second = ParsedOptions::parse(QueryCommand::Read, &args).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_value_is_unset() {
        let parsed = ParsedOptions::parse(QueryCommand::Read, &["start="]).unwrap();
        assert_eq!(parsed.get(OptionKey::Start), None);
        assert!(!parsed.is_empty());
    }

    #[test]
    fn test_int_values() {
        let parsed = ParsedOptions::default()
            .with(OptionKey::Count, "5")
            .with(OptionKey::Version, "0x3")
            .with(OptionKey::From, "abc");

        assert_eq!(parsed.int(OptionKey::Count), Ok(Some(5)));
        assert_eq!(parsed.int(OptionKey::Version), Ok(Some(3)));
        assert_eq!(parsed.int(OptionKey::To), Ok(None));
        assert_eq!(
            parsed.int(OptionKey::From),
            Err(ValidationError::NotAnInteger {
                key: OptionKey::From,
                value: "abc".to_string()
            })
        );
    }

    #[test]
    fn test_parse_int_syntax() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("-42"), Some(-42));
        assert_eq!(parse_int("+7"), Some(7));
        assert_eq!(parse_int("0"), Some(0));
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("0XfF"), Some(255));
        assert_eq!(parse_int("0b101"), Some(5));
        assert_eq!(parse_int("0o17"), Some(15));
        assert_eq!(parse_int("017"), Some(15));
        assert_eq!(parse_int("-9223372036854775808"), Some(i64::MIN));

        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int("0x"), None);
        assert_eq!(parse_int("08"), None);
        assert_eq!(parse_int("1.5"), None);
        assert_eq!(parse_int("--1"), None);
        assert_eq!(parse_int(" 1"), None);
        assert_eq!(parse_int("9223372036854775808"), None);
    }

    #[test]
    fn test_parse_int_digit_separators() {
        assert_eq!(parse_int("1_000"), Some(1000));
        assert_eq!(parse_int("-1_000_000"), Some(-1_000_000));
        assert_eq!(parse_int("0x_3"), Some(3));
        assert_eq!(parse_int("0xff_ff"), Some(0xffff));
        assert_eq!(parse_int("0b1_0"), Some(2));
        assert_eq!(parse_int("0_17"), Some(15));

        assert_eq!(parse_int("_1"), None);
        assert_eq!(parse_int("1_"), None);
        assert_eq!(parse_int("1__0"), None);
        assert_eq!(parse_int("0x_"), None);
        assert_eq!(parse_int("0_"), None);
        assert_eq!(parse_int("_"), None);
    }
}
