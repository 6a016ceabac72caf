//! Core module - credential resolution and query option compilation

pub mod backend;
pub mod config;
pub mod decode;
pub mod filter;
pub mod gcloud;
pub mod options;
pub mod range;
pub mod rcfile;
pub mod request;
pub mod token;

pub use backend::{Backend, BackendError, JsonLinesBackend};
pub use config::{ConfigError, CredentialResolver, Credentials, FlagOverrides, ResolvedConfig};
pub use decode::DecodeOptions;
pub use filter::{Filter, FilterChain, FilterStage, FILTER_ORDER};
pub use gcloud::{ConfigHelper, GcloudCommand, GcloudSnapshot, HelperError};
pub use options::{OptionError, OptionKey, ParsedOptions, QueryCommand, ValidationError};
pub use range::RowRange;
pub use rcfile::RcFile;
pub use request::{LookupRequest, QueryError, ReadOption, ReadRequest, Request};
pub use token::{HelperTokenSource, ReuseTokenSource, StaticTokenSource, Token, TokenError, TokenSource};
