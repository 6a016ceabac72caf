//! CLI command implementations

pub mod completions;
pub mod config;
pub mod count;
pub mod lookup;
pub mod ls;
pub mod read;
