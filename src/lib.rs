//! btcli: a command-line client for Cloud Bigtable
//!
//! Resolves the project, instance and credential to use from flags, `~/.cbtrc`,
//! the environment and the `gcloud` configuration helper, and compiles
//! `key=value` read options into typed requests for a storage backend.

pub mod cli;
pub mod core;
