//! `btcli lookup` command - Read a single row
//!
//! Options: `decode=<type>`, `decode_columns=<col>:<type>,...`, `version=<n>`.

use miette::Result;

use crate::cli::helpers;
use crate::cli::GlobalOpts;
use crate::core::request::{LookupRequest, Request};

#[derive(clap::Args, Debug)]
pub struct LookupArgs {
    /// Table name
    #[arg(allow_hyphen_values = true)]
    pub table: String,

    /// Row key
    #[arg(allow_hyphen_values = true)]
    pub row: String,

    /// Read options as key=value
    #[arg(value_name = "KEY=VALUE")]
    pub options: Vec<String>,
}

pub fn run(args: LookupArgs, global: &GlobalOpts) -> Result<()> {
    // Options are validated before any configuration is resolved.
    let request = LookupRequest::compile(
        &args.table,
        &args.row,
        &args.options,
        helpers::env_decode_type(),
    )
    .map_err(|e| miette::miette!("{}", e))?;

    helpers::submit(global, Request::Lookup(request))
}
