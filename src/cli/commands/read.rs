//! `btcli read` command - Read rows
//!
//! Range options: `start=<row>`, `end=<row>`, `prefix=<row-prefix>`.
//! Filters: `family=<name>`, `version=<n>`, `from=<unix-secs>`, `to=<unix-secs>`,
//! `value=<regex>`. Output: `count=<n>`, `decode=<type>`,
//! `decode_columns=<col>:<type>,...`.

use miette::Result;

use crate::cli::helpers;
use crate::cli::GlobalOpts;
use crate::core::request::{ReadRequest, Request};

#[derive(clap::Args, Debug)]
pub struct ReadArgs {
    /// Table name
    #[arg(allow_hyphen_values = true)]
    pub table: String,

    /// Read options as key=value
    #[arg(value_name = "KEY=VALUE")]
    pub options: Vec<String>,
}

pub fn run(args: ReadArgs, global: &GlobalOpts) -> Result<()> {
    let request = ReadRequest::compile(&args.table, &args.options, helpers::env_decode_type())
        .map_err(|e| miette::miette!("{}", e))?;

    tracing::debug!(range = %request.range, "compiled read");
    helpers::submit(global, Request::Read(request))
}
