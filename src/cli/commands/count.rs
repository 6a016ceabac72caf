//! `btcli count` command - Count rows in a table

use miette::Result;

use crate::cli::helpers;
use crate::cli::GlobalOpts;
use crate::core::request::Request;

#[derive(clap::Args, Debug)]
pub struct CountArgs {
    /// Table name
    #[arg(allow_hyphen_values = true)]
    pub table: String,
}

pub fn run(args: CountArgs, global: &GlobalOpts) -> Result<()> {
    helpers::submit(global, Request::Count { table: args.table })
}
