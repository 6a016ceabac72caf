//! `btcli ls` command - List tables in the instance

use miette::Result;

use crate::cli::helpers;
use crate::cli::GlobalOpts;
use crate::core::request::Request;

pub fn run(global: &GlobalOpts) -> Result<()> {
    helpers::submit(global, Request::ListTables)
}
