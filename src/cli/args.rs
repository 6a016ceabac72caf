//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::config::ConfigCommands;
use crate::cli::commands::count::CountArgs;
use crate::cli::commands::lookup::LookupArgs;
use crate::cli::commands::read::ReadArgs;
use crate::core::config::FlagOverrides;

#[derive(Parser, Debug)]
#[command(
    name = "btcli",
    version,
    about = "Cloud Bigtable command-line client",
    long_about = "Cloud Bigtable command-line client.\n\n\
        The project, instance and credentials come from --project/--instance/--creds, \
        then ~/.cbtrc, then GOOGLE_APPLICATION_CREDENTIALS, then the active gcloud configuration."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Project ID, if unset uses the gcloud active project
    #[arg(long, global = true)]
    pub project: Option<String>,

    /// Cloud Bigtable instance
    #[arg(long, global = true)]
    pub instance: Option<String>,

    /// If set, use application credentials in this file
    #[arg(long, global = true, value_name = "FILE")]
    pub creds: Option<PathBuf>,

    /// Read settings from this file instead of ~/.cbtrc
    #[arg(long, global = true, value_name = "FILE")]
    pub rc: Option<PathBuf>,

    /// gcloud executable used as the configuration helper
    #[arg(long, global = true, env = "BTCLI_GCLOUD", hide = true)]
    pub gcloud: Option<String>,

    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

impl GlobalOpts {
    pub fn flag_overrides(&self) -> FlagOverrides {
        FlagOverrides {
            project: self.project.clone().filter(|p| !p.is_empty()),
            instance: self.instance.clone().filter(|i| !i.is_empty()),
            creds: self.creds.clone().filter(|c| !c.as_os_str().is_empty()),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tables
    Ls,

    /// Count rows in a table
    Count(CountArgs),

    /// Read a single row
    Lookup(LookupArgs),

    /// Read rows
    Read(ReadArgs),

    /// Show the effective configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for informational commands
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}
