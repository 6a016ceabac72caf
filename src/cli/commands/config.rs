//! `btcli config` command - Inspect the effective configuration

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::{Credentials, ResolvedConfig};
use crate::core::rcfile::RcFile;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved project, instance and authentication
    Show(ShowArgs),

    /// Show the settings file location
    Path,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Serializable view of a resolved configuration; never includes tokens
#[derive(Debug, Serialize)]
struct ConfigView {
    project: String,
    instance: String,
    auth: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    credentials_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_expiry: Option<String>,
}

impl From<&ResolvedConfig> for ConfigView {
    fn from(config: &ResolvedConfig) -> Self {
        let (credentials_file, token_expiry) = match &config.credentials {
            Credentials::File(path) => (Some(path.display().to_string()), None),
            Credentials::TokenSource(source) => {
                (None, source.cached_expiry().map(|e| e.to_rfc3339()))
            }
        };

        Self {
            project: config.project.clone(),
            instance: config.instance.clone(),
            auth: config.credentials.kind(),
            credentials_file,
            token_expiry,
        }
    }
}

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Path => run_path(global),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = helpers::resolve_config(global)?;
    let view = ConfigView::from(&config);

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&view).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("{}", style("Effective Configuration").bold());
            println!("  {:<10} {}", "project:", display_or_unset(&view.project));
            println!("  {:<10} {}", "instance:", display_or_unset(&view.instance));
            match (&view.credentials_file, &view.token_expiry) {
                (Some(path), _) => {
                    println!("  {:<10} credentials file {}", "auth:", style(path).cyan())
                }
                (None, Some(expiry)) => println!(
                    "  {:<10} gcloud access token (expires {})",
                    "auth:",
                    style(expiry).yellow()
                ),
                (None, None) => println!("  {:<10} gcloud access token", "auth:"),
            }
        }
    }

    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    let path = global
        .rc
        .clone()
        .or_else(RcFile::default_path)
        .ok_or_else(|| miette::miette!("Could not determine the home directory"))?;

    let state = if path.exists() {
        style("(exists)").green()
    } else {
        style("(not found)").dim()
    };
    println!("Settings: {} {}", style(path.display()).cyan(), state);
    Ok(())
}

fn display_or_unset(value: &str) -> String {
    if value.is_empty() {
        style("(unset)").dim().to_string()
    } else {
        value.to_string()
    }
}
