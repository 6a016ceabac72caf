use btcli::cli::{Cli, Commands};
use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Install miette's fancy error handler for readable diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    match cli.command {
        Commands::Ls => btcli::cli::commands::ls::run(&cli.global),
        Commands::Count(args) => btcli::cli::commands::count::run(args, &cli.global),
        Commands::Lookup(args) => btcli::cli::commands::lookup::run(args, &cli.global),
        Commands::Read(args) => btcli::cli::commands::read::run(args, &cli.global),
        Commands::Config(cmd) => btcli::cli::commands::config::run(cmd, &cli.global),
        Commands::Completions(args) => btcli::cli::commands::completions::run(args),
    }
}

/// Logs go to stderr; `BTCLI_LOG` takes a tracing filter directive
fn init_tracing(verbose: bool) {
    let default = if verbose { "btcli=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("BTCLI_LOG").unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
