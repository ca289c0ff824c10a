//! pricyse - resale price estimates for secondhand listings

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pricyse::cli::{Cli, Commands, ConfigCommands};
use pricyse::error::Result;

mod commands;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("\n{}", hint);
        }
        std::process::exit(1);
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable
fn init_logging(verbose: bool) {
    let default = if verbose { "warn,pricyse=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Price {
            title,
            description,
            category,
            brand,
            condition,
            size,
            material,
            image,
            json,
        } => commands::cmd_price(
            commands::PriceArgs { title, description, category, brand, condition, size, material },
            image,
            json,
        ),

        Commands::Query { title, brand, color, material, size, condition } => {
            commands::cmd_query(title, brand, color, material, size, condition)
        }
        Commands::Comps { file, json } => commands::cmd_comps(file, json),

        Commands::Describe { title, notes, style } => commands::cmd_describe(&title, &notes, style),
        Commands::Vision { images, notes, json } => commands::cmd_vision(images, notes, json),

        Commands::Config(ConfigCommands::Show) => commands::cmd_config_show(),
        Commands::Config(ConfigCommands::Path) => commands::cmd_config_path(),
        Commands::Completions { shell } => commands::cmd_completions(shell),
    }
}
