use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::describe::DescriptionStyle;

/// Shell types for completion generation
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

#[derive(Parser)]
#[command(name = "pricyse")]
#[command(author, version, about = "Resale price estimates for secondhand listings", long_about = None)]
#[command(after_help = r#"Examples:
  pricyse price "Stussy 8 Ball Hoodie" --brand Stussy --size L    Price a listing
  pricyse price --image front.jpg --image tag.jpg                  Price from photos
  pricyse query "Carhartt Detroit Jacket" --color charcoal         Show the comps query
  pbpaste | pricyse comps                                          Parse pasted comps
  pricyse describe "Levi's 501" --notes "faded, 32x32"             Write listing copy

Quick Start:
  1. export OPENAI_API_KEY=sk-...
  2. pricyse price "Essentials hoodie" --category hoodie
"#)]
pub struct Cli {
    /// Log pipeline decisions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate a resale price from sold comps
    #[command(after_help = r#"Examples:
  pricyse price "Stussy 8 Ball Hoodie"
  pricyse price "Kapital Boro Jacket" --category outerwear --condition "used - good"
  pricyse price --image front.jpg --notes "small stain on cuff"   # Vision fills the gaps
  pricyse price "Fear of God Essentials Hoodie" --json            # JSON envelope for scripts
"#)]
    Price {
        /// Listing title (prompted for when omitted without images)
        #[arg(value_name = "TITLE")]
        title: Option<String>,

        /// Seller notes / description
        #[arg(long, alias = "notes")]
        description: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        brand: Option<String>,

        #[arg(long)]
        condition: Option<String>,

        #[arg(long)]
        size: Option<String>,

        #[arg(long)]
        material: Option<String>,

        /// Listing photo (JPEG/PNG, can be specified multiple times)
        #[arg(long, short = 'i', value_name = "PATH")]
        image: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the comps search query for a listing (no network)
    Query {
        #[arg(value_name = "TITLE")]
        title: String,

        #[arg(long)]
        brand: Option<String>,

        #[arg(long)]
        color: Option<String>,

        /// Fabric (can be specified multiple times)
        #[arg(long)]
        material: Vec<String>,

        #[arg(long)]
        size: Option<String>,

        #[arg(long)]
        condition: Option<String>,
    },

    /// Extract prices and statistics from comps text (no network)
    #[command(after_help = r#"Examples:
  pricyse comps comps.txt
  echo "SOLD $45, also 999 USD" | pricyse comps
  pricyse comps comps.txt --json
"#)]
    Comps {
        /// File with comps text (reads stdin when omitted)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write buyer-friendly listing copy
    Describe {
        #[arg(value_name = "TITLE")]
        title: String,

        /// Original seller notes
        #[arg(long)]
        notes: String,

        #[arg(long, value_enum, default_value_t = DescriptionStyle::Friendly)]
        style: DescriptionStyle,
    },

    /// Analyze listing photos into attributes and a draft description
    Vision {
        /// Listing photos (JPEG/PNG, at most 4 are used)
        #[arg(value_name = "IMAGE", required = true)]
        images: Vec<PathBuf>,

        #[arg(long)]
        notes: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    #[command(after_help = r#"Examples:
  pricyse completions bash > ~/.local/share/bash-completion/completions/pricyse
  pricyse completions zsh > ~/.zfunc/_pricyse
  pricyse completions fish > ~/.config/fish/completions/pricyse.fish
"#)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration (API key redacted)
    Show,
    /// Print the config file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_price() {
        let cli = Cli::parse_from([
            "pricyse", "price", "Stussy Hoodie", "--brand", "Stussy", "-i", "a.jpg", "-i", "b.png", "--json",
        ]);
        match cli.command {
            Commands::Price { title, brand, image, json, .. } => {
                assert_eq!(title.as_deref(), Some("Stussy Hoodie"));
                assert_eq!(brand.as_deref(), Some("Stussy"));
                assert_eq!(image.len(), 2);
                assert!(json);
            }
            _ => panic!("expected price command"),
        }
    }

    #[test]
    fn test_parse_describe_style() {
        let cli = Cli::parse_from(["pricyse", "describe", "Tee", "--notes", "soft", "--style", "minimal"]);
        match cli.command {
            Commands::Describe { style, .. } => assert_eq!(style, DescriptionStyle::Minimal),
            _ => panic!("expected describe command"),
        }
    }
}
