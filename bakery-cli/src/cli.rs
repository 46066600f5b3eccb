use std::path::PathBuf;

use bakery::Category;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bakery")]
#[command(about = "Browse the bakery catalog, fill a cart and check out")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the catalog, optionally by category or search query
    Catalog {
        #[arg(short, long, default_value = "all")]
        category: Category,
        /// Matching cakes are listed first
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one cake with its sizes
    Show {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        name: Vec<String>,
    },
    /// Interactive shopping session
    Shop,
    /// Show the saved cart and place the order
    Checkout {
        /// TOML file with the delivery and payment details
        #[arg(short, long)]
        form: Option<PathBuf>,
        /// Print an empty form to fill in and exit
        #[arg(long, conflicts_with = "form")]
        print_form: bool,
    },
    /// Print config path and create default file if missing
    ConfigPath,
}
