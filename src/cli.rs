//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect the relay location tree and the split tunneling app list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log debug output (overridden by `RUST_LOG`)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the relay location tree
    Relays {
        /// Relay list JSON file
        file: PathBuf,

        /// Read the flat API relay list format instead of the nested one
        #[arg(long)]
        api: bool,

        /// Only show locations matching this text
        #[arg(short, long)]
        search: Option<String>,

        /// Mark these countries or cities as expanded, e.g. `se` or `se-got`
        #[arg(short, long, value_delimiter = ',')]
        expand: Vec<String>,
    },

    /// List apps that can be excluded from the tunnel
    Apps {
        #[command(flatten)]
        source: AppSource,

        /// Only show apps whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Launch an app outside the tunnel
    Launch {
        /// Absolute path of the app's desktop entry
        path: String,

        #[command(flatten)]
        source: AppSource,
    },
}

#[derive(clap::Args, Debug)]
pub struct AppSource {
    /// Read apps from a JSON file instead of the installed desktop entries
    #[arg(long, value_name = "FILE", env = "MULLVAD_CATALOG_APPS_FILE")]
    pub apps_file: Option<PathBuf>,

    /// Desktop environments to filter for, `:`-separated [default: $XDG_CURRENT_DESKTOP]
    #[arg(long)]
    pub desktop: Option<String>,

    /// Locale used for localized app names [default: from $LANGUAGE, $LC_ALL, $LC_MESSAGES or $LANG]
    #[arg(long)]
    pub locale: Option<String>,
}
