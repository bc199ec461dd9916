//! dagload CLI Library
//!
//! Command-line front end of the loader: reads csv, json and spreadsheet
//! inputs, resolves their models against an Odoo server (or a TOML catalog)
//! and loads them in dependency order through JSON-RPC.
//!
//! ```text
//! dagload -f res.country.csv -f res.partner.csv --batch 100
//! cat categories.json | dagload -s - json product.category
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod odoo;
pub mod readers;
pub mod run;

// Re-export commonly used types
pub use config::Config;
pub use error::{CliError, Result};

use clap::Parser;
use dagload_core::DEFAULT_BATCH_SIZE;
use std::path::PathBuf;

/// dagload - dependency-ordered data loading for Odoo
#[derive(Parser, Debug)]
#[command(name = "dagload")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file. csv and json files are named after their model
    /// (res.partner.csv); xlsx, xls and ods sheets are named after theirs
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Stream input: a path (or - for stdin), its format (csv or json) and
    /// the target model
    #[arg(
        short = 's',
        long = "stream",
        num_args = 3,
        value_names = ["PATH", "FORMAT", "MODEL"]
    )]
    pub streams: Vec<String>,

    /// Rows per write
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch: usize,

    /// Log of batch outcomes; rows recorded as loaded are skipped on rerun
    #[arg(long, default_value = "./log.json")]
    pub out: PathBuf,

    /// Read model metadata from a TOML catalog instead of the server
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Server URL
    #[arg(long, env = "DAGLOAD_URL", default_value = config::DEFAULT_URL)]
    pub url: String,

    /// Database name
    #[arg(long, env = "DAGLOAD_DB", default_value = config::DEFAULT_DB)]
    pub db: String,

    /// Login
    #[arg(long, env = "DAGLOAD_USER", default_value = config::DEFAULT_USER)]
    pub user: String,

    /// Password
    #[arg(long, env = "DAGLOAD_PASSWORD", default_value = config::DEFAULT_PASSWORD, hide_env_values = true, hide_default_value = true)]
    pub password: String,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the CLI reference as markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
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
    fn test_defaults() {
        let cli = Cli::try_parse_from(["dagload", "-f", "res.partner.csv"]).unwrap();
        assert_eq!(cli.batch, 50);
        assert_eq!(cli.out, PathBuf::from("./log.json"));
        assert_eq!(cli.files, [PathBuf::from("res.partner.csv")]);
        assert!(cli.streams.is_empty());
    }

    #[test]
    fn test_repeated_streams() {
        let cli = Cli::try_parse_from([
            "dagload", "-s", "-", "csv", "res.country", "--stream", "b.json", "json", "res.partner",
        ])
        .unwrap();
        assert_eq!(cli.streams.len(), 6);
        assert_eq!(input::Input::streams(&cli.streams).len(), 2);
    }

    #[test]
    fn test_incomplete_stream_is_rejected() {
        assert!(Cli::try_parse_from(["dagload", "-s", "-", "csv"]).is_err());
    }
}
