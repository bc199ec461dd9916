//! dagload CLI - Main entry point

use clap::Parser;
use dagload_cli::Cli;
use dagload_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // .env values feed the DAGLOAD_* fallbacks of the argument parser
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    let level = if cli.verbose { LogLevel::Debug } else { LogLevel::Warn };
    let defaults = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("dagload")
        .build();

    // Environment variables take precedence
    let log_config = defaults.clone().merge_env().unwrap_or(defaults);

    // The loader works without logging
    let _guard = init_logging(&log_config).ok();

    match dagload_cli::run::run(&cli).await {
        Ok(summary) => {
            println!("{summary}");
            if summary.failed > 0 {
                println!(
                    "{} batch(es) were not loaded; see {} for the server messages.",
                    summary.failed,
                    cli.out.display()
                );
            }
        }
        Err(e) => {
            error!(error = %e, "Load failed");
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
