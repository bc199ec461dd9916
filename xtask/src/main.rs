//! Build automation tasks for dagload
//!
//! - Generating the CLI reference from the clap definitions

use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for dagload", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in Markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    let markdown = clap_markdown::help_markdown::<dagload_cli::Cli>();

    let content = format!(
        r#"# dagload CLI Reference

This documentation is generated from the CLI source code.

dagload loads csv, json and spreadsheet files into an Odoo database in
dependency order: referenced models first, parent records before their
children.

## Quick Start

```bash
# Models are taken from the file names
dagload -f res.country.csv -f res.partner.csv

# Every sheet named after a model becomes a dataset
dagload -f catalog.xlsx --batch 200 --progress

# Read from standard input
cat categories.json | dagload -s - json product.category
```

Rerunning the same command skips every row recorded as loaded in the
`--out` log (`./log.json` by default).

{}

## Environment Variables

- `DAGLOAD_URL` - Server URL (default: `http://localhost:8069`)
- `DAGLOAD_DB` - Database name (default: `odoo`)
- `DAGLOAD_USER` / `DAGLOAD_PASSWORD` - Credentials (default: `admin`)
- `DAGLOAD_TIMEOUT_SECS` - Timeout of a single RPC call (default: `300`)
- `LOG_LEVEL`, `LOG_FORMAT`, `LOG_OUTPUT`, `LOG_DIR`, `LOG_FILTER` - Logging

A `.env` file in the working directory is read on startup.

## Offline Metadata

`--catalog` replaces the server's schema with a TOML file:

```toml
[models."res.partner"]
label = "Contact"
parent = "parent_id"
relations = {{ country_id = "res.country", parent_id = "res.partner" }}
```

---

*To update, run `cargo xtask generate-cli-docs`.*
"#,
        markdown
    );

    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)?;

    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content)?;

    println!("Generated CLI documentation at: {}", file_path.display());

    Ok(())
}
