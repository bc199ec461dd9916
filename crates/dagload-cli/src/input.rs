//! Resolving `--file` and `--stream` arguments into datasets

use crate::error::{CliError, Result};
use crate::readers::{read_csv, read_json, read_workbook};
use dagload_common::LoadError;
use dagload_core::{Dataset, MetadataProvider, Table};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extensions accepted for `--file`
pub const FILE_FORMATS: &[&str] = &["csv", "json", "xlsx", "xls", "ods"];

/// Formats accepted for `--stream`
pub const STREAM_FORMATS: &[&str] = &["csv", "json"];

/// Path argument that reads standard input
pub const STDIN: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
    /// Any workbook: one dataset per sheet named after a model
    Spreadsheet,
}

impl InputFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "xlsx" | "xls" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Format from the extension, model from the file stem or sheet names
    File(PathBuf),
    Stream {
        path: String,
        format: String,
        model: String,
    },
}

impl Input {
    /// Group flat `--stream` values into `(path, format, model)` triples
    pub fn streams(values: &[String]) -> Vec<Input> {
        values
            .chunks_exact(3)
            .map(|chunk| Input::Stream {
                path: chunk[0].clone(),
                format: chunk[1].clone(),
                model: chunk[2].clone(),
            })
            .collect()
    }

    fn name(&self) -> String {
        match self {
            Input::File(path) => path.display().to_string(),
            Input::Stream { path, .. } if path == STDIN => "<stdin>".to_string(),
            Input::Stream { path, .. } => path.clone(),
        }
    }
}

/// Read every input into datasets bound to known models
pub async fn read_inputs(inputs: &[Input], provider: &dyn MetadataProvider) -> Result<Vec<Dataset>> {
    if inputs.is_empty() {
        return Err(LoadError::NoInput.into());
    }

    let mut datasets = Vec::new();
    for input in inputs {
        let name = input.name();
        match input {
            Input::File(path) => {
                let ext = path
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                let format = InputFormat::parse(&ext)
                    .ok_or_else(|| unsupported(&name, &ext, FILE_FORMATS))?;

                if format == InputFormat::Spreadsheet {
                    datasets.extend(read_sheets(path, provider).await?);
                    continue;
                }

                let model = file_model(path);
                ensure_known(provider, &name, &model).await?;
                let table = read_table(format, BufReader::new(File::open(path)?), &name)?;
                datasets.push(dataset(model, name, table)?);
            }
            Input::Stream { path, format, model } => {
                let format = InputFormat::parse(format)
                    .filter(|f| *f != InputFormat::Spreadsheet)
                    .ok_or_else(|| unsupported(&name, format, STREAM_FORMATS))?;

                let model = model.to_lowercase();
                ensure_known(provider, &name, &model).await?;
                let table = if path == STDIN {
                    read_table(format, std::io::stdin().lock(), &name)?
                } else {
                    read_table(format, BufReader::new(File::open(path)?), &name)?
                };
                datasets.push(dataset(model, name, table)?);
            }
        }
    }
    Ok(datasets)
}

fn unsupported(name: &str, found: &str, supported: &[&str]) -> CliError {
    LoadError::UnsupportedFormat {
        source_name: name.to_string(),
        found: found.to_string(),
        supported: supported.join(", "),
    }
    .into()
}

/// `res.partner.csv` -> `res.partner`
fn file_model(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

async fn ensure_known(provider: &dyn MetadataProvider, input: &str, model: &str) -> Result<()> {
    if model.is_empty() || !provider.is_known(model).await? {
        return Err(CliError::invalid_model(input, model));
    }
    Ok(())
}

fn read_table<R: Read>(format: InputFormat, reader: R, name: &str) -> Result<Table> {
    match format {
        InputFormat::Json => read_json(reader, name),
        _ => read_csv(reader, name),
    }
}

fn dataset(model: String, source: String, table: Table) -> Result<Dataset> {
    info!(model = %model, source = %source, rows = table.len(), "Read input");
    Ok(Dataset::new(model, source, table)?)
}

async fn read_sheets(path: &Path, provider: &dyn MetadataProvider) -> Result<Vec<Dataset>> {
    let mut datasets = Vec::new();
    for (sheet, table) in read_workbook(path)? {
        let model = sheet.to_lowercase();
        if !provider.is_known(&model).await? {
            debug!(file = %path.display(), sheet = %sheet, "Sheet does not name a known model, skipping");
            continue;
        }
        datasets.push(dataset(model, format!("{}[{}]", path.display(), sheet), table)?);
    }
    Ok(datasets)
}
