//! The load command

use crate::config::Config;
use crate::error::Result;
use crate::input::{read_inputs, Input};
use crate::odoo::OdooClient;
use crate::Cli;
use dagload_common::LoadError;
use dagload_core::{Catalog, DedupLog, LoadPipeline, MetadataProvider, RunSummary};
use tracing::info;

pub async fn run(cli: &Cli) -> Result<RunSummary> {
    let inputs: Vec<Input> = cli
        .files
        .iter()
        .cloned()
        .map(Input::File)
        .chain(Input::streams(&cli.streams))
        .collect();
    if inputs.is_empty() {
        return Err(LoadError::NoInput.into());
    }

    let config = Config::from_cli(cli)?;
    info!(url = %config.url, db = %config.db, user = %config.user, "Target server");
    let client = OdooClient::new(config)?;

    let catalog = cli.catalog.as_deref().map(Catalog::load).transpose()?;
    let provider: &dyn MetadataProvider = match catalog {
        Some(ref catalog) => catalog,
        None => &client,
    };

    let datasets = read_inputs(&inputs, provider).await?;
    let mut log = DedupLog::open(&cli.out)?;

    let pipeline = LoadPipeline::new(provider, &client)
        .batch_size(cli.batch)
        .progress(cli.progress);
    let mut graph = pipeline.plan(datasets, &log).await?;

    // Bad credentials or an unreachable server abort here, not per batch
    client.uid().await?;

    let summary = pipeline.execute(&mut graph, &mut log).await?;
    Ok(summary)
}
