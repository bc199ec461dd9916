//! Model metadata and column enrichment

use crate::column::parse_header;
use crate::dataset::Dataset;
use async_trait::async_trait;
use dagload_common::{LoadError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A field of a model that points at records of another model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationalField {
    pub name: String,
    pub referenced_model: String,
}

/// What the loader needs to know about a model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMeta {
    pub relational_fields: Vec<RelationalField>,
    /// Field expressing the model's own hierarchy, e.g. `parent_id`
    pub parent_field: Option<String>,
    /// Human-readable model name for diagnostics
    pub display_label: Option<String>,
}

impl ModelMeta {
    pub fn referenced_model(&self, field: &str) -> Option<&str> {
        self.relational_fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| f.referenced_model.as_str())
    }
}

/// Source of model metadata, typically the record store's schema
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Describe `model`, or `None` when the provider does not know it
    async fn resolve(&self, model: &str) -> Result<Option<ModelMeta>>;

    /// Whether `model` can be loaded at all
    async fn is_known(&self, model: &str) -> Result<bool> {
        Ok(self.resolve(model).await?.is_some())
    }
}

/// Resolve a dataset's headers into column descriptors
///
/// Fails on unknown models and on nested subfield notation.
pub async fn enrich(dataset: &mut Dataset, provider: &dyn MetadataProvider) -> Result<()> {
    let meta = provider
        .resolve(dataset.model())
        .await?
        .ok_or_else(|| LoadError::UnknownModel(dataset.model().to_string()))?;

    let mut columns = Vec::with_capacity(dataset.headers().len());
    for header in dataset.headers() {
        let mut column = parse_header(dataset.model(), header)?;
        column.references = meta.referenced_model(&column.name).map(str::to_string);
        columns.push(column);
    }

    debug!(
        model = dataset.model(),
        columns = columns.len(),
        relational = columns.iter().filter(|c| c.is_relational()).count(),
        parent = meta.parent_field.as_deref().unwrap_or(""),
        "Resolved dataset columns"
    );

    dataset.apply_metadata(columns, meta.parent_field, meta.display_label);
    Ok(())
}
