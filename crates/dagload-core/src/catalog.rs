//! File-based metadata catalog
//!
//! An offline [`MetadataProvider`] for stores whose schema cannot be
//! introspected, and for tests:
//!
//! ```toml
//! [models."res.partner"]
//! label = "Contact"
//! parent = "parent_id"
//! relations = { country_id = "res.country", parent_id = "res.partner" }
//! ```

use crate::metadata::{MetadataProvider, ModelMeta, RelationalField};
use async_trait::async_trait;
use dagload_common::{LoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogModel {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    /// Field name -> referenced model
    #[serde(default)]
    pub relations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub models: BTreeMap<String, CatalogModel>,
}

impl Catalog {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let catalog: Catalog =
            toml::from_str(content).map_err(|e| LoadError::config(format!("invalid catalog: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| LoadError::config(format!("{}: {e}", path.display())))
    }

    /// A declared parent must be a relation back to the model itself
    fn validate(&self) -> Result<()> {
        for (name, model) in &self.models {
            if let Some(ref parent) = model.parent {
                if model.relations.get(parent) != Some(name) {
                    return Err(LoadError::config(format!(
                        "model {name}: parent field '{parent}' must be listed in relations as \"{name}\""
                    )));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataProvider for Catalog {
    async fn resolve(&self, model: &str) -> Result<Option<ModelMeta>> {
        Ok(self.models.get(model).map(|entry| ModelMeta {
            relational_fields: entry
                .relations
                .iter()
                .map(|(name, referenced)| RelationalField {
                    name: name.clone(),
                    referenced_model: referenced.clone(),
                })
                .collect(),
            parent_field: entry.parent.clone(),
            display_label: entry.label.clone(),
        }))
    }
}
