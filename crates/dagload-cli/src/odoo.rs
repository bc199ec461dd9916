//! Odoo JSON-RPC binding
//!
//! Talks to `<url>/jsonrpc` with the `common` and `object` services: login
//! once, then `execute_kw` for `load`, `ir.model` lookups and `fields_get`.

use crate::config::Config;
use crate::error::{CliError, Result};
use async_trait::async_trait;
use dagload_core::{MetadataProvider, ModelMeta, RecordStore, RelationalField, WriteOutcome};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::OnceCell;
use tracing::debug;

/// Conventional self-reference field of hierarchical models
pub const PARENT_FIELD: &str = "parent_id";

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    message: String,
    #[serde(default)]
    data: Option<RpcErrorData>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorData {
    #[serde(default)]
    message: Option<String>,
}

impl RpcError {
    /// The server's own explanation when it sent one
    fn describe(self) -> String {
        match self.data.and_then(|d| d.message) {
            Some(detail) if !detail.is_empty() => detail,
            _ => self.message,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoadResponse {
    /// `false` when nothing was written
    #[serde(default)]
    ids: Value,
    #[serde(default)]
    messages: Vec<Value>,
}

impl From<LoadResponse> for WriteOutcome {
    fn from(res: LoadResponse) -> Self {
        let ids = match res.ids {
            Value::Array(ids) => ids.iter().filter_map(Value::as_i64).collect(),
            _ => Vec::new(),
        };
        let messages = res
            .messages
            .into_iter()
            .map(|m| match m {
                Value::String(s) => s,
                Value::Object(ref o) => o
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| m.to_string()),
                other => other.to_string(),
            })
            .collect();
        WriteOutcome { ids, messages }
    }
}

pub struct OdooClient {
    client: Client,
    config: Config,
    uid: OnceCell<i64>,
    request_id: AtomicU64,
    models: Mutex<HashMap<String, Option<ModelMeta>>>,
}

impl OdooClient {
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            config,
            uid: OnceCell::new(),
            request_id: AtomicU64::new(1),
            models: Mutex::new(HashMap::new()),
        })
    }

    async fn call(&self, service: &str, method: &str, args: Value) -> Result<Value> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": "call",
            "params": { "service": service, "method": method, "args": args },
            "id": id,
        });

        let response: RpcResponse = self
            .client
            .post(self.config.endpoint())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(CliError::rpc(err.describe()));
        }
        Ok(response.result.unwrap_or(Value::Null))
    }

    /// User id of the session, logging in on first use
    pub async fn uid(&self) -> Result<i64> {
        self.uid
            .get_or_try_init(|| async {
                let result = self
                    .call(
                        "common",
                        "login",
                        json!([self.config.db, self.config.user, self.config.password]),
                    )
                    .await?;
                let uid = result.as_i64().ok_or_else(|| CliError::Authentication {
                    user: self.config.user.clone(),
                    db: self.config.db.clone(),
                })?;
                debug!(uid, db = %self.config.db, "Logged in");
                Ok::<_, CliError>(uid)
            })
            .await
            .copied()
    }

    async fn execute_kw(&self, model: &str, method: &str, args: Value, kwargs: Value) -> Result<Value> {
        let uid = self.uid().await?;
        self.call(
            "object",
            "execute_kw",
            json!([self.config.db, uid, self.config.password, model, method, args, kwargs]),
        )
        .await
    }

    async fn fetch_model(&self, model: &str) -> Result<Option<ModelMeta>> {
        let found = self
            .execute_kw(
                "ir.model",
                "search_read",
                json!([[["model", "=", model]]]),
                json!({ "fields": ["name"] }),
            )
            .await?;
        let Some(record) = found.as_array().and_then(|r| r.first()) else {
            return Ok(None);
        };
        let display_label = record.get("name").and_then(Value::as_str).map(str::to_string);

        let fields = self
            .execute_kw(
                model,
                "fields_get",
                json!([]),
                json!({ "attributes": ["type", "relation", "string"] }),
            )
            .await?;

        let mut relational_fields: Vec<RelationalField> = fields
            .as_object()
            .into_iter()
            .flatten()
            .filter_map(|(name, attrs)| {
                let relation = attrs.get("relation").and_then(Value::as_str)?;
                (!relation.is_empty()).then(|| RelationalField {
                    name: name.clone(),
                    referenced_model: relation.to_string(),
                })
            })
            .collect();
        relational_fields.sort_by(|a, b| a.name.cmp(&b.name));

        let parent_field = relational_fields
            .iter()
            .any(|f| f.name == PARENT_FIELD && f.referenced_model == model)
            .then(|| PARENT_FIELD.to_string());

        debug!(
            model,
            relational = relational_fields.len(),
            parent = parent_field.as_deref().unwrap_or(""),
            "Fetched model metadata"
        );
        Ok(Some(ModelMeta {
            relational_fields,
            parent_field,
            display_label,
        }))
    }

    fn cached(&self, model: &str) -> Option<Option<ModelMeta>> {
        self.models.lock().ok()?.get(model).cloned()
    }
}

#[async_trait]
impl MetadataProvider for OdooClient {
    async fn resolve(&self, model: &str) -> dagload_common::Result<Option<ModelMeta>> {
        if let Some(meta) = self.cached(model) {
            return Ok(meta);
        }
        let meta = self.fetch_model(model).await?;
        if let Ok(mut models) = self.models.lock() {
            models.insert(model.to_string(), meta.clone());
        }
        Ok(meta)
    }
}

#[async_trait]
impl RecordStore for OdooClient {
    async fn write(&self, model: &str, fields: &[String], rows: &[Vec<String>]) -> dagload_common::Result<WriteOutcome> {
        let result = self.execute_kw(model, "load", json!([fields, rows]), json!({})).await?;
        let response: LoadResponse = serde_json::from_value(result).map_err(CliError::from)?;
        Ok(response.into())
    }
}
