use crate::config::HuggingFaceConfig;
use crate::traits::SourceAdapter;
use crate::types::{AggregatorError, Model, ModelsSnapshot, Parsed, Result};
use crate::utils::text::date_prefix;
use crate::Fetcher;
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

const MAX_TAGS: usize = 5;

/// Most-downloaded models for one task from the Hugging Face model API.
pub struct HuggingFaceSource {
    fetcher: Arc<Fetcher>,
    config: HuggingFaceConfig,
}

impl HuggingFaceSource {
    pub fn new(fetcher: Arc<Fetcher>, config: HuggingFaceConfig) -> Self {
        Self { fetcher, config }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("sort", "downloads".to_string()),
            ("direction", "-1".to_string()),
            ("limit", self.config.limit.to_string()),
            ("filter", self.config.task.clone()),
        ]
    }
}

#[async_trait]
impl SourceAdapter for HuggingFaceSource {
    type Snapshot = ModelsSnapshot;

    fn source_name(&self) -> &'static str {
        "HuggingFace"
    }

    fn files(&self) -> &'static [&'static str] {
        &["huggingface.json"]
    }

    async fn acquire(&self) -> Result<Option<ModelsSnapshot>> {
        info!("Fetching HuggingFace models");

        let body = match self.fetcher.fetch(&self.config.api_url, &self.query(), None).await {
            Some(body) => body,
            None => return Ok(None),
        };

        let parsed = parse_models(&body)?;
        parsed.log_issues(self.source_name());

        Ok(Some(ModelsSnapshot {
            updated: Utc::now(),
            models: parsed.into_records(),
        }))
    }
}

#[derive(Debug, Deserialize)]
struct RawModel {
    #[serde(default)]
    id: String,
    #[serde(default)]
    downloads: Option<u64>,
    #[serde(default)]
    likes: Option<u64>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default, rename = "lastModified")]
    last_modified: Option<String>,
}

/// Parse the model list. The body must be a JSON array; entries that do not
/// match the expected shape are skipped.
pub fn parse_models(content: &str) -> Result<Parsed<Model>> {
    let items: Vec<serde_json::Value> = serde_json::from_str(content)?;
    Ok(Parsed::from_results(items.into_iter().map(parse_model)))
}

fn parse_model(item: serde_json::Value) -> Result<Model> {
    let raw: RawModel = serde_json::from_value(item)?;
    if raw.id.is_empty() {
        return Err(AggregatorError::Parse("model has no id".to_string()));
    }

    let (author, name) = split_model_id(&raw.id);
    Ok(Model {
        link: format!("https://huggingface.co/{}", raw.id),
        author,
        name,
        downloads: raw.downloads.unwrap_or(0),
        likes: raw.likes.unwrap_or(0),
        tags: raw.tags.unwrap_or_default().into_iter().take(MAX_TAGS).collect(),
        updated: raw.last_modified.as_deref().map(date_prefix).unwrap_or_default(),
        id: raw.id,
    })
}

/// Split `author/name`: author before the first `/`, name after the last.
/// A bare name has an empty author.
pub fn split_model_id(id: &str) -> (String, String) {
    match (id.split_once('/'), id.rsplit_once('/')) {
        (Some((author, _)), Some((_, name))) => (author.to_string(), name.to_string()),
        _ => (String::new(), id.to_string()),
    }
}
