//! Example maps served to the client's gallery, one JSON document per file.

use serde::Serialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;

const NO_DESCRIPTION: &str = "No description available";

#[derive(Debug, Clone, Serialize)]
pub struct ExampleMap {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub data: Value,
}

impl ExampleMap {
    /// `title`, `description` and `thumbnail` are read from the top level first, then
    /// from a nested `meta` object.
    pub fn from_document(id: &str, data: Value) -> Self {
        let field = |key: &str| -> Option<String> {
            let top = data.get(key).and_then(Value::as_str);
            let meta = || data.get("meta").and_then(|m| m.get(key)).and_then(Value::as_str);
            top.filter(|s| !s.is_empty())
                .or_else(|| meta().filter(|s| !s.is_empty()))
                .map(str::to_string)
        };

        let title = field("title").unwrap_or_else(|| id.to_string());
        let description = field("description").unwrap_or_else(|| NO_DESCRIPTION.to_string());
        let thumbnail = field("thumbnail");

        Self {
            id: id.to_string(),
            title,
            description,
            thumbnail,
            data,
        }
    }
}

/// Load every `*.json` document in `dir`, sorted by id. A missing directory is an empty
/// gallery; unreadable or unparsable files are skipped.
pub async fn load_examples(dir: &Path) -> std::io::Result<Vec<ExampleMap>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("Examples directory not found: path={}", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut examples = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read example: path={}, error={}", path.display(), e);
                continue;
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(data) => examples.push(ExampleMap::from_document(id, data)),
            Err(e) => {
                tracing::warn!("Skipping unparsable example: path={}, error={}", path.display(), e);
            }
        }
    }

    examples.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(examples)
}
