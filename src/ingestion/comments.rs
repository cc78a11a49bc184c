use crate::domain::{Comment, CommentId, ContributionId};
use crate::utils::unescape_html;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct RawComment {
    #[serde(default)]
    related_node_id: Option<Value>,
    #[serde(default)]
    text: Option<String>,
}

pub struct CommentLoader;

impl CommentLoader {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Vec<Comment>> {
        let path = path.as_ref();
        if !path.exists() {
            bail!(
                "Die Kommentar-Datei '{}' konnte nicht gefunden werden.",
                path.display()
            );
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("Kommentar-Datei {:?} ist nicht lesbar", path))?;
        let comments = Self::parse_str(&data)
            .with_context(|| format!("ungültiges JSON in {:?}", path))?;
        info!(file = %path.display(), comments = comments.len(), "Kommentare geladen");
        Ok(comments)
    }

    /// Parses a list of single-key records `{"<comment id>": {...}}`.
    /// `null` entries are skipped; a repeated comment id replaces the earlier
    /// record in place.
    pub fn parse_str(data: &str) -> Result<Vec<Comment>> {
        let records: Vec<Value> = serde_json::from_str(data)?;
        let mut comments: Vec<Comment> = Vec::with_capacity(records.len());
        let mut positions: HashMap<CommentId, usize> = HashMap::new();

        for (index, record) in records.into_iter().enumerate() {
            let object = match record {
                Value::Null => continue,
                Value::Object(object) => object,
                other => bail!(
                    "Kommentar-Eintrag {} ist kein Objekt, sondern {}",
                    index,
                    json_kind(&other)
                ),
            };
            let Some((comment_id, payload)) = object.into_iter().next() else {
                bail!("Kommentar-Eintrag {} ist leer", index);
            };
            let raw: RawComment = serde_json::from_value(payload)
                .with_context(|| format!("Kommentar {} hat ein unerwartetes Format", comment_id))?;

            let comment = Comment {
                id: CommentId::new(comment_id),
                contribution_id: raw
                    .related_node_id
                    .as_ref()
                    .map(ContributionId::from_json)
                    .unwrap_or_else(|| ContributionId::Text(String::new())),
                text: raw
                    .text
                    .map(|text| unescape_html(&text))
                    .unwrap_or_default(),
            };

            match positions.get(&comment.id) {
                Some(&position) => comments[position] = comment,
                None => {
                    positions.insert(comment.id.clone(), comments.len());
                    comments.push(comment);
                }
            }
        }

        Ok(comments)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
