use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Reads the access token for the model hub. Surrounding whitespace is
/// ignored; an empty file is an error.
pub fn load_api_key(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    if !path.exists() {
        bail!(
            "Die API-Key-Datei '{}' konnte nicht gefunden werden.",
            path.display()
        );
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("API-Key-Datei {:?} ist nicht lesbar", path))?;
    let key = raw.trim();
    if key.is_empty() {
        bail!("API-Key-Datei {:?} ist leer", path);
    }
    Ok(key.to_string())
}
