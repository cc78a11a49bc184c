use crate::domain::{Contribution, ContributionId};
use anyhow::{anyhow, bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

pub const ID_COLUMN: &str = "contribution_id";
pub const CONTENT_COLUMN: &str = "contribution_content";

/// Contribution texts keyed and ordered by id.
pub type Contributions = BTreeMap<ContributionId, String>;

pub struct ContributionLoader;

impl ContributionLoader {
    /// Reads the first worksheet of a spreadsheet, or a delimited text file
    /// when the extension is `.csv`.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Contributions> {
        let path = path.as_ref();
        if !path.exists() {
            bail!(
                "Die Beitrags-Datei '{}' konnte nicht gefunden werden.",
                path.display()
            );
        }

        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        let rows = if is_csv {
            read_csv(path)?
        } else {
            read_spreadsheet(path)?
        };

        let total = rows.len();
        let contributions = collect(rows);
        if contributions.len() < total {
            warn!(
                rows = total,
                unique = contributions.len(),
                "doppelte Beitrags-IDs, spätere Zeilen überschreiben frühere"
            );
        }
        info!(file = %path.display(), contributions = contributions.len(), "Beiträge geladen");
        Ok(contributions)
    }
}

fn collect(rows: Vec<Contribution>) -> Contributions {
    rows.into_iter().map(|row| (row.id, row.text)).collect()
}

fn locate_columns<'a>(header: impl Iterator<Item = &'a str>) -> Result<(usize, usize)> {
    let mut id_col = None;
    let mut content_col = None;
    for (index, name) in header.enumerate() {
        match name.trim() {
            ID_COLUMN if id_col.is_none() => id_col = Some(index),
            CONTENT_COLUMN if content_col.is_none() => content_col = Some(index),
            _ => {}
        }
    }
    let id_col = id_col.ok_or_else(|| anyhow!("Spalte '{}' fehlt", ID_COLUMN))?;
    let content_col = content_col.ok_or_else(|| anyhow!("Spalte '{}' fehlt", CONTENT_COLUMN))?;
    Ok((id_col, content_col))
}

fn read_spreadsheet(path: &Path) -> Result<Vec<Contribution>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Tabelle {:?} kann nicht geöffnet werden", path))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Tabelle {:?} enthält kein Arbeitsblatt", path))?
        .with_context(|| format!("Arbeitsblatt in {:?} ist nicht lesbar", path))?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| anyhow!("Tabelle {:?} ist leer", path))?
        .iter()
        .map(cell_text)
        .collect();
    let (id_col, content_col) = locate_columns(header.iter().map(String::as_str))
        .with_context(|| format!("ungültige Kopfzeile in {:?}", path))?;

    let mut contributions = Vec::new();
    for (line, row) in rows.enumerate() {
        let id_cell = row.get(id_col).unwrap_or(&Data::Empty);
        if matches!(id_cell, Data::Empty) {
            warn!(row = line + 2, "Zeile ohne Beitrags-ID übersprungen");
            continue;
        }
        contributions.push(Contribution {
            id: cell_id(id_cell),
            text: row.get(content_col).map(cell_text).unwrap_or_default(),
        });
    }
    Ok(contributions)
}

fn cell_id(cell: &Data) -> ContributionId {
    match cell {
        Data::Int(value) => ContributionId::Numeric(*value),
        Data::Float(value) => ContributionId::from_float(*value),
        Data::String(value) => ContributionId::parse(value),
        other => ContributionId::parse(&other.to_string()),
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        other => other.to_string(),
    }
}

fn read_csv(path: &Path) -> Result<Vec<Contribution>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Beitrags-Datei {:?} ist nicht lesbar", path))?;
    parse_csv(&raw).with_context(|| format!("ungültige CSV-Datei {:?}", path))
}

fn parse_csv(raw: &str) -> Result<Vec<Contribution>> {
    let first_line = raw.lines().next().unwrap_or_default();
    let delimiter = if first_line.contains(';') { b';' } else { b',' };
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(raw.trim_start_matches('\u{feff}').as_bytes());

    let header = reader.headers()?.clone();
    let (id_col, content_col) = locate_columns(header.iter())?;

    let mut contributions = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let raw_id = record.get(id_col).unwrap_or_default();
        if raw_id.trim().is_empty() {
            warn!(row = line + 2, "Zeile ohne Beitrags-ID übersprungen");
            continue;
        }
        contributions.push(Contribution {
            id: ContributionId::parse(raw_id),
            text: record.get(content_col).unwrap_or_default().to_string(),
        });
    }
    Ok(contributions)
}
