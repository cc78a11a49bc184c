use crate::analysis::StancePrompt;
use crate::domain::{ContributionId, StanceResult, Target, TargetMap};
use crate::ingestion::Contributions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub const TARGET_COLUMNS: [&str; 3] = ["Beitrags-ID", "Beitragstext", "Hauptaussagen"];
pub const STANCE_COLUMNS: [&str; 7] = [
    "Beitrags-ID",
    "Beitragstext",
    "Hauptaussage",
    "Kommentar-ID",
    "Kommentartext",
    "Haltung",
    "Begründung",
];

const DELIMITER: u8 = b';';

fn csv_writer<W: Write>(writer: W, header: &[&str]) -> Result<csv::Writer<W>> {
    let mut inner = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .from_writer(writer);
    inner.write_record(header)?;
    Ok(inner)
}

fn create_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Ordner {:?} kann nicht angelegt werden", parent))?;
    }
    File::create(path).with_context(|| format!("{:?} kann nicht geschrieben werden", path))
}

/// `Targets.csv`: one row per contribution, its targets joined by newlines.
pub struct TargetsWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl TargetsWriter<File> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_writer(create_file(path.as_ref())?)
    }
}

impl<W: Write> TargetsWriter<W> {
    pub fn from_writer(writer: W) -> Result<Self> {
        Ok(Self {
            inner: csv_writer(writer, &TARGET_COLUMNS)?,
        })
    }

    pub fn write(&mut self, id: &ContributionId, text: &str, targets: &[Target]) -> Result<()> {
        let joined = targets
            .iter()
            .map(Target::text)
            .collect::<Vec<_>>()
            .join("\n");
        self.inner
            .write_record([id.to_string().as_str(), text, joined.as_str()])?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        self.inner
            .into_inner()
            .map_err(|err| anyhow::anyhow!("CSV-Puffer konnte nicht geleert werden: {}", err))
    }
}

/// `Stance.csv`: one row per (target, comment) pair.
pub struct StanceWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl StanceWriter<File> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_writer(create_file(path.as_ref())?)
    }
}

impl<W: Write> StanceWriter<W> {
    pub fn from_writer(writer: W) -> Result<Self> {
        Ok(Self {
            inner: csv_writer(writer, &STANCE_COLUMNS)?,
        })
    }

    /// Writes and flushes one row so finished classifications survive an
    /// aborted run.
    pub fn write(
        &mut self,
        prompt: &StancePrompt,
        contribution_text: &str,
        result: &StanceResult,
    ) -> Result<()> {
        self.inner.write_record([
            prompt.contribution_id.to_string().as_str(),
            contribution_text,
            prompt.target.text(),
            prompt.comment_id.as_str(),
            prompt.comment_text.as_str(),
            result.label.as_str(),
            result.rationale.as_str(),
        ])?;
        self.inner.flush()?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        self.inner
            .into_inner()
            .map_err(|err| anyhow::anyhow!("CSV-Puffer konnte nicht geleert werden: {}", err))
    }
}

/// Writes every contribution, including those the model produced no targets for.
pub fn write_targets(
    path: impl AsRef<Path>,
    contributions: &Contributions,
    targets: &TargetMap,
) -> Result<usize> {
    let path = path.as_ref();
    let mut writer = TargetsWriter::create(path)?;
    for (id, text) in contributions {
        let found = targets.get(id).map(Vec::as_slice).unwrap_or_default();
        writer.write(id, text, found)?;
    }
    writer.finish()?;
    Ok(contributions.len())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetRow {
    #[serde(rename = "Beitrags-ID")]
    pub contribution_id: String,
    #[serde(rename = "Beitragstext")]
    pub contribution_text: String,
    #[serde(rename = "Hauptaussagen")]
    pub targets: String,
}

impl TargetRow {
    pub fn target_list(&self) -> Vec<&str> {
        self.targets.lines().filter(|l| !l.is_empty()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StanceRow {
    #[serde(rename = "Beitrags-ID")]
    pub contribution_id: String,
    #[serde(rename = "Beitragstext")]
    pub contribution_text: String,
    #[serde(rename = "Hauptaussage")]
    pub target: String,
    #[serde(rename = "Kommentar-ID")]
    pub comment_id: String,
    #[serde(rename = "Kommentartext")]
    pub comment_text: String,
    #[serde(rename = "Haltung")]
    pub stance: String,
    #[serde(rename = "Begründung")]
    pub rationale: String,
}

fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .from_path(path)
        .with_context(|| format!("{:?} kann nicht gelesen werden", path))?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row.with_context(|| format!("ungültige Zeile in {:?}", path))?);
    }
    Ok(rows)
}

pub fn read_targets(path: impl AsRef<Path>) -> Result<Vec<TargetRow>> {
    read_rows(path.as_ref())
}

pub fn read_stances(path: impl AsRef<Path>) -> Result<Vec<StanceRow>> {
    read_rows(path.as_ref())
}
