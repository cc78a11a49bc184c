use super::llm_client::TextGenerator;
use super::prompt::{PromptBuilder, StancePrompt};
use super::response::{parse_stance, parse_targets};
use crate::config::{GenerationParams, OutputConfig};
use crate::domain::{Stance, StanceResult, TargetCategory, TargetMap};
use crate::export::{write_targets, StanceWriter};
use crate::ingestion::{Contributions, JoinedData};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs both generation stages one prompt at a time against a shared model.
pub struct StanceDetectionPipeline<G: TextGenerator + ?Sized> {
    generator: Arc<G>,
    prompts: PromptBuilder,
    params: GenerationParams,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub contributions: usize,
    pub targets: usize,
    pub stance_rows: usize,
    pub stances: HashMap<Stance, usize>,
}

impl<G: TextGenerator + ?Sized> StanceDetectionPipeline<G> {
    pub fn new(generator: Arc<G>, params: GenerationParams) -> Self {
        Self {
            generator,
            prompts: PromptBuilder::default(),
            params,
        }
    }

    /// Asks the model for the targets of every contribution.
    pub fn extract_targets(&self, contributions: &Contributions) -> Result<TargetMap> {
        let mut results = TargetMap::new();
        let total = contributions.len();
        let prompts = self.prompts.target_prompts(contributions);
        for (index, (id, prompt)) in prompts.into_iter().enumerate() {
            let generated = self
                .generator
                .generate(&prompt, &self.params)
                .with_context(|| format!("Hauptaussagen für Beitrag {} nicht ermittelt", id))?;
            let targets = parse_targets(&generated);
            debug!(
                contribution = %id,
                targets = targets.len(),
                progress = index + 1,
                total,
                "Hauptaussagen ermittelt"
            );
            results.entry(id).or_default().extend(targets);
        }

        let mut categories: HashMap<Option<TargetCategory>, usize> = HashMap::new();
        for target in results.values().flatten() {
            *categories.entry(target.category()).or_default() += 1;
        }
        info!(
            contributions = results.len(),
            problems = categories.get(&Some(TargetCategory::Problem)).copied().unwrap_or(0),
            praise = categories.get(&Some(TargetCategory::Praise)).copied().unwrap_or(0),
            suggestions = categories.get(&Some(TargetCategory::Suggestion)).copied().unwrap_or(0),
            untagged = categories.get(&None).copied().unwrap_or(0),
            "Hauptaussagen extrahiert"
        );
        Ok(results)
    }

    pub fn stance_prompts(&self, targets: &TargetMap, joined: &JoinedData) -> Vec<StancePrompt> {
        self.prompts.stance_prompts(targets, joined)
    }

    pub fn detect_stance(&self, prompt: &StancePrompt) -> Result<StanceResult> {
        let generated = self
            .generator
            .generate(&prompt.prompt, &self.params)
            .with_context(|| {
                format!(
                    "Haltung von Kommentar {} zu Beitrag {} nicht ermittelt",
                    prompt.comment_id, prompt.contribution_id
                )
            })?;
        Ok(parse_stance(&generated))
    }

    /// Full batch: targets for all contributions, `Targets.csv`, then one
    /// stance row per (target, comment) pair of the commented contributions.
    pub fn run(
        &self,
        contributions: &Contributions,
        joined: &JoinedData,
        output: &OutputConfig,
    ) -> Result<RunSummary> {
        let targets = self.extract_targets(contributions)?;
        write_targets(&output.targets_path, contributions, &targets)?;
        info!(file = %output.targets_path.display(), "Hauptaussagen gespeichert");

        let stance_prompts = self.stance_prompts(&targets, joined);
        info!(prompts = stance_prompts.len(), "Stance Detection gestartet");

        let mut summary = RunSummary {
            contributions: contributions.len(),
            targets: targets.values().map(Vec::len).sum(),
            ..RunSummary::default()
        };
        let mut writer = StanceWriter::create(&output.stance_path)?;
        let total = stance_prompts.len();
        for (index, prompt) in stance_prompts.iter().enumerate() {
            let result = self.detect_stance(prompt)?;
            let contribution_text = contributions
                .get(&prompt.contribution_id)
                .map(String::as_str)
                .unwrap_or_default();
            writer.write(prompt, contribution_text, &result)?;
            debug!(
                contribution = %prompt.contribution_id,
                comment = %prompt.comment_id,
                stance = %result.stance,
                progress = index + 1,
                total,
                "Haltung ermittelt"
            );
            *summary.stances.entry(result.stance).or_default() += 1;
            summary.stance_rows += 1;
        }
        writer.finish()?;
        info!(file = %output.stance_path.display(), rows = summary.stance_rows, "Haltungen gespeichert");
        Ok(summary)
    }
}
