use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use stance::analysis::{build_generator, StanceDetectionPipeline};
use stance::config::{
    Backend, ClientConfig, GenerationParams, OutputConfig, DEFAULT_MODEL_ID, DEFAULT_STANCE_FILE,
    DEFAULT_TARGETS_FILE,
};
use stance::ingestion::{
    join_contributions_comments, load_api_key, CommentLoader, ContributionLoader,
};

#[derive(Parser)]
#[command(
    name = "stance",
    version,
    about = "Ermittelt Hauptaussagen in Beiträgen und die Haltung der Kommentare dazu",
    long_about = None
)]
struct Cli {
    /// Spreadsheet or CSV with contribution_id / contribution_content
    contributions_file: PathBuf,
    /// JSON list of comments
    comments_file: PathBuf,
    /// File holding the model-hub access token
    api_key_file: PathBuf,
    #[arg(default_value = DEFAULT_MODEL_ID)]
    model_id: String,
    #[arg(long, env = "STANCE_BACKEND", default_value = "huggingface")]
    backend: Backend,
    /// Overrides the backend's default endpoint
    #[arg(long, env = "STANCE_ENDPOINT")]
    endpoint: Option<String>,
    #[arg(long, env = "STANCE_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,
    #[arg(long, env = "STANCE_MAX_NEW_TOKENS", default_value_t = 500)]
    max_new_tokens: u32,
    #[arg(long, env = "STANCE_REPETITION_PENALTY", default_value_t = 1.1)]
    repetition_penalty: f32,
    /// Request timeout; no timeout when unset
    #[arg(long, env = "STANCE_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
    #[arg(long, default_value = DEFAULT_TARGETS_FILE)]
    targets_output: PathBuf,
    #[arg(long, default_value = DEFAULT_STANCE_FILE)]
    stance_output: PathBuf,
    #[arg(long, env = "STANCE_LOG", default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let contributions = ContributionLoader::load_from_path(&cli.contributions_file)?;
    let comments = CommentLoader::load_from_path(&cli.comments_file)?;
    let joined = join_contributions_comments(&contributions, &comments);

    let api_token =
        load_api_key(&cli.api_key_file).context("API-Schlüssel konnte nicht geladen werden.")?;

    let client_config = ClientConfig::new(cli.backend, &cli.model_id, api_token)
        .with_timeout(cli.timeout_secs.map(Duration::from_secs));
    let client_config = match cli.endpoint {
        Some(endpoint) => client_config.with_endpoint(endpoint),
        None => client_config,
    };
    info!(backend = %client_config.backend, model = %client_config.model_id, endpoint = %client_config.endpoint, "Modell verbunden");
    let generator = build_generator(&client_config)?;

    let params = GenerationParams::default()
        .with_temperature(cli.temperature)
        .with_max_new_tokens(cli.max_new_tokens)
        .with_repetition_penalty(cli.repetition_penalty);
    let output = OutputConfig::default()
        .with_targets_path(cli.targets_output)
        .with_stance_path(cli.stance_output);

    let pipeline = StanceDetectionPipeline::new(generator, params);
    let summary = pipeline.run(&contributions, &joined, &output)?;
    info!(
        contributions = summary.contributions,
        targets = summary.targets,
        rows = summary.stance_rows,
        stances = ?summary.stances,
        "Stance Detection abgeschlossen"
    );

    Ok(())
}
