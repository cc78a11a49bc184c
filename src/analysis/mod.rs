mod llm_client;
mod pipeline;
mod prompt;
mod response;

pub use llm_client::{
    build_generator, extract_generated_text, HuggingFaceClient, MockTextGenerator, OllamaClient,
    TextGenerator,
};
pub use pipeline::{RunSummary, StanceDetectionPipeline};
pub use prompt::{PromptBuilder, PromptTemplate, StancePrompt, STANCE_MARKER, TARGET_MARKER};
pub use response::{parse_stance, parse_targets};
