use anyhow::{anyhow, Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MODEL_ID: &str = "mistralai/Mixtral-8x7B-Instruct-v0.1";
pub const DEFAULT_HF_ENDPOINT: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://127.0.0.1:11434/api/generate";
pub const DEFAULT_TARGETS_FILE: &str = "Targets.csv";
pub const DEFAULT_STANCE_FILE: &str = "Stance.csv";

/// Sampling settings sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_new_tokens: u32,
    pub repetition_penalty: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_new_tokens: 500,
            repetition_penalty: 1.1,
        }
    }
}

impl GenerationParams {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.max(0.0);
        self
    }

    pub fn with_max_new_tokens(mut self, max_new_tokens: u32) -> Self {
        self.max_new_tokens = max_new_tokens.max(1);
        self
    }

    pub fn with_repetition_penalty(mut self, penalty: f32) -> Self {
        self.repetition_penalty = penalty;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    HuggingFace,
    Ollama,
}

impl Backend {
    pub fn default_endpoint(self) -> &'static str {
        match self {
            Backend::HuggingFace => DEFAULT_HF_ENDPOINT,
            Backend::Ollama => DEFAULT_OLLAMA_ENDPOINT,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::HuggingFace => write!(f, "huggingface"),
            Backend::Ollama => write!(f, "ollama"),
        }
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(Backend::HuggingFace),
            "ollama" => Ok(Backend::Ollama),
            _ => Err(anyhow!("unbekanntes Backend: {} (huggingface oder ollama)", s)),
        }
    }
}

/// Connection settings for the text-generation backend.
#[derive(Clone)]
pub struct ClientConfig {
    pub backend: Backend,
    pub endpoint: String,
    pub model_id: String,
    pub api_token: String,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(backend: Backend, model_id: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            backend,
            endpoint: backend.default_endpoint().to_string(),
            model_id: model_id.into(),
            api_token: api_token.into(),
            timeout: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("backend", &self.backend)
            .field("endpoint", &self.endpoint)
            .field("model_id", &self.model_id)
            .field("api_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub targets_path: PathBuf,
    pub stance_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            targets_path: PathBuf::from(DEFAULT_TARGETS_FILE),
            stance_path: PathBuf::from(DEFAULT_STANCE_FILE),
        }
    }
}

impl OutputConfig {
    pub fn with_targets_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.targets_path = path.into();
        self
    }

    pub fn with_stance_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stance_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_defaults() {
        let params = GenerationParams::default();
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.max_new_tokens, 500);
        assert_eq!(params.repetition_penalty, 1.1);
        assert_eq!(params.with_max_new_tokens(0).max_new_tokens, 1);
    }

    #[test]
    fn backend_parsing_and_endpoints() {
        assert_eq!("HF".parse::<Backend>().unwrap(), Backend::HuggingFace);
        assert_eq!("ollama".parse::<Backend>().unwrap(), Backend::Ollama);
        assert!("openai".parse::<Backend>().is_err());

        let config = ClientConfig::new(Backend::Ollama, "qwen3", "");
        assert_eq!(config.endpoint, DEFAULT_OLLAMA_ENDPOINT);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn debug_output_hides_token() {
        let config = ClientConfig::new(Backend::HuggingFace, DEFAULT_MODEL_ID, "hf_secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hf_secret"));
    }
}
