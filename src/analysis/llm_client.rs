use crate::config::{Backend, ClientConfig, GenerationParams};
use anyhow::{anyhow, Context, Result};
use parking_lot::Mutex;
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// A text-generation model. `generate` returns the prompt followed by the
/// model's continuation, so markers inside the prompt stay visible to the
/// response parsers.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;
}

pub fn build_generator(config: &ClientConfig) -> Result<Arc<dyn TextGenerator>> {
    let generator: Arc<dyn TextGenerator> = match config.backend {
        Backend::HuggingFace => Arc::new(HuggingFaceClient::new(config)?),
        Backend::Ollama => Arc::new(OllamaClient::new(config)?),
    };
    Ok(generator)
}

fn http_client(config: &ClientConfig) -> Result<HttpClient> {
    HttpClient::builder()
        .timeout(config.timeout)
        .build()
        .context("HTTP-Client konnte nicht initialisiert werden")
}

/// Client for the Hugging Face text-generation inference API.
pub struct HuggingFaceClient {
    url: String,
    token: String,
    http: HttpClient,
}

impl HuggingFaceClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            url: format!(
                "{}/{}",
                config.endpoint.trim_end_matches('/'),
                config.model_id
            ),
            token: config.api_token.clone(),
            http: http_client(config)?,
        })
    }
}

#[derive(Debug, Serialize)]
struct HfGenerateRequest<'a> {
    inputs: &'a str,
    parameters: HfParameters,
    options: HfOptions,
}

#[derive(Debug, Serialize)]
struct HfParameters {
    temperature: f32,
    max_new_tokens: u32,
    repetition_penalty: f32,
    return_full_text: bool,
    do_sample: bool,
}

#[derive(Debug, Serialize)]
struct HfOptions {
    wait_for_model: bool,
}

impl TextGenerator for HuggingFaceClient {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let payload = HfGenerateRequest {
            inputs: prompt,
            parameters: HfParameters {
                temperature: params.temperature,
                max_new_tokens: params.max_new_tokens,
                repetition_penalty: params.repetition_penalty,
                return_full_text: true,
                do_sample: params.temperature > 0.0,
            },
            options: HfOptions {
                wait_for_model: true,
            },
        };

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .context("HTTP-Aufruf an die Inference-API fehlgeschlagen")?
            .error_for_status()
            .context("die Inference-API hat einen Fehlerstatus geliefert")?;

        let raw: Value = response
            .json()
            .context("Antwort der Inference-API ist nicht lesbar")?;
        extract_generated_text(&raw)
    }
}

/// Pulls `generated_text` out of `[{"generated_text": ...}]` or a bare object.
pub fn extract_generated_text(value: &Value) -> Result<String> {
    let first = match value {
        Value::Array(items) => items
            .first()
            .ok_or_else(|| anyhow!("leere Antwort der Inference-API"))?,
        other => other,
    };
    if let Some(error) = first.get("error").and_then(Value::as_str) {
        return Err(anyhow!("Inference-API meldet: {}", error));
    }
    first
        .get("generated_text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Antwort enthält kein 'generated_text'"))
}

/// Client for a local Ollama server, used in raw completion mode.
pub struct OllamaClient {
    endpoint: String,
    model: String,
    http: HttpClient,
}

impl OllamaClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            endpoint: config.endpoint.clone(),
            model: config.model_id.clone(),
            http: http_client(config)?,
        })
    }
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    raw: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
    repeat_penalty: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl TextGenerator for OllamaClient {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let payload = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            raw: true,
            options: OllamaOptions {
                temperature: params.temperature,
                num_predict: params.max_new_tokens,
                repeat_penalty: params.repetition_penalty,
            },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .context("HTTP-Aufruf an den Ollama-Server fehlgeschlagen")?
            .error_for_status()
            .context("der Ollama-Server hat einen Fehlerstatus geliefert")?;

        let raw: OllamaGenerateResponse = response
            .json()
            .context("Antwort des Ollama-Servers ist nicht lesbar")?;
        Ok(format!("{}{}", prompt, raw.response))
    }
}

/// Replays queued continuations and records every prompt it receives.
#[derive(Clone, Default)]
pub struct MockTextGenerator {
    responses: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockTextGenerator {
    pub fn push_response(&self, continuation: impl Into<String>) {
        self.responses.lock().push_back(continuation.into());
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

impl TextGenerator for MockTextGenerator {
    fn generate(&self, prompt: &str, _: &GenerationParams) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        let continuation = self
            .responses
            .lock()
            .pop_front()
            .ok_or_else(|| anyhow!("keine Mock-Antwort verfügbar"))?;
        Ok(format!("{}{}", prompt, continuation))
    }
}
