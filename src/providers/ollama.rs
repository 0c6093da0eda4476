use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{decode_entries, encode_entries, Provider, TranslationRequest};

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// Model used for generation
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// System prompt sent with every request
    system_prompt: String,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    stream: bool,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: false,
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(temperature),
        });
        self
    }
}

impl Ollama {
    /// Create a new Ollama client from the endpoint URL, e.g. `http://localhost:11434`
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        let base_url = endpoint.into().trim_end_matches('/').to_string();

        Self {
            base_url,
            model: model.into(),
            temperature: 0.3,
            system_prompt: String::new(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                // Ollama speaks HTTP/1.1
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Prompt asking for a marker-preserving translation of `request`
    pub fn build_prompt(request: &TranslationRequest) -> String {
        format!(
            "Translate the subtitle lines below from {} to {}.\n\
             Keep every <<ENTRY_n>> marker and the final <<END>> marker exactly as they are, \
             one translated line after each marker, and keep any <...> tags untouched.\n\n{}",
            request.source_language,
            request.target_language,
            encode_entries(&request.lines)
        )
    }

    /// Generate text from the Ollama API with retry logic
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let mut attempt = 0;

        loop {
            let outcome = match self.client.post(&url).json(request).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response
                            .text()
                            .await
                            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
                        return serde_json::from_str::<GenerationResponse>(&body).map_err(|e| {
                            error!("Failed to parse Ollama API response: {}", e);
                            ProviderError::ParseError(e.to_string())
                        });
                    }

                    let message = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to get error response text".to_string());
                    let api_error = ProviderError::ApiError {
                        status_code: status.as_u16(),
                        message,
                    };
                    // Client errors will not get better on retry
                    if !status.is_server_error() {
                        error!("Ollama API error: {}", api_error);
                        return Err(api_error);
                    }
                    api_error
                }
                Err(e) => ProviderError::RequestFailed(e.to_string()),
            };

            attempt += 1;
            if attempt > self.max_retries {
                return Err(outcome);
            }

            error!("{} - attempt {}/{}", outcome, attempt, self.max_retries + 1);
            tokio::time::sleep(Duration::from_millis(self.backoff_ms(attempt))).await;
        }
    }

    /// Delay before retry `attempt` (1-based): the base doubled per earlier
    /// retry, saturating instead of overflowing
    fn backoff_ms(&self, attempt: u32) -> u64 {
        let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        self.backoff_base_ms.saturating_mul(factor)
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn translate(&self, request: &TranslationRequest) -> Result<Vec<String>, ProviderError> {
        let mut generation = GenerationRequest::new(&self.model, Self::build_prompt(request)).temperature(self.temperature);
        if !self.system_prompt.is_empty() {
            generation = generation.system(&self.system_prompt);
        }

        let response = self.generate(&generation).await?;
        debug!(
            "Ollama answered {} lines with {} tokens",
            request.lines.len(),
            response.eval_count.unwrap_or_default()
        );
        decode_entries(&response.response, request.lines.len())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::ConnectionError(format!(
                "Ollama answered {} on {}",
                response.status(),
                url
            )))
        }
    }
}
