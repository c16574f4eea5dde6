//! Ollama provider implementation.
//!
//! This module provides an Ollama HTTP API client that implements the
//! Provider trait. Completions go through `/api/generate` with streaming
//! disabled; embeddings go through `/api/embed`.

use super::types::*;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ollama HTTP API provider.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    base_url: String,
    http_client: reqwest::Client,
}

impl OllamaProvider {
    /// Creates a new Ollama provider for the given server base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let url = format!("{}/api/generate", self.base_url);

        // Convert to Ollama-specific request format
        let ollama_request = OllamaGenerateRequest {
            model: request.model,
            prompt: request.prompt,
            stream: false,
            options: {
                let mut opts = HashMap::new();
                opts.insert(
                    "temperature".to_string(),
                    serde_json::json!(request.temperature),
                );
                opts.insert(
                    "num_predict".to_string(),
                    serde_json::json!(request.max_tokens),
                );
                Some(opts)
            },
        };

        let response = self
            .http_client
            .post(&url)
            .json(&ollama_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(ProviderError::Api(error_text));
        }

        let ollama_response = response.json::<OllamaGenerateResponse>().await?;

        Ok(GenerateResponse {
            model: ollama_response.model,
            response: ollama_response.response,
            done: ollama_response.done,
        })
    }

    async fn embed(&self, text: &str, model: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embed", self.base_url);

        let embed_request = EmbedRequest {
            model: model.to_string(),
            input: text.to_string(),
        };

        let response = self
            .http_client
            .post(&url)
            .json(&embed_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(ProviderError::Api(error_text));
        }

        let embed_response = response.json::<EmbedResponse>().await?;

        embed_response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Other("No embeddings returned".to_string()))
    }
}

// Ollama-specific request/response types (internal)

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaGenerateResponse {
    model: String,
    #[serde(default)]
    created_at: String,
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    done_reason: Option<String>,
}
