//! Embedding generation using LLM providers.
//!
//! This module converts posting and profile text into vector embeddings
//! through the provider's embedding model.

use crate::provider::{Provider, ProviderError};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during embedding generation.
#[derive(Debug, Error)]
pub enum EmbedderError {
    /// The input text was empty or whitespace-only.
    #[error("Cannot embed empty text")]
    InvalidInput,

    /// The embedding service is unreachable or returned malformed output.
    #[error("Embedding service error: {0}")]
    Service(#[from] ProviderError),
}

/// Result type for embedding operations.
pub type Result<T> = std::result::Result<T, EmbedderError>;

/// Generates vector embeddings for text using a provider embedding model.
///
/// Similar texts yield vectors with high cosine similarity. The embedder
/// performs exactly one provider call per invocation and never retries on
/// its own; the caller owns the retry policy.
#[derive(Clone)]
pub struct Embedder {
    provider: Arc<dyn Provider>,
    model: String,
}

impl Embedder {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Generates a vector embedding for the given text.
    ///
    /// The text is normalized before the call: non-ASCII characters are
    /// stripped and whitespace runs collapse to single spaces, so cosmetic
    /// differences in the source text do not produce distinct vectors.
    ///
    /// # Errors
    ///
    /// - [`EmbedderError::InvalidInput`] if the text is empty or
    ///   whitespace-only (also after normalization).
    /// - [`EmbedderError::Service`] if the provider is unreachable or
    ///   returns no embedding.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let text = normalize(text);
        if text.is_empty() {
            return Err(EmbedderError::InvalidInput);
        }

        let embedding = self.provider.embed(&text, &self.model).await?;

        if embedding.is_empty() {
            return Err(EmbedderError::Service(ProviderError::Other(
                "No embeddings returned".to_string(),
            )));
        }

        Ok(embedding)
    }
}

/// Strips non-ASCII characters and collapses whitespace runs to single spaces.
fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Provider for CountingProvider {
        async fn generate(
            &self,
            _request: crate::provider::GenerateRequest,
        ) -> crate::provider::Result<crate::provider::GenerateResponse> {
            Err(ProviderError::Other("not a generation test".to_string()))
        }

        async fn embed(&self, _text: &str, _model: &str) -> crate::provider::Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0.1, 0.2, 0.3])
        }
    }

    #[test]
    fn test_normalize_strips_non_ascii() {
        assert_eq!(normalize("Zürich  based\trole"), "Zrich based role");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  senior \n rust   engineer "), "senior rust engineer");
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected_without_a_service_call() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let embedder = Embedder::new(provider.clone(), "nomic-embed-text");

        let err = embedder.embed("   \n\t ").await.unwrap_err();
        assert!(matches!(err, EmbedderError::InvalidInput));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_embed_delegates_to_provider() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let embedder = Embedder::new(provider.clone(), "nomic-embed-text");

        let vector = embedder.embed("rust engineer").await.unwrap();
        assert_eq!(vector.len(), 3);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
