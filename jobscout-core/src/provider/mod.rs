//! LLM provider abstraction layer.
//!
//! This module defines a common interface for model backends serving both
//! text generation and embeddings. The embedding and scoring services are
//! black boxes behind the [`Provider`] trait.

mod types;
pub mod ollama;

// Re-export common types
pub use types::{
    EmbedRequest,
    EmbedResponse,
    GenerateRequest,
    GenerateResponse,
    Provider,
    ProviderError,
    Result,
};

// Re-export provider implementations
pub use ollama::OllamaProvider;
