//! jobscout-core - job posting retrieval and scoring pipeline
//!
//! Matches job postings against a free-text candidate profile in two
//! stages: semantic retrieval over embedding vectors, then LLM scoring of
//! the retrieved postings.
//!
//! - Provider abstraction over the model server (Ollama) for embeddings
//!   and completions
//! - Durable vector index with content-hash-gated incremental embedding
//! - Cosine top-N retrieval with deterministic tie-breaking
//! - Concurrent, failure-isolated LLM scoring with bounded retries
//! - Run orchestration with per-posting degradation and cancellation
//!
//! ## Primary API
//!
//! Build a [`Pipeline`] from a [`Config`] and a provider, then call
//! [`Pipeline::run`] with the profile text and the postings for this run.

// Public modules
pub mod config;
pub mod embedding;
pub mod pipeline;
pub mod provider;
pub mod retriever;
pub mod scoring;
pub mod store;
pub mod types;

// Public exports
pub use config::Config;
pub use embedding::Embedder;
pub use pipeline::{MatchResult, Pipeline, PipelineError, RunReport, SkippedPosting};
pub use scoring::{ScoreFailure, ScoreOutcome, Scorer};
pub use store::VectorIndex;
pub use types::{JobPosting, RankedPosting, Verdict};

// Provider exports
pub use provider::{GenerateRequest, GenerateResponse, OllamaProvider, Provider, ProviderError};
