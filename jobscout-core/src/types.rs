//! Core data types shared across the pipeline.

use serde::{Deserialize, Serialize};

/// A job posting loaded from the tabular source.
///
/// Postings are read-only inputs for a run. The `id` must be unique within
/// a run; duplicate ids are rejected by the pipeline before any service
/// call is made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub url: String,
    pub location: String,
    pub date: String,
    pub applicants: String,
    pub description: String,
    pub company: String,
}

impl JobPosting {
    /// The text a posting's embedding is computed from: title, description
    /// and company name.
    ///
    /// The content hash stored next to the vector is taken over this exact
    /// text, so a change to any of the three fields invalidates the cached
    /// embedding.
    pub fn embedding_text(&self) -> String {
        format!("{}\n{}\n{}", self.title, self.description, self.company)
    }
}

/// A posting id with its cosine similarity to the profile, as ranked by the
/// retriever. Higher similarity ranks first.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPosting {
    pub id: String,
    pub similarity: f32,
}

/// The structured verdict parsed from the LLM's response.
///
/// `suitability` is on a 0-100 scale with 100 most suitable. The two
/// summaries are each at most one paragraph; `match_summary` is guaranteed
/// non-empty by the parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub suitability: u8,
    pub job_summary: String,
    pub match_summary: String,
}
