//! Run orchestration: embed the profile, sync the vector index, retrieve
//! the top postings, score them, assemble the report.
//!
//! A run degrades per posting wherever it can: an embedding failure skips
//! that posting, a scoring failure marks that posting, and neither aborts
//! the rest. Aborts are reserved for conditions that make the whole run
//! meaningless: an empty profile, duplicate posting ids, a profile that
//! cannot be embedded, or an index built with a different embedding model.

use crate::config::Config;
use crate::embedding::{Embedder, EmbedderError};
use crate::provider::Provider;
use crate::retriever::{self, RetrieverError};
use crate::scoring::{ScoreFailure, ScoreOutcome, Scorer};
use crate::store::{self, IndexEntry, StoreError, VectorIndex};
use crate::types::{JobPosting, RankedPosting};
use futures::{stream, StreamExt};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("profile text is empty")]
    EmptyProfile,

    #[error("duplicate posting id '{0}' in input")]
    DuplicatePostingId(String),

    #[error("failed to embed profile: {0}")]
    ProfileEmbedding(#[from] EmbedderError),

    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrieverError),

    #[error("failed to persist vector index: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// One retrieved posting with its ranking and scoring outcome.
///
/// Results keep the retriever's similarity order; a posting whose scoring
/// failed stays in the list, marked, so the reporter can surface partial
/// failures instead of silently dropping them.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub id: String,
    pub similarity: f32,
    pub outcome: ScoreOutcome,
}

/// A posting excluded from retrieval for this run, with the reason.
#[derive(Debug, Clone)]
pub struct SkippedPosting {
    pub id: String,
    pub reason: String,
}

/// Everything a completed run hands to the report renderer.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub results: Vec<MatchResult>,
    pub skipped: Vec<SkippedPosting>,
}

/// The matching pipeline, owning the embedder, scorer and index location.
///
/// One `run` call is one pass: INIT, SYNC_STORE, RETRIEVE, SCORE, ASSEMBLE.
pub struct Pipeline {
    embedder: Embedder,
    scorer: Scorer,
    index_path: PathBuf,
    top_n: usize,
    embed_concurrency: usize,
}

impl Pipeline {
    pub fn new(config: &Config, provider: Arc<dyn Provider>) -> Self {
        let embedder = Embedder::new(provider.clone(), config.embedding.model.clone());
        let scorer = Scorer::new(provider, config.llm.clone(), config.scoring.clone());
        Self {
            embedder,
            scorer,
            index_path: PathBuf::from(&config.storage.index_path),
            top_n: config.retrieval.top_n,
            embed_concurrency: config.embedding.concurrency.max(1),
        }
    }

    /// Executes one matching run.
    ///
    /// The profile vector is computed fresh every run; posting vectors are
    /// reused from the persisted index whenever their content hash is
    /// unchanged. Once `cancel` fires, no new service call is started;
    /// whatever settled by then is still assembled into the report.
    pub async fn run(
        &self,
        profile_text: &str,
        postings: &[JobPosting],
        cancel: &CancellationToken,
    ) -> Result<RunReport> {
        // INIT
        if cancel.is_cancelled() {
            return Ok(RunReport::default());
        }
        if profile_text.trim().is_empty() {
            return Err(PipelineError::EmptyProfile);
        }
        check_unique_ids(postings)?;

        info!(postings = postings.len(), "starting matching run");
        let profile_vector = self.embedder.embed(profile_text).await?;
        debug!(dimension = profile_vector.len(), "profile embedded");

        if postings.is_empty() {
            info!("no postings to match; finishing with an empty report");
            return Ok(RunReport::default());
        }

        // SYNC_STORE
        let mut index = self.load_index();
        let skipped = self.sync_store(&mut index, postings, cancel).await;
        index.save(&self.index_path)?;

        // RETRIEVE: only entries belonging to this run's input are ranked;
        // ids persisted by earlier runs stay in the index but are not
        // candidates, and skipped postings are excluded even if a stale
        // vector for them is still stored.
        let excluded: HashSet<&str> = skipped.iter().map(|s| s.id.as_str()).collect();
        let input_ids: HashSet<&str> = postings.iter().map(|p| p.id.as_str()).collect();
        let candidates: Vec<IndexEntry> = index
            .entries()
            .iter()
            .filter(|e| input_ids.contains(e.id.as_str()) && !excluded.contains(e.id.as_str()))
            .cloned()
            .collect();
        let ranked = retriever::retrieve(&profile_vector, &candidates, self.top_n)?;
        info!(retrieved = ranked.len(), "retrieval complete");

        // SCORE
        let by_id: HashMap<&str, &JobPosting> =
            postings.iter().map(|p| (p.id.as_str(), p)).collect();
        let selected: Vec<JobPosting> = ranked
            .iter()
            .filter_map(|r| by_id.get(r.id.as_str()).map(|p| (*p).clone()))
            .collect();
        let mut outcomes = self.scorer.score_all(profile_text, &selected, cancel).await;

        // ASSEMBLE: retriever order wins regardless of completion order.
        let results = ranked
            .into_iter()
            .map(|RankedPosting { id, similarity }| {
                let outcome = outcomes
                    .remove(&id)
                    .unwrap_or(ScoreOutcome::Failed(ScoreFailure::Cancelled));
                MatchResult {
                    id,
                    similarity,
                    outcome,
                }
            })
            .collect();

        info!(skipped = skipped.len(), "matching run complete");
        Ok(RunReport { results, skipped })
    }

    /// Loads the persisted index, rebuilding from empty when the file on
    /// disk cannot be read or decoded. After a rebuild every posting needs
    /// embedding again; the run continues rather than crashing.
    fn load_index(&self) -> VectorIndex {
        match VectorIndex::load(&self.index_path) {
            Ok(index) => {
                debug!(entries = index.len(), "vector index loaded");
                index
            }
            Err(e) => {
                warn!(error = %e, "could not load vector index; rebuilding from empty");
                VectorIndex::new()
            }
        }
    }

    /// Embeds every posting whose content hash is missing or stale and
    /// upserts the results. Postings whose embedding fails are returned as
    /// skipped, in input order; they are excluded from this run but their
    /// old index entries (if any) are left for a future retry.
    async fn sync_store(
        &self,
        index: &mut VectorIndex,
        postings: &[JobPosting],
        cancel: &CancellationToken,
    ) -> Vec<SkippedPosting> {
        let stale: Vec<(&JobPosting, String)> = postings
            .iter()
            .filter_map(|posting| {
                let hash = store::content_hash(&posting.embedding_text());
                index
                    .needs_embedding(&posting.id, &hash)
                    .then(|| (posting, hash))
            })
            .collect();

        if stale.is_empty() {
            debug!("all posting embeddings are current");
            return Vec::new();
        }
        info!(count = stale.len(), "embedding new or changed postings");

        // None marks a task that never started because the run was cancelled.
        let mut settled: HashMap<String, Option<std::result::Result<Vec<f32>, EmbedderError>>> =
            stream::iter(stale.iter().map(|(posting, _)| {
                let embedder = self.embedder.clone();
                let cancel = cancel.clone();
                async move {
                    if cancel.is_cancelled() {
                        return (posting.id.clone(), None);
                    }
                    let result = embedder.embed(&posting.embedding_text()).await;
                    (posting.id.clone(), Some(result))
                }
            }))
            .buffer_unordered(self.embed_concurrency)
            .collect()
            .await;

        // Upserts happen here, after the batch settles: the index has a
        // single writer per run.
        let mut skipped = Vec::new();
        for (posting, hash) in stale {
            match settled.remove(&posting.id).flatten() {
                Some(Ok(embedding)) => index.upsert(&posting.id, embedding, hash),
                Some(Err(e)) => {
                    warn!(posting = %posting.id, error = %e, "embedding failed; posting skipped for this run");
                    skipped.push(SkippedPosting {
                        id: posting.id.clone(),
                        reason: e.to_string(),
                    });
                }
                None => skipped.push(SkippedPosting {
                    id: posting.id.clone(),
                    reason: "run cancelled before embedding".to_string(),
                }),
            }
        }
        skipped
    }
}

fn check_unique_ids(postings: &[JobPosting]) -> Result<()> {
    let mut seen = HashSet::with_capacity(postings.len());
    for posting in postings {
        if !seen.insert(posting.id.as_str()) {
            return Err(PipelineError::DuplicatePostingId(posting.id.clone()));
        }
    }
    Ok(())
}
