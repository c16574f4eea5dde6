//! LLM scoring of retrieved postings.
//!
//! Each retrieved posting gets an independent scoring task: build the
//! prompt, call the model, parse the verdict, retrying failed attempts a
//! bounded number of times. A task captures its own outcome (success or a
//! typed failure), so one posting's failure never aborts the others.
//! Tasks run concurrently up to the configured limit and their outcomes are
//! collected into a map keyed by posting id; final ordering is decided by
//! the retriever, never by completion order.

mod parser;
mod prompt;

pub use parser::{parse_verdict, VerdictError, MAX_SUITABILITY};
pub use prompt::build_prompt;

use crate::config::{LlmConfig, ScoringConfig};
use crate::provider::{GenerateRequest, Provider};
use crate::types::{JobPosting, Verdict};
use futures::{stream, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Why a posting could not be scored. Recorded per posting, never raised.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreFailure {
    #[error("LLM call timed out after {0}s")]
    Timeout(u64),

    #[error("LLM call failed: {0}")]
    Service(String),

    #[error("unparseable verdict: {0}")]
    Verdict(String),

    #[error("run cancelled before scoring")]
    Cancelled,
}

/// Outcome of scoring a single posting.
#[derive(Debug, Clone)]
pub enum ScoreOutcome {
    Scored(Verdict),
    Failed(ScoreFailure),
}

impl ScoreOutcome {
    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            ScoreOutcome::Scored(verdict) => Some(verdict),
            ScoreOutcome::Failed(_) => None,
        }
    }
}

/// Scores postings against a candidate profile through the LLM provider.
#[derive(Clone)]
pub struct Scorer {
    provider: Arc<dyn Provider>,
    llm: LlmConfig,
    scoring: ScoringConfig,
}

impl Scorer {
    pub fn new(provider: Arc<dyn Provider>, llm: LlmConfig, scoring: ScoringConfig) -> Self {
        Self {
            provider,
            llm,
            scoring,
        }
    }

    /// Scores one posting.
    ///
    /// Every failed attempt (transport error, timeout, or unparseable
    /// verdict) consumes one slot of the retry budget; retries re-send the
    /// identical prompt after a fixed delay. An exhausted budget yields the
    /// last failure.
    pub async fn score(&self, profile_text: &str, posting: &JobPosting) -> ScoreOutcome {
        let prompt = build_prompt(profile_text, posting);
        let attempts = self.scoring.max_retries + 1;
        let mut last_failure = ScoreFailure::Service("no attempt was made".to_string());

        for attempt in 0..attempts {
            if attempt > 0 {
                debug!(posting = %posting.id, attempt, "retrying scoring call");
                tokio::time::sleep(Duration::from_millis(self.scoring.retry_delay_ms)).await;
            }

            match self.attempt(&prompt).await {
                Ok(verdict) => {
                    debug!(posting = %posting.id, suitability = verdict.suitability, "posting scored");
                    return ScoreOutcome::Scored(verdict);
                }
                Err(failure) => {
                    warn!(posting = %posting.id, attempt, %failure, "scoring attempt failed");
                    last_failure = failure;
                }
            }
        }

        ScoreOutcome::Failed(last_failure)
    }

    async fn attempt(&self, prompt: &str) -> std::result::Result<Verdict, ScoreFailure> {
        let request = GenerateRequest::new(self.llm.model.clone(), prompt)
            .with_temperature(self.llm.temperature)
            .with_max_tokens(self.llm.max_tokens);

        let timeout = Duration::from_secs(self.scoring.timeout_secs);
        let response = match tokio::time::timeout(timeout, self.provider.generate(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(ScoreFailure::Service(e.to_string())),
            Err(_) => return Err(ScoreFailure::Timeout(self.scoring.timeout_secs)),
        };

        parse_verdict(&response.response).map_err(|e| ScoreFailure::Verdict(e.to_string()))
    }

    /// Scores many postings concurrently, bounded by the configured limit.
    ///
    /// Returns outcomes keyed by posting id. Postings whose task starts
    /// after `cancel` fires are marked [`ScoreFailure::Cancelled`] without
    /// a service call; tasks already in flight settle normally.
    pub async fn score_all(
        &self,
        profile_text: &str,
        postings: &[JobPosting],
        cancel: &CancellationToken,
    ) -> HashMap<String, ScoreOutcome> {
        let limit = self.scoring.concurrency.max(1);

        stream::iter(postings.iter().map(|posting| {
            let cancel = cancel.clone();
            async move {
                if cancel.is_cancelled() {
                    return (
                        posting.id.clone(),
                        ScoreOutcome::Failed(ScoreFailure::Cancelled),
                    );
                }
                (posting.id.clone(), self.score(profile_text, posting).await)
            }
        }))
        .buffer_unordered(limit)
        .collect()
        .await
    }
}
