//! Parser for the LLM's verdict response.
//!
//! The scoring prompt instructs the model to reply with a single JSON
//! object. All interpretation of the raw response happens here, so retries
//! and tests have exactly one failure surface. Models routinely wrap the
//! object in code fences or stray prose; everything outside the outermost
//! braces is discarded before parsing.

use crate::types::Verdict;
use serde::Deserialize;
use thiserror::Error;

/// Upper bound of the suitability scale.
pub const MAX_SUITABILITY: u8 = 100;

#[derive(Debug, Error)]
pub enum VerdictError {
    #[error("response contains no JSON object")]
    NoJsonObject,

    /// Missing fields, a non-numeric score, or invalid JSON.
    #[error("verdict JSON is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("suitability {0} is outside 0-{MAX_SUITABILITY}")]
    ScoreOutOfRange(i64),

    #[error("match summary is empty")]
    EmptySummary,
}

pub type Result<T> = std::result::Result<T, VerdictError>;

/// Loose shape of the model's answer; range and emptiness are checked
/// after deserialization so each failure gets its own error.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    suitability: i64,
    #[serde(default)]
    job_summary: String,
    match_summary: String,
}

/// Parses the raw LLM response into a validated [`Verdict`].
pub fn parse_verdict(raw: &str) -> Result<Verdict> {
    let body = extract_json_object(raw).ok_or(VerdictError::NoJsonObject)?;
    let parsed: RawVerdict = serde_json::from_str(body)?;

    if parsed.suitability < 0 || parsed.suitability > i64::from(MAX_SUITABILITY) {
        return Err(VerdictError::ScoreOutOfRange(parsed.suitability));
    }
    if parsed.match_summary.trim().is_empty() {
        return Err(VerdictError::EmptySummary);
    }

    Ok(Verdict {
        suitability: parsed.suitability as u8,
        job_summary: parsed.job_summary,
        match_summary: parsed.match_summary,
    })
}

/// Returns the slice between the first `{` and the last `}`, which drops
/// code fences and any prose the model added around the object.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
