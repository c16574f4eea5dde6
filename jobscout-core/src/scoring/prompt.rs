//! Prompt template for the suitability verdict.
//!
//! The JSON block this prompt requests and the grammar accepted by
//! [`super::parser`] must be kept in lockstep; changing one without the
//! other breaks every scoring call.

use crate::types::JobPosting;

const CURATION_PROMPT: &str = "\
You are a job hiring assistant.
You will receive a candidate profile and a job description.
On a scale of 0 to 100, judge how suitable the candidate is for the job, with 100 being most suitable.
Summarize the main tasks of the job and what area it is in.
Summarize how well the candidate's skills and interests match the description, whether the candidate is suitably qualified, and which required skills the candidate lacks.
Answer concisely using an objective tone.
Output your answer as json with the following format:
{
    \"suitability\": <int 0-100>,
    \"job_summary\": \"<string>\",
    \"match_summary\": \"<string>\"
}
The job_summary and match_summary fields should be no longer than one paragraph each.
Output only valid json with double quotation marks around field names and values.
Be sure that the field names exactly match: suitability, job_summary, match_summary.
Do not add anything outside the json. Do not add a note or explanation.";

/// Builds the scoring prompt for one posting.
///
/// Pure function of the profile text, posting title and posting
/// description: the same inputs always produce the same prompt, so retries
/// re-send identical text and any output variation comes from model
/// sampling alone.
pub fn build_prompt(profile_text: &str, posting: &JobPosting) -> String {
    format!(
        "{CURATION_PROMPT}\n\nThe candidate profile is:\n{profile}\n\nThe job title is: {title}\n\nThe job description is:\n{description}",
        profile = profile_text,
        title = posting.title,
        description = posting.description,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting() -> JobPosting {
        JobPosting {
            id: "1".to_string(),
            title: "Rust Engineer".to_string(),
            url: String::new(),
            location: String::new(),
            date: String::new(),
            applicants: String::new(),
            description: "Build storage engines.".to_string(),
            company: "Acme".to_string(),
        }
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let posting = posting();
        assert_eq!(
            build_prompt("ten years of Rust", &posting),
            build_prompt("ten years of Rust", &posting),
        );
    }

    #[test]
    fn test_prompt_contains_profile_and_posting() {
        let prompt = build_prompt("ten years of Rust", &posting());
        assert!(prompt.contains("ten years of Rust"));
        assert!(prompt.contains("Rust Engineer"));
        assert!(prompt.contains("Build storage engines."));
        assert!(prompt.contains("\"suitability\""));
    }
}
