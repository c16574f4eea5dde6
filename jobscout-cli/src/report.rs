//! HTML report rendering.
//!
//! Produces a standalone page listing matches in pipeline order (the
//! retriever's similarity ranking), with collapsible description and
//! company sections, plus a section for postings that were skipped or
//! whose scoring failed.

use anyhow::Result;
use chrono::Local;
use jobscout_core::{JobPosting, RunReport, ScoreOutcome};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const PAGE_HEADER: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Job Matches</title>
    <style>
        body { font-family: sans-serif; background-color: #f8f8f8; margin: 20px; }
        ul { list-style-type: none; padding: 0; }
        .job { background: white; padding: 15px; margin-bottom: 10px; border-radius: 5px; box-shadow: 0 2px 4px rgba(0, 0, 0, 0.1); }
        h2 a { text-decoration: none; color: #0073e6; }
        h2 a:hover { text-decoration: underline; }
        .info-container { font-size: 14px; color: #555; font-weight: bold; display: flex; gap: 15px; }
        .failed { color: #b00020; }
        .toggle { cursor: pointer; color: #0073e6; display: block; margin-top: 5px; }
        .hidden { display: none; }
    </style>
</head>
<body>
    <h1>Job Matches</h1>
    <ul>
"#;

const PAGE_FOOTER: &str = r#"    </ul>
    <script>
        function toggleSection(element) {
            let section = element.nextElementSibling;
            if (section.classList.contains('hidden')) {
                section.classList.remove('hidden');
                element.textContent = element.textContent.replace("Show", "Hide");
            } else {
                section.classList.add('hidden');
                element.textContent = element.textContent.replace("Hide", "Show");
            }
        }
    </script>
</body>
</html>
"#;

/// Renders the run report as a standalone HTML page.
pub fn render(report: &RunReport, postings: &[JobPosting]) -> String {
    let by_id: HashMap<&str, &JobPosting> =
        postings.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut page = String::from(PAGE_HEADER);

    for result in &report.results {
        let Some(posting) = by_id.get(result.id.as_str()) else {
            continue;
        };
        page.push_str(&render_match(posting, result));
    }

    if !report.skipped.is_empty() {
        page.push_str("    </ul>\n    <h1>Skipped Postings</h1>\n    <ul>\n");
        for skipped in &report.skipped {
            let title = by_id
                .get(skipped.id.as_str())
                .map(|p| p.title.as_str())
                .unwrap_or("(unknown posting)");
            page.push_str(&format!(
                "        <li class=\"job\"><h2>{}</h2><p class=\"failed\">Skipped: {}</p></li>\n",
                escape(title),
                escape(&skipped.reason),
            ));
        }
    }

    page.push_str(PAGE_FOOTER);
    page
}

fn render_match(posting: &JobPosting, result: &jobscout_core::MatchResult) -> String {
    let verdict_block = match &result.outcome {
        ScoreOutcome::Scored(verdict) => format!(
            "<p class=\"summary\">Suitability score: {}</p>\n            \
             <p class=\"summary\">Job summary: {}</p>\n            \
             <p class=\"summary\">Match summary: {}</p>",
            verdict.suitability,
            escape(&verdict.job_summary),
            escape(&verdict.match_summary),
        ),
        ScoreOutcome::Failed(failure) => format!(
            "<p class=\"failed\">Scoring failed: {}</p>",
            escape(&failure.to_string()),
        ),
    };

    format!(
        r#"        <li class="job">
            <h2 class="title"><a href="{url}">{title}</a></h2>
            <div class="info-container">
                <span class="info location">Location: {location}</span>
                <span class="info posting-date">Posted: {date}</span>
                <span class="info applicants">Applicants: {applicants}</span>
                <span class="info similarity">Similarity: {similarity:.3}</span>
            </div>
            {verdict_block}

            <span class="toggle" onclick="toggleSection(this)">Show Description</span>
            <p class="hidden description">{description}</p>

            <span class="toggle" onclick="toggleSection(this)">Show Company</span>
            <p class="hidden company">{company}</p>
        </li>
"#,
        url = escape(&posting.url),
        title = escape(&posting.title),
        location = escape(&posting.location),
        date = escape(&posting.date),
        applicants = escape(&posting.applicants),
        similarity = result.similarity,
        verdict_block = verdict_block,
        description = escape(&posting.description),
        company = escape(&posting.company),
    )
}

/// Saves the report into the given directory, stamped with today's date.
pub fn save(html: &str, dir: &Path) -> Result<PathBuf> {
    let date = Local::now().format("%Y-%m-%d");
    let path = dir.join(format!("jobs_report_{date}.html"));
    std::fs::write(&path, html)?;
    Ok(path)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobscout_core::{MatchResult, ScoreFailure, SkippedPosting, Verdict};

    fn posting(id: &str, title: &str) -> JobPosting {
        JobPosting {
            id: id.to_string(),
            title: title.to_string(),
            url: "https://example.com".to_string(),
            location: "Berlin".to_string(),
            date: "2026-07-01".to_string(),
            applicants: "12".to_string(),
            description: "Build <great> things".to_string(),
            company: "Acme & Sons".to_string(),
        }
    }

    fn scored(id: &str, similarity: f32) -> MatchResult {
        MatchResult {
            id: id.to_string(),
            similarity,
            outcome: ScoreOutcome::Scored(Verdict {
                suitability: 85,
                job_summary: "Backend work.".to_string(),
                match_summary: "Strong fit.".to_string(),
            }),
        }
    }

    #[test]
    fn test_render_lists_matches_in_report_order() {
        let postings = vec![posting("1", "First Role"), posting("2", "Second Role")];
        let report = RunReport {
            results: vec![scored("2", 0.9), scored("1", 0.5)],
            skipped: vec![],
        };

        let html = render(&report, &postings);
        let second = html.find("Second Role").unwrap();
        let first = html.find("First Role").unwrap();
        assert!(second < first);
        assert!(html.contains("Suitability score: 85"));
        assert!(html.contains("Similarity: 0.900"));
    }

    #[test]
    fn test_render_marks_failed_scorings() {
        let postings = vec![posting("1", "First Role")];
        let report = RunReport {
            results: vec![MatchResult {
                id: "1".to_string(),
                similarity: 0.4,
                outcome: ScoreOutcome::Failed(ScoreFailure::Timeout(120)),
            }],
            skipped: vec![],
        };

        let html = render(&report, &postings);
        assert!(html.contains("Scoring failed"));
        assert!(html.contains("timed out"));
    }

    #[test]
    fn test_render_includes_skipped_section_with_reason() {
        let postings = vec![posting("1", "First Role")];
        let report = RunReport {
            results: vec![],
            skipped: vec![SkippedPosting {
                id: "1".to_string(),
                reason: "Embedding service error: API error: down".to_string(),
            }],
        };

        let html = render(&report, &postings);
        assert!(html.contains("Skipped Postings"));
        assert!(html.contains("First Role"));
        assert!(html.contains("Embedding service error"));
    }

    #[test]
    fn test_render_escapes_html_in_posting_fields() {
        let postings = vec![posting("1", "Role <script>")];
        let report = RunReport {
            results: vec![scored("1", 0.5)],
            skipped: vec![],
        };

        let html = render(&report, &postings);
        assert!(html.contains("Role &lt;script&gt;"));
        assert!(html.contains("Build &lt;great&gt; things"));
        assert!(html.contains("Acme &amp; Sons"));
        assert!(!html.contains("Role <script>"));
    }

    #[test]
    fn test_save_stamps_the_filename_with_the_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = save("<html></html>", dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("jobs_report_"));
        assert!(name.ends_with(".html"));
        assert!(path.exists());
    }
}
