//! CSV ingestion of job postings.
//!
//! Rows become [`JobPosting`]s with ids assigned from row position,
//! starting at 1, so ids are stable for a given export file. Missing
//! columns default to empty strings; the pipeline only needs title,
//! description and company to do useful work.

use anyhow::{Context, Result};
use jobscout_core::JobPosting;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct JobRow {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    applicants: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    company: String,
}

pub fn load_jobs_csv(path: &Path) -> Result<Vec<JobPosting>> {
    let mut reader = csv::Reader::from_path(path)?;

    let mut postings = Vec::new();
    for (row, record) in reader.deserialize::<JobRow>().enumerate() {
        let record =
            record.with_context(|| format!("Malformed CSV record at row {}", row + 1))?;
        postings.push(JobPosting {
            id: (row + 1).to_string(),
            title: record.title,
            url: record.url,
            location: record.location,
            date: record.date,
            applicants: record.applicants,
            description: record.description,
            company: record.company,
        });
    }

    Ok(postings)
}
