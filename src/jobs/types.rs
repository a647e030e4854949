//! Wire types for the job search API.

use serde::{Deserialize, Serialize};

use crate::ledger::JobListing;

/// Longest description kept per listing, in characters.
pub const DESCRIPTION_LIMIT: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Vec<JobPosting>,
}

/// One posting as returned by the API. Missing fields default to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobPosting {
    pub employer_name: String,
    pub job_title: String,
    pub job_city: Option<String>,
    pub job_state: Option<String>,
    pub job_country: Option<String>,
    pub job_description: String,
    pub job_apply_link: String,
}

impl JobPosting {
    fn location(&self) -> String {
        let parts: Vec<&str> = [&self.job_city, &self.job_state, &self.job_country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            "Unspecified".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl From<JobPosting> for JobListing {
    fn from(posting: JobPosting) -> Self {
        let location = posting.location();
        Self {
            employer_name: posting.employer_name,
            job_title: posting.job_title,
            location,
            description: truncate_chars(&posting.job_description, DESCRIPTION_LIMIT),
            apply_link: posting.job_apply_link,
        }
    }
}

/// First `max_chars` characters of `s`, with an ellipsis when cut.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &s[..end]),
        None => s.to_string(),
    }
}
