//! In-memory record of logged applications and the latest job-search results.
//!
//! One [`Ledger`] is shared by every tool call through the tool context; all
//! access is serialised behind a mutex.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

pub const CSV_HEADER: &str = "company_name,job_title";

/// One manually logged application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationEntry {
    pub company_name: String,
    pub job_title: String,
}

/// A posting returned by the job search, kept in structured form so detail
/// lookups never re-parse rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub employer_name: String,
    pub job_title: String,
    pub location: String,
    /// Truncated description.
    pub description: String,
    pub apply_link: String,
}

#[derive(Debug, Default)]
struct LedgerState {
    entries: Vec<ApplicationEntry>,
    /// Keyed by lower-cased, trimmed employer name.
    listings: HashMap<String, JobListing>,
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    state: Arc<Mutex<LedgerState>>,
}

fn employer_key(employer_name: &str) -> String {
    employer_name.trim().to_lowercase()
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut LedgerState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Append an application entry.
    pub fn record_entry(&self, company_name: &str, job_title: &str) {
        self.with_state(|state| {
            state.entries.push(ApplicationEntry {
                company_name: company_name.to_string(),
                job_title: job_title.to_string(),
            })
        });
    }

    /// Header plus one row per entry in insertion order, joined by `\n`.
    ///
    /// Fields are written verbatim; embedded commas are not escaped.
    pub fn export_csv(&self) -> String {
        self.with_state(|state| {
            let mut lines = Vec::with_capacity(state.entries.len() + 1);
            lines.push(CSV_HEADER.to_string());
            lines.extend(
                state
                    .entries
                    .iter()
                    .map(|e| format!("{},{}", e.company_name, e.job_title)),
            );
            lines.join("\n")
        })
    }

    /// Replace the cached search results. When an employer appears more than
    /// once, the first posting wins.
    pub fn cache_listings(&self, listings: &[JobListing]) {
        self.with_state(|state| {
            state.listings.clear();
            for listing in listings {
                state
                    .listings
                    .entry(employer_key(&listing.employer_name))
                    .or_insert_with(|| listing.clone());
            }
        });
    }

    /// Cached listing for `employer_name`, matched case-insensitively.
    pub fn listing_for(&self, employer_name: &str) -> Option<JobListing> {
        self.with_state(|state| state.listings.get(&employer_key(employer_name)).cloned())
    }

    pub fn cached_employers(&self) -> Vec<String> {
        self.with_state(|state| {
            let mut names: Vec<String> = state
                .listings
                .values()
                .map(|l| l.employer_name.clone())
                .collect();
            names.sort();
            names
        })
    }
}
