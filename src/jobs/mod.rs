//! Job search against a JSearch-compatible REST API.

pub mod client;
pub mod error;
pub mod types;

pub use client::JobSearchClient;
pub use error::JobSearchError;

use crate::ledger::JobListing;

/// Render listings for the agent, one block per posting.
pub fn format_listings(listings: &[JobListing]) -> String {
    if listings.is_empty() {
        return "No jobs found.".to_string();
    }
    listings
        .iter()
        .map(|l| {
            format!(
                "Employer: {}\nTitle: {}\nLocation: {}\nDescription: {}",
                l.employer_name, l.job_title, l.location, l.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render the detail view for one listing.
pub fn format_details(listing: &JobListing) -> String {
    format!(
        "Employer: {}\nTitle: {}\nLocation: {}\nApply link: {}\n\n{}",
        listing.employer_name,
        listing.job_title,
        listing.location,
        listing.apply_link,
        listing.description
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(employer: &str) -> JobListing {
        JobListing {
            employer_name: employer.into(),
            job_title: "Engineer".into(),
            location: "Remote".into(),
            description: "Ship it.".into(),
            apply_link: "https://jobs.example/apply".into(),
        }
    }

    #[test]
    fn listings_are_separated_by_blank_lines() {
        let text = format_listings(&[listing("Acme"), listing("Globex")]);
        assert_eq!(
            text,
            "Employer: Acme\nTitle: Engineer\nLocation: Remote\nDescription: Ship it.\n\n\
             Employer: Globex\nTitle: Engineer\nLocation: Remote\nDescription: Ship it."
        );
    }

    #[test]
    fn empty_results() {
        assert_eq!(format_listings(&[]), "No jobs found.");
    }

    #[test]
    fn details_include_apply_link() {
        let text = format_details(&listing("Acme"));
        assert!(text.contains("Apply link: https://jobs.example/apply"));
    }
}
