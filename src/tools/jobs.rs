use async_trait::async_trait;
use serde_json::{Value, json};

use super::{Tool, ToolContext, ToolSchema, optional_u64, required_str};
use crate::error::Result;
use crate::jobs::{format_details, format_listings};

const MAX_PAGES: u64 = 5;

pub struct SearchJobsTool;

#[async_trait]
impl Tool for SearchJobsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_jobs",
            description: "Search job postings. Results are remembered so get_more_job_details can \
                look an employer up afterwards.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Free-text query, e.g. \"rust developer in Paris\""
                    },
                    "num_pages": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": MAX_PAGES,
                        "description": "Result pages to fetch (default 1)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, ctx: &ToolContext, params: Value) -> Result<String> {
        let query = required_str(&params, "query")?;
        let pages = optional_u64(&params, "num_pages")?
            .unwrap_or(1)
            .clamp(1, MAX_PAGES) as u32;

        let listings = ctx.jobs.search(query.trim(), pages).await?;
        ctx.ledger.cache_listings(&listings);
        Ok(format_listings(&listings))
    }
}

pub struct JobDetailsTool;

#[async_trait]
impl Tool for JobDetailsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_more_job_details",
            description: "Show the apply link and description of a posting from the last \
                search_jobs results, looked up by employer name.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "employer_name": {
                        "type": "string",
                        "description": "Employer exactly as listed in the search results"
                    }
                },
                "required": ["employer_name"]
            }),
        }
    }

    async fn call(&self, ctx: &ToolContext, params: Value) -> Result<String> {
        let employer = required_str(&params, "employer_name")?;
        if let Some(listing) = ctx.ledger.listing_for(&employer) {
            return Ok(format_details(&listing));
        }

        let known = ctx.ledger.cached_employers();
        if known.is_empty() {
            Ok(format!(
                "No job from {} is cached. Run search_jobs first.",
                employer.trim()
            ))
        } else {
            Ok(format!(
                "No job from {} in the last search. Known employers: {}",
                employer.trim(),
                known.join(", ")
            ))
        }
    }
}
