use async_trait::async_trait;
use serde_json::{Value, json};

use super::{Tool, ToolContext, ToolSchema, required_str};
use crate::error::Result;

pub struct LogApplicationTool;

#[async_trait]
impl Tool for LogApplicationTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "log_application",
            description: "Record that the user applied to a job.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "company_name": { "type": "string" },
                    "job_title": { "type": "string" }
                },
                "required": ["company_name", "job_title"]
            }),
        }
    }

    async fn call(&self, ctx: &ToolContext, params: Value) -> Result<String> {
        let company = required_str(&params, "company_name")?;
        let title = required_str(&params, "job_title")?;
        let (company, title) = (company.trim(), title.trim());

        ctx.ledger.record_entry(company, title);
        Ok(format!("Logged application for {title} at {company}."))
    }
}

pub struct ExportApplicationsTool;

#[async_trait]
impl Tool for ExportApplicationsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "export_applications",
            description: "Export every logged application as CSV (company_name,job_title).",
            input_schema: json!({ "type": "object", "properties": {} }),
        }
    }

    async fn call(&self, ctx: &ToolContext, _params: Value) -> Result<String> {
        Ok(ctx.ledger.export_csv())
    }
}
