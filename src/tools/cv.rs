use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::info;

use super::{Tool, ToolContext, ToolSchema, required_str};
use crate::error::Result;

pub struct CreateTexTool;

#[async_trait]
impl Tool for CreateTexTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "create_tex",
            description: "Write a LaTeX CV to the configured path, replacing any previous one.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "latex": {
                        "type": "string",
                        "description": "Complete LaTeX document"
                    }
                },
                "required": ["latex"]
            }),
        }
    }

    async fn call(&self, ctx: &ToolContext, params: Value) -> Result<String> {
        let latex = required_str(&params, "latex")?;
        let path = &ctx.config.cv_path;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, latex.as_bytes()).await?;
        info!(path = %path.display(), bytes = latex.len(), "CV written");

        Ok(format!("Tex created successfully at {}", path.display()))
    }
}

pub struct GreetTool;

#[async_trait]
impl Tool for GreetTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "greet",
            description: "Introduce the assistant.",
            input_schema: json!({ "type": "object", "properties": {} }),
        }
    }

    async fn call(&self, _ctx: &ToolContext, _params: Value) -> Result<String> {
        Ok("Hello, I am Jobpilot. I can search for jobs, write your CV in LaTeX, \
            keep track of your applications and fill in application forms for you."
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JobpilotConfig;
    use crate::testing::tool_context;

    #[tokio::test]
    async fn create_tex_writes_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let cv_path = dir.path().join("cv").join("cv.tex");
        let (ctx, _) = tool_context(JobpilotConfig {
            cv_path: cv_path.clone(),
            ..Default::default()
        });

        let text = CreateTexTool
            .call(&ctx, json!({"latex": "\\documentclass{article}"}))
            .await
            .unwrap();
        assert!(text.starts_with("Tex created successfully"));
        assert_eq!(
            std::fs::read_to_string(&cv_path).unwrap(),
            "\\documentclass{article}"
        );

        CreateTexTool
            .call(&ctx, json!({"latex": "\\begin{document}\\end{document}"}))
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(&cv_path).unwrap(),
            "\\begin{document}\\end{document}"
        );
    }

    #[tokio::test]
    async fn create_tex_requires_content() {
        let dir = tempfile::tempdir().unwrap();
        let cv_path = dir.path().join("cv.tex");
        let (ctx, _) = tool_context(JobpilotConfig {
            cv_path: cv_path.clone(),
            ..Default::default()
        });

        assert!(CreateTexTool.call(&ctx, json!({"latex": "  "})).await.is_err());
        assert!(!cv_path.exists());
    }

    #[tokio::test]
    async fn greet_introduces_itself() {
        let (ctx, _) = tool_context(JobpilotConfig::default());
        let text = GreetTool.call(&ctx, json!({})).await.unwrap();
        assert!(text.starts_with("Hello, I am Jobpilot."));
    }
}
