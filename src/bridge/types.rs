//! Data exchanged with the page automation service.

use serde::{Deserialize, Serialize};

/// A candidate step proposed by an observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedAction {
    /// Locator of the target element (`xpath=...` or a CSS selector).
    pub selector: String,
    pub description: String,
    /// Playwright method the service intends to call (`click`, `fill`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

impl ObservedAction {
    /// Whether the locator points at an `<input>` element itself.
    ///
    /// XPath locators must end in an `input` step; CSS selectors must have
    /// an `input` element as their last compound selector.
    pub fn targets_input_control(&self) -> bool {
        let locator = self.selector.trim();
        if let Some(xpath) = locator.strip_prefix("xpath=") {
            return last_xpath_step_is_input(xpath);
        }
        if locator.starts_with('/') {
            return last_xpath_step_is_input(locator);
        }
        let last_compound = locator
            .rsplit(|c: char| c.is_whitespace() || c == '>' || c == '+' || c == '~')
            .find(|part| !part.is_empty())
            .unwrap_or_default();
        let element: String = last_compound
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();
        element.eq_ignore_ascii_case("input")
    }
}

fn last_xpath_step_is_input(xpath: &str) -> bool {
    let step = xpath.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let node = step.split('[').next().unwrap_or_default();
    node.eq_ignore_ascii_case("input")
}

/// Result of a single `act` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Body of `POST /sessions/{id}/navigate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigateRequest {
    pub url: String,
}

/// Body of `POST /sessions/{id}/observe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserveRequest {
    pub instruction: String,
}

/// Body of `POST /sessions/{id}/act`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActRequest {
    pub action: ObservedAction,
}
