use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::label_table::OS_LABELS;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Label attached to a GitHub issue or pull request.
pub struct GithubIssueLabel {
    pub name: String,
}

impl GithubIssueLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Issue or pull request as returned by `GET /repos/{owner}/{repo}/issues/{number}`.
pub struct GithubIssue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub labels: Vec<GithubIssueLabel>,
    #[serde(default)]
    pub pull_request: Option<Value>,
}

impl GithubIssue {
    /// Pull requests are issues carrying a `pull_request` object.
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.as_ref().is_some_and(|value| !value.is_null())
    }

    pub fn kind_label(&self) -> &'static str {
        if self.is_pull_request() {
            "PR"
        } else {
            "issue"
        }
    }

    /// Body text, empty when GitHub reports a null body.
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|assigned| assigned.name == label)
    }

    pub fn has_os_label(&self) -> bool {
        OS_LABELS.iter().any(|label| self.has_label(label))
    }

    pub fn label_names(&self) -> Vec<&str> {
        self.labels.iter().map(|label| label.name.as_str()).collect()
    }
}
