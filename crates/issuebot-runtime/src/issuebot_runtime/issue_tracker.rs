use anyhow::Result;
use async_trait::async_trait;
use issuebot_rules::issue_model::{GithubIssue, GithubIssueLabel};

#[async_trait]
/// Remote operations the runtime performs on an issue or pull request.
pub trait IssueTracker: Send + Sync {
    async fn fetch_issue(&self, number: u64) -> Result<GithubIssue>;

    /// Add one label and return the issue's full label list afterwards.
    async fn add_label(&self, number: u64, label: &str) -> Result<Vec<GithubIssueLabel>>;

    async fn create_comment(&self, number: u64, body: &str) -> Result<()>;

    async fn close_issue(&self, number: u64) -> Result<()>;
}
