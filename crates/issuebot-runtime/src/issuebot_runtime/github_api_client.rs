use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use issuebot_rules::issue_model::{GithubIssue, GithubIssueLabel};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::github_transport_helpers::{parse_retry_after, truncate_for_error, RetryPolicy};
use super::issue_tracker::IssueTracker;
use super::RepoRef;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GithubCommentCreateResponse {
    pub(crate) id: u64,
    pub(crate) html_url: Option<String>,
}

#[derive(Clone)]
/// Authenticated GitHub REST client scoped to one repository.
pub struct GithubApiClient {
    http: reqwest::Client,
    api_base: String,
    repo: RepoRef,
    retry: RetryPolicy,
}

impl GithubApiClient {
    pub fn new(
        api_base: String,
        token: String,
        repo: RepoRef,
        request_timeout_ms: u64,
        retry_max_attempts: usize,
        retry_base_delay_ms: u64,
    ) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            bail!("github token is empty");
        }
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("issuebot"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let mut auth_value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
            .context("invalid github authorization header")?;
        auth_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create github api client")?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            repo,
            retry: RetryPolicy::new(retry_max_attempts, retry_base_delay_ms),
        })
    }

    fn issue_url(&self, issue_number: u64) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}",
            self.api_base, self.repo.owner, self.repo.name, issue_number
        )
    }

    pub(crate) async fn get_issue(&self, issue_number: u64) -> Result<GithubIssue> {
        let url = self.issue_url(issue_number);
        self.request_json("fetch issue", || self.http.get(url.as_str()))
            .await
    }

    pub(crate) async fn add_issue_labels(
        &self,
        issue_number: u64,
        labels: &[&str],
    ) -> Result<Vec<GithubIssueLabel>> {
        let url = format!("{}/labels", self.issue_url(issue_number));
        let payload = json!({ "labels": labels });
        self.request_json("add issue labels", || {
            self.http.post(url.as_str()).json(&payload)
        })
        .await
    }

    pub(crate) async fn create_issue_comment(
        &self,
        issue_number: u64,
        body: &str,
    ) -> Result<GithubCommentCreateResponse> {
        let url = format!("{}/comments", self.issue_url(issue_number));
        let payload = json!({ "body": body });
        self.request_json("create issue comment", || {
            self.http.post(url.as_str()).json(&payload)
        })
        .await
    }

    pub(crate) async fn update_issue_state(
        &self,
        issue_number: u64,
        state: &str,
    ) -> Result<GithubIssue> {
        let url = self.issue_url(issue_number);
        let payload = json!({ "state": state });
        self.request_json("update issue state", || {
            self.http.patch(url.as_str()).json(&payload)
        })
        .await
    }

    async fn request_json<T, F>(&self, operation: &str, mut request_builder: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0_usize;
        loop {
            attempt = attempt.saturating_add(1);
            let response = request_builder()
                .header(
                    "x-issuebot-retry-attempt",
                    attempt.saturating_sub(1).to_string(),
                )
                .send()
                .await;
            match response {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<T>()
                            .await
                            .with_context(|| format!("failed to decode github {operation}"));
                    }

                    let retry_after = parse_retry_after(response.headers());
                    let body = response.text().await.unwrap_or_default();
                    if self.retry.should_retry_status(attempt, status.as_u16()) {
                        let delay = self.retry.delay(attempt, retry_after);
                        warn!(
                            operation,
                            status = status.as_u16(),
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "retrying github api call"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    bail!(
                        "github api {operation} failed with status {}: {}",
                        status.as_u16(),
                        truncate_for_error(&body, 800)
                    );
                }
                Err(error) => {
                    if self.retry.should_retry_transport(attempt, &error) {
                        let delay = self.retry.delay(attempt, None);
                        warn!(operation, attempt, %error, "retrying github api call");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(error)
                        .with_context(|| format!("github api {operation} request failed"));
                }
            }
        }
    }
}

#[async_trait]
impl IssueTracker for GithubApiClient {
    async fn fetch_issue(&self, number: u64) -> Result<GithubIssue> {
        self.get_issue(number).await
    }

    async fn add_label(&self, number: u64, label: &str) -> Result<Vec<GithubIssueLabel>> {
        self.add_issue_labels(number, &[label]).await
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<()> {
        let created = self.create_issue_comment(number, body).await?;
        debug!(
            comment_id = created.id,
            url = created.html_url.as_deref().unwrap_or_default(),
            "posted issue comment"
        );
        Ok(())
    }

    async fn close_issue(&self, number: u64) -> Result<()> {
        let issue = self.update_issue_state(number, "closed").await?;
        if issue.state != "closed" {
            bail!(
                "github api close issue returned state '{}' for #{number}",
                issue.state
            );
        }
        Ok(())
    }
}
