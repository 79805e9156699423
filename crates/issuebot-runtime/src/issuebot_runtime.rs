//! Single-event triage run: label inference, template fields, and canned replies.

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Result};
use issuebot_rules::event_kind::EventKind;
use issuebot_rules::issue_model::{GithubIssue, GithubIssueLabel};
use issuebot_rules::label_table::{illogical_conflict, LabelKeywordTable};
use issuebot_rules::missing_headers::{
    detect_missing_python_headers, REPLY_MISSING_PYTHON_HEADERS,
};
use issuebot_rules::template_fields::{
    bug_fix_label, find_template_field, type_labels, TemplateField,
};
use tracing::{debug, info};

mod event_loader;
mod github_api_client;
mod github_transport_helpers;
mod issue_tracker;
mod script_keywords;

pub use event_loader::{EventLoadError, EventLoader, EventPayload};
pub use github_api_client::GithubApiClient;
pub use issue_tracker::IssueTracker;
use script_keywords::script_keywords_from_dir;

#[derive(Debug, Clone)]
/// Runtime configuration for one triage invocation.
pub struct IssueBotRuntimeConfig {
    pub repo_slug: String,
    pub api_base: String,
    pub token: String,
    pub event_path: PathBuf,
    pub request_timeout_ms: u64,
    pub retry_max_attempts: usize,
    pub retry_base_delay_ms: u64,
    pub scripts_dir: Option<PathBuf>,
    pub script_extension: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Repository coordinates in `owner/name` form.
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (owner, name) = trimmed
            .split_once('/')
            .ok_or_else(|| anyhow!("invalid github repository '{raw}', expected owner/repo"))?;
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            bail!("invalid github repository '{raw}', expected owner/repo");
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn as_slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of applying the label policy to one candidate label.
pub enum LabelOutcome {
    Added,
    AlreadyPresent,
    Conflicting { conflict: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    NoAction,
    ClosedMissingHeaders,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Summary of a completed run.
pub struct RunReport {
    pub event_kind: EventKind,
    pub issue_number: u64,
    pub is_pull_request: bool,
    pub added_labels: Vec<String>,
    pub dispatch: DispatchOutcome,
}

/// Builds the runtime from configuration and processes the configured event.
pub async fn run_issue_bot(config: IssueBotRuntimeConfig) -> Result<RunReport> {
    let runtime = IssueBotRuntime::new(config)?;
    runtime.run().await
}

pub struct IssueBotRuntime {
    events: EventLoader,
    tracker: Arc<dyn IssueTracker>,
    label_table: LabelKeywordTable,
}

impl IssueBotRuntime {
    pub fn new(config: IssueBotRuntimeConfig) -> Result<Self> {
        let repo = RepoRef::parse(&config.repo_slug)?;
        let github_client = GithubApiClient::new(
            config.api_base.clone(),
            config.token.clone(),
            repo.clone(),
            config.request_timeout_ms,
            config.retry_max_attempts,
            config.retry_base_delay_ms,
        )?;
        let mut label_table = LabelKeywordTable::builtin();
        if let Some(scripts_dir) = config.scripts_dir.as_deref() {
            let scripts = script_keywords_from_dir(scripts_dir, &config.script_extension)?;
            debug!(
                dir = %scripts_dir.display(),
                count = scripts.len(),
                "loaded script keywords"
            );
            label_table = label_table.with_script_keywords(scripts);
        }
        debug!(repo = %repo.as_slug(), api_base = %config.api_base, "github client ready");
        Ok(Self::with_tracker(
            EventLoader::new(config.event_path),
            Arc::new(github_client),
            label_table,
        ))
    }

    pub fn with_tracker(
        events: EventLoader,
        tracker: Arc<dyn IssueTracker>,
        label_table: LabelKeywordTable,
    ) -> Self {
        Self {
            events,
            tracker,
            label_table,
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let event = self.events.load()?;
        let issue_number = event.issue_number()?;
        let mut issue = self.tracker.fetch_issue(issue_number).await?;
        info!(
            kind = issue.kind_label(),
            number = issue.number,
            title = %issue.title,
            "running issue bot"
        );
        let initial_labels = issue
            .label_names()
            .into_iter()
            .map(ToOwned::to_owned)
            .collect::<Vec<_>>();

        let event_kind = event.kind();
        let dispatch = match &event_kind {
            EventKind::NewIssue => {
                info!(number = issue.number, "created new issue");
                self.triage_new_content(&mut issue).await?;
                self.on_new_issue(&issue).await?
            }
            EventKind::NewPullRequest => {
                info!(number = issue.number, "created new PR");
                self.triage_new_content(&mut issue).await?;
                self.on_new_pull_request(&issue).await?
            }
            EventKind::Unhandled { action } => {
                info!(
                    action = action.as_deref().unwrap_or("<missing>"),
                    "unhandled event"
                );
                DispatchOutcome::NoAction
            }
        };

        let added_labels = issue
            .labels
            .iter()
            .map(|label| label.name.clone())
            .filter(|name| !initial_labels.contains(name))
            .collect();
        Ok(RunReport {
            event_kind,
            issue_number: issue.number,
            is_pull_request: issue.is_pull_request(),
            added_labels,
            dispatch,
        })
    }

    async fn triage_new_content(&self, issue: &mut GithubIssue) -> Result<()> {
        let title = issue.title.clone();
        self.add_labels_from_text(issue, &title).await?;
        let body = issue.body_text().to_string();
        self.add_labels_from_new_body(issue, &body).await?;
        if !issue.has_os_label() {
            debug!(number = issue.number, "no platform label assigned");
        }
        Ok(())
    }

    /// Apply the label policy: skip assigned labels and illogical combinations.
    pub async fn add_label(&self, issue: &mut GithubIssue, label: &str) -> Result<LabelOutcome> {
        if issue.has_label(label) {
            info!(label, "already has label");
            return Ok(LabelOutcome::AlreadyPresent);
        }
        if let Some(conflict) = illogical_conflict(label, |assigned| issue.has_label(assigned)) {
            info!(label, conflict, "should not add label");
            return Ok(LabelOutcome::Conflicting { conflict });
        }

        info!(label, "add label");
        let labels = self.tracker.add_label(issue.number, label).await?;
        issue.labels = labels;
        if !issue.has_label(label) {
            issue.labels.push(GithubIssueLabel::new(label));
        }
        Ok(LabelOutcome::Added)
    }

    pub async fn add_labels_from_text(
        &self,
        issue: &mut GithubIssue,
        text: &str,
    ) -> Result<Vec<LabelOutcome>> {
        let mut outcomes = Vec::new();
        for hit in self.label_table.classify(text) {
            debug!(label = %hit.label, keyword = %hit.keyword, "keyword matched");
            outcomes.push(self.add_label(issue, &hit.label).await?);
        }
        Ok(outcomes)
    }

    /// Derive labels from the `* OS:`, `* Bug fix:` and `* Type:` template lines.
    pub async fn add_labels_from_new_body(&self, issue: &mut GithubIssue, body: &str) -> Result<()> {
        info!("start searching for template lines in new issue/PR body");

        info!("search for 'OS: ...' line");
        match find_template_field(body, TemplateField::Os) {
            Some(line) => {
                info!("found");
                self.add_labels_from_text(issue, line).await?;
            }
            None => info!("not found"),
        }

        info!("search for 'Bug fix: y/n' line");
        match find_template_field(body, TemplateField::BugFix) {
            Some(line)
                if issue.is_pull_request()
                    && !issue.has_label("bug")
                    && !issue.has_label("enhancement") =>
            {
                info!("found");
                self.add_label(issue, bug_fix_label(line)).await?;
            }
            _ => info!("not found"),
        }

        info!("search for 'Type: ...' line");
        match find_template_field(body, TemplateField::Type) {
            Some(line) => {
                info!("found");
                for label in type_labels(line) {
                    self.add_label(issue, label).await?;
                }
            }
            None => info!("not found"),
        }
        Ok(())
    }

    pub async fn on_new_issue(&self, issue: &GithubIssue) -> Result<DispatchOutcome> {
        info!("searching for missing Python.h");
        let Some(signature) = detect_missing_python_headers(&issue.title, issue.body_text()) else {
            return Ok(DispatchOutcome::NoAction);
        };
        info!(signature, "found");
        self.tracker
            .create_comment(issue.number, REPLY_MISSING_PYTHON_HEADERS)
            .await?;
        self.tracker.close_issue(issue.number).await?;
        Ok(DispatchOutcome::ClosedMissingHeaders)
    }

    /// Hook for pull-request policies. Performs no mutation.
    pub async fn on_new_pull_request(&self, issue: &GithubIssue) -> Result<DispatchOutcome> {
        debug!(number = issue.number, "no pull request policies configured");
        Ok(DispatchOutcome::NoAction)
    }
}
