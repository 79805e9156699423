//! Event-driven triage runtime for the issuebot GitHub automation.
//!
//! Loads the triggering event, fetches the issue or pull request, applies the
//! label rules from `issuebot-rules`, and posts canned replies.

mod issuebot_runtime;

pub use issuebot_runtime::{
    run_issue_bot, DispatchOutcome, EventLoadError, EventLoader, EventPayload, GithubApiClient,
    IssueBotRuntime, IssueBotRuntimeConfig, IssueTracker, LabelOutcome, RepoRef, RunReport,
};
