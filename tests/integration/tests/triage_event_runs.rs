use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use anyhow::{bail, Result};
use async_trait::async_trait;
use issuebot_rules::event_kind::EventKind;
use issuebot_rules::issue_model::{GithubIssue, GithubIssueLabel};
use issuebot_rules::label_table::LabelKeywordTable;
use issuebot_rules::missing_headers::REPLY_MISSING_PYTHON_HEADERS;
use issuebot_runtime::{DispatchOutcome, EventLoader, IssueBotRuntime, IssueTracker};
use serde_json::{json, Value};
use tempfile::tempdir;

#[derive(Debug, Clone, PartialEq, Eq)]
enum RemoteMutation {
    AddLabel(String),
    Comment(String),
    Close,
}

/// In-memory stand-in for the GitHub issue endpoints.
struct ScriptedTracker {
    issue: Mutex<GithubIssue>,
    mutations: Mutex<Vec<RemoteMutation>>,
    fail_label: Option<String>,
}

impl ScriptedTracker {
    fn new(issue: GithubIssue) -> Arc<Self> {
        Arc::new(Self {
            issue: Mutex::new(issue),
            mutations: Mutex::new(Vec::new()),
            fail_label: None,
        })
    }

    fn failing_on(issue: GithubIssue, label: &str) -> Arc<Self> {
        Arc::new(Self {
            issue: Mutex::new(issue),
            mutations: Mutex::new(Vec::new()),
            fail_label: Some(label.to_string()),
        })
    }

    fn mutations(&self) -> Vec<RemoteMutation> {
        self.mutations.lock().expect("mutations lock").clone()
    }

    fn remote_labels(&self) -> Vec<String> {
        self.issue
            .lock()
            .expect("issue lock")
            .labels
            .iter()
            .map(|label| label.name.clone())
            .collect()
    }

    fn remote_state(&self) -> String {
        self.issue.lock().expect("issue lock").state.clone()
    }
}

#[async_trait]
impl IssueTracker for ScriptedTracker {
    async fn fetch_issue(&self, number: u64) -> Result<GithubIssue> {
        let issue = self.issue.lock().expect("issue lock").clone();
        if issue.number != number {
            bail!("github api fetch issue failed with status 404: Not Found");
        }
        Ok(issue)
    }

    async fn add_label(&self, _number: u64, label: &str) -> Result<Vec<GithubIssueLabel>> {
        if self.fail_label.as_deref() == Some(label) {
            bail!("github api add issue labels failed with status 500: boom");
        }
        self.mutations
            .lock()
            .expect("mutations lock")
            .push(RemoteMutation::AddLabel(label.to_string()));
        let mut issue = self.issue.lock().expect("issue lock");
        if !issue.has_label(label) {
            issue.labels.push(GithubIssueLabel::new(label));
        }
        Ok(issue.labels.clone())
    }

    async fn create_comment(&self, _number: u64, body: &str) -> Result<()> {
        self.mutations
            .lock()
            .expect("mutations lock")
            .push(RemoteMutation::Comment(body.to_string()));
        Ok(())
    }

    async fn close_issue(&self, _number: u64) -> Result<()> {
        self.mutations
            .lock()
            .expect("mutations lock")
            .push(RemoteMutation::Close);
        self.issue.lock().expect("issue lock").state = "closed".to_string();
        Ok(())
    }
}

fn remote_issue(number: u64, title: &str, body: Option<&str>, pull_request: bool) -> GithubIssue {
    GithubIssue {
        id: number * 10,
        number,
        title: title.to_string(),
        body: body.map(ToOwned::to_owned),
        state: "open".to_string(),
        labels: Vec::new(),
        pull_request: pull_request
            .then(|| json!({"url": format!("https://api.github.com/repos/o/r/pulls/{number}")})),
    }
}

fn write_event(dir: &Path, event: &Value) -> EventLoader {
    let path = dir.join("event.json");
    std::fs::write(&path, event.to_string()).expect("write event");
    EventLoader::new(path)
}

#[tokio::test]
async fn integration_new_issue_event_file_labels_replies_and_closes() {
    let temp = tempdir().expect("tempdir");
    let events = write_event(
        temp.path(),
        &json!({
            "action": "opened",
            "issue": {"number": 1501, "title": "build fails"},
            "repository": {"full_name": "o/r"}
        }),
    );
    let tracker = ScriptedTracker::new(remote_issue(
        1501,
        "build fails",
        Some("* OS: Ubuntu 20.04\r\nfatal error: Python.h: No such file or directory\n"),
        false,
    ));
    let runtime =
        IssueBotRuntime::with_tracker(events, tracker.clone(), LabelKeywordTable::builtin());

    let report = runtime.run().await.expect("run");
    assert_eq!(report.event_kind, EventKind::NewIssue);
    assert_eq!(report.dispatch, DispatchOutcome::ClosedMissingHeaders);
    assert_eq!(
        tracker.mutations(),
        vec![
            RemoteMutation::AddLabel("bug".to_string()),
            RemoteMutation::AddLabel("linux".to_string()),
            RemoteMutation::Comment(REPLY_MISSING_PYTHON_HEADERS.to_string()),
            RemoteMutation::Close,
        ]
    );
    assert_eq!(tracker.remote_state(), "closed");
}

#[tokio::test]
async fn integration_new_pull_request_uses_template_fields() {
    let temp = tempdir().expect("tempdir");
    let events = write_event(
        temp.path(),
        &json!({"action": "opened", "pull_request": {"number": 77}}),
    );
    let body = "## Summary\n\n* OS: all\n* Bug fix: no\n* Type: wheels, new-api\n* Fixes: -\n";
    let tracker = ScriptedTracker::new(remote_issue(77, "Add ARM64 builds", Some(body), true));
    let runtime =
        IssueBotRuntime::with_tracker(events, tracker.clone(), LabelKeywordTable::builtin());

    let report = runtime.run().await.expect("run");
    assert!(report.is_pull_request);
    assert_eq!(report.dispatch, DispatchOutcome::NoAction);
    assert_eq!(
        tracker.remote_labels(),
        vec![
            "enhancement".to_string(),
            "wheels".to_string(),
            "new-api".to_string()
        ]
    );
}

#[tokio::test]
async fn integration_rerun_on_labelled_issue_is_idempotent() {
    let temp = tempdir().expect("tempdir");
    let event = json!({"action": "opened", "issue": {"number": 9}});
    let tracker = ScriptedTracker::new(remote_issue(
        9,
        "Memory leak on FreeBSD",
        Some("* OS: FreeBSD 14\n* Type: performance\n"),
        false,
    ));

    let first = IssueBotRuntime::with_tracker(
        write_event(temp.path(), &event),
        tracker.clone(),
        LabelKeywordTable::builtin(),
    );
    first.run().await.expect("first run");
    let after_first = tracker.mutations();
    assert_eq!(
        after_first,
        vec![
            RemoteMutation::AddLabel("freebsd".to_string()),
            RemoteMutation::AddLabel("memleak".to_string()),
            RemoteMutation::AddLabel("performance".to_string()),
        ]
    );

    let second = IssueBotRuntime::with_tracker(
        write_event(temp.path(), &event),
        tracker.clone(),
        LabelKeywordTable::builtin(),
    );
    let report = second.run().await.expect("second run");
    assert!(report.added_labels.is_empty());
    assert_eq!(tracker.mutations(), after_first);
}

#[tokio::test]
async fn integration_comment_event_is_logged_without_mutation() {
    let temp = tempdir().expect("tempdir");
    let events = write_event(
        temp.path(),
        &json!({
            "action": "created",
            "issue": {"number": 3},
            "comment": {"id": 1, "body": "missing python.h again"}
        }),
    );
    let tracker = ScriptedTracker::new(remote_issue(3, "missing Python.h", None, false));
    let runtime =
        IssueBotRuntime::with_tracker(events, tracker.clone(), LabelKeywordTable::builtin());

    let report = runtime.run().await.expect("run");
    assert!(!report.event_kind.is_handled());
    assert!(tracker.mutations().is_empty());
}

#[tokio::test]
async fn integration_script_keywords_label_scripts_issues() {
    let temp = tempdir().expect("tempdir");
    let events = write_event(
        temp.path(),
        &json!({"action": "opened", "issue": {"number": 12}}),
    );
    let tracker = ScriptedTracker::new(remote_issue(
        12,
        "iotop.py prints negative values",
        Some(""),
        false,
    ));
    let table = LabelKeywordTable::builtin().with_script_keywords(["iotop.py", "nettop.py"]);
    let runtime = IssueBotRuntime::with_tracker(events, tracker.clone(), table);

    let report = runtime.run().await.expect("run");
    assert_eq!(report.added_labels, vec!["scripts".to_string()]);
}

#[tokio::test]
async fn integration_remote_failure_aborts_run_and_keeps_earlier_labels() {
    let temp = tempdir().expect("tempdir");
    let events = write_event(
        temp.path(),
        &json!({"action": "opened", "issue": {"number": 5}}),
    );
    let tracker = ScriptedTracker::failing_on(
        remote_issue(
            5,
            "Crash on macOS",
            Some("missing python.h\n"),
            false,
        ),
        "bug",
    );
    let runtime =
        IssueBotRuntime::with_tracker(events, tracker.clone(), LabelKeywordTable::builtin());

    let error = runtime.run().await.expect_err("label failure should abort");
    assert!(error.to_string().contains("status 500"));
    assert_eq!(
        tracker.mutations(),
        vec![RemoteMutation::AddLabel("macos".to_string())]
    );
}

#[tokio::test]
async fn integration_malformed_event_fails_before_any_remote_call() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("event.json");
    std::fs::write(&path, "{\"action\": \"opened\"").expect("write event");
    let tracker = ScriptedTracker::new(remote_issue(1, "t", None, false));
    let runtime = IssueBotRuntime::with_tracker(
        EventLoader::new(&path),
        tracker.clone(),
        LabelKeywordTable::builtin(),
    );

    let error = runtime.run().await.expect_err("malformed event");
    assert!(error.to_string().contains("failed to parse event file"));
    assert!(tracker.mutations().is_empty());
}
