use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use issuebot_rules::event_kind::EventKind;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
/// Failures reading the event description written by the workflow runner.
pub enum EventLoadError {
    #[error("failed to read event file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse event file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("event payload carries neither issue.number nor pull_request.number")]
    MissingIssueNumber,
}

#[derive(Debug, Clone, PartialEq)]
/// Parsed webhook payload for the event that triggered this run.
pub struct EventPayload {
    raw: Value,
}

impl EventPayload {
    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn action(&self) -> Option<&str> {
        self.raw.get("action").and_then(Value::as_str)
    }

    pub fn kind(&self) -> EventKind {
        EventKind::from_parts(
            self.action(),
            self.raw.get("issue").is_some(),
            self.raw.get("pull_request").is_some(),
        )
    }

    /// `issue.number`, falling back to `pull_request.number`.
    pub fn issue_number(&self) -> Result<u64, EventLoadError> {
        ["issue", "pull_request"]
            .iter()
            .find_map(|field| {
                self.raw
                    .get(field)
                    .and_then(|object| object.get("number"))
                    .and_then(Value::as_u64)
            })
            .ok_or(EventLoadError::MissingIssueNumber)
    }
}

#[derive(Debug)]
/// Reads the event file on first use and serves the cached parse afterwards.
pub struct EventLoader {
    path: PathBuf,
    cached: OnceLock<EventPayload>,
}

impl EventLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: OnceLock::new(),
        }
    }

    /// Loader whose payload is already known; `load` never touches the filesystem.
    pub fn from_payload(payload: EventPayload) -> Self {
        let cached = OnceLock::new();
        let _ = cached.set(payload);
        Self {
            path: PathBuf::new(),
            cached,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<&EventPayload, EventLoadError> {
        if let Some(payload) = self.cached.get() {
            return Ok(payload);
        }
        let payload = read_event_payload(&self.path)?;
        debug!(
            path = %self.path.display(),
            payload = %payload.raw,
            "loaded event payload"
        );
        Ok(self.cached.get_or_init(|| payload))
    }
}

fn read_event_payload(path: &Path) -> Result<EventPayload, EventLoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| EventLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str::<Value>(&raw).map_err(|source| EventLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(EventPayload::from_value(value))
}
