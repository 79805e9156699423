#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates the triggering events the bot reacts to.
pub enum EventKind {
    NewIssue,
    NewPullRequest,
    Unhandled { action: Option<String> },
}

impl EventKind {
    /// Classify an event from its `action` and which payload objects it carries.
    pub fn from_parts(action: Option<&str>, has_issue: bool, has_pull_request: bool) -> Self {
        match action {
            Some("opened") if has_issue => Self::NewIssue,
            Some("opened") if has_pull_request => Self::NewPullRequest,
            other => Self::Unhandled {
                action: other.map(ToOwned::to_owned),
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewIssue => "new_issue",
            Self::NewPullRequest => "new_pull_request",
            Self::Unhandled { .. } => "unhandled",
        }
    }

    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::Unhandled { .. })
    }
}
