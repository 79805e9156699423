//! Structured lines from the issue and pull request templates.

use std::sync::OnceLock;

use regex::Regex;

/// Type keywords recognised on the `* Type:` line, each mapping to the label of the same name.
pub const TYPE_FIELD_LABELS: &[&str] = &[
    "doc",
    "performance",
    "scripts",
    "tests",
    "wheels",
    "new-api",
    "new-platform",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateField {
    Os,
    BugFix,
    Type,
}

impl TemplateField {
    pub const ALL: [TemplateField; 3] = [Self::Os, Self::BugFix, Self::Type];

    pub fn marker(self) -> &'static str {
        match self {
            Self::Os => "* OS:",
            Self::BugFix => "* Bug fix:",
            Self::Type => "* Type:",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Os => 0,
            Self::BugFix => 1,
            Self::Type => 2,
        }
    }

    fn pattern(self) -> &'static Regex {
        static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
        let patterns = PATTERNS.get_or_init(|| {
            Self::ALL
                .iter()
                .map(|field| {
                    Regex::new(&format!(r"{}.*?\n", regex::escape(field.marker())))
                        .expect("template field pattern compiles")
                })
                .collect()
        });
        &patterns[self.index()]
    }
}

/// Find the first `marker ... \n` span in `body`, newline included.
///
/// A marker on the last line without a trailing newline is not a match.
pub fn find_template_field(body: &str, field: TemplateField) -> Option<&str> {
    field.pattern().find(body).map(|found| found.as_str())
}

/// Label implied by a `* Bug fix:` line: `bug` when it says yes, otherwise `enhancement`.
pub fn bug_fix_label(line: &str) -> &'static str {
    if line.to_lowercase().contains("yes") {
        "bug"
    } else {
        "enhancement"
    }
}

/// Labels implied by a `* Type:` line, in [`TYPE_FIELD_LABELS`] order.
pub fn type_labels(line: &str) -> Vec<&'static str> {
    let line = line.to_lowercase();
    TYPE_FIELD_LABELS
        .iter()
        .copied()
        .filter(|label| line.contains(label))
        .collect()
}
