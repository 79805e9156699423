//! Network-free triage rules for the issuebot runtime.
//! This crate holds the label keyword table, template field parsing, and
//! canned-reply detection consumed by `issuebot-runtime`.

pub mod event_kind;
pub mod issue_model;
pub mod label_table;
pub mod missing_headers;
pub mod template_fields;
