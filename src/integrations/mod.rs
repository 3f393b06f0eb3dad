//! External integrations module.
//!
//! Provides the issue tracker clients that back the workflow engine.

pub mod jira;

pub use jira::{
    format_transition, JiraClient, JiraError, JiraIssue, JiraIssueFields, JiraIssueType,
    JiraResult, JiraStatus, JiraTransition,
};
