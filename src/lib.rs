//! # Jiraflow
//!
//! Move Jira issues through multi-step workflows from your terminal.
//!
//! Jiraflow finds a sequence of transitions from an issue's current status to
//! the status you ask for, remembers it per issue type, and replays it while
//! checking that every step landed where it should.
//!
//! ## Features
//!
//! - **Path Discovery**: Depth-first search over the transitions Jira reports
//! - **Path Cache**: Discovered paths are reused per issue type and project
//! - **Verified Execution**: Each step's resulting status is re-read and checked
//! - **Suggestions**: Most-used destinations from the current status
//!
//! ## Quick Start
//!
//! ```bash
//! export JIRA_BASE_URL=https://example.atlassian.net
//! export JIRA_EMAIL=me@example.com
//! export JIRA_API_TOKEN=...
//!
//! # Move an issue to Done, confirming the plan first
//! jiraflow move PROJ-123 Done
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::use_self)]
#![allow(clippy::future_not_send)]

pub mod core;
pub mod integrations;
pub mod workflow;

pub use integrations::{JiraClient, JiraError};
pub use workflow::{
    CacheKey, ExecutionOutcome, ExecutionReport, PathCache, PathExplorer, PathSuggestion,
    StateResolver, Transition, TransitionOracle, WorkflowError, WorkflowExecutor,
    WorkflowNavigator, WorkflowPath, WorkflowStep,
};

// Re-export commonly used types
pub use core::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "jiraflow";
