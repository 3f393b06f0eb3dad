//! Core types and functionality for Jiraflow.
//!
//! Currently holds configuration loading and cache directory resolution.

mod config;

pub use config::{Config, JiraConfig, WorkflowConfig, CACHE_DIR_ENV};
