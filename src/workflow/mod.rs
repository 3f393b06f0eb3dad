//! Workflow path discovery and execution.
//!
//! Moves an issue to a target state without invoking each transition by hand.
//!
//! ## Components
//!
//! - `PathCache` - Discovered paths keyed by issue type and state pair, one JSON file per project
//! - `PathExplorer` - Depth-first search over the transitions a tracker reports
//! - `WorkflowExecutor` - Applies a path step by step and verifies each resulting state
//! - `WorkflowNavigator` - Get-or-discover facade over the three
//!
//! The tracker itself is reached through the `TransitionOracle` trait.

mod cache;
mod error;
mod executor;
mod explorer;
mod memory;
mod navigator;
mod oracle;
mod resolver;
mod types;

pub use cache::{CacheDocument, PathCache, PathSuggestion, DEFAULT_CACHE_FILE};
pub use error::{WorkflowError, WorkflowResult};
pub use executor::{
    AutoConfirm, Confirmer, ExecutionOutcome, ExecutionReport, StdinConfirmer, WorkflowExecutor,
    DEFAULT_STEP_DELAY,
};
pub use explorer::{Discovery, PathExplorer};
pub use memory::GraphOracle;
pub use navigator::{IssueSnapshot, WorkflowNavigator};
pub use oracle::{OracleError, OracleResult, TransitionOracle};
pub use resolver::{HeuristicResolver, MetadataResolver, StateResolver};
pub use types::{CacheKey, Transition, WorkflowPath, WorkflowStep};
