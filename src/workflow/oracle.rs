//! Issue tracker capability consumed by the workflow engine.
//!
//! The engine never talks HTTP itself. Everything it knows about an issue's
//! state and its outgoing transitions comes through [`TransitionOracle`].

use async_trait::async_trait;

use super::types::Transition;

/// Error raised by a [`TransitionOracle`] implementation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct OracleError {
    message: String,
}

impl OracleError {
    /// Create an error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Result type for oracle calls.
pub type OracleResult<T> = Result<T, OracleError>;

/// Source of truth for issue state and transitions.
#[async_trait]
pub trait TransitionOracle: Send + Sync {
    /// Name of the state the issue is currently in.
    async fn current_state(&self, issue_id: &str) -> OracleResult<String>;

    /// Declared type of the issue (e.g., "Task", "Bug").
    async fn issue_type(&self, issue_id: &str) -> OracleResult<String>;

    /// Transitions available from the issue's current state, without
    /// destination metadata.
    async fn available_transitions(&self, issue_id: &str) -> OracleResult<Vec<Transition>>;

    /// Transitions available from the issue's current state, with the
    /// destination state filled in where the tracker can report it.
    async fn detailed_available_transitions(&self, issue_id: &str)
        -> OracleResult<Vec<Transition>>;

    /// Apply a transition by ID.
    async fn apply_transition(&self, issue_id: &str, transition_id: &str) -> OracleResult<()>;

    /// Transitions the search should consider when standing in `state`.
    ///
    /// A live tracker only knows the transitions of the issue's real current
    /// state, so the default ignores `state` and reports those. Oracles
    /// backed by a full workflow graph override this to answer per state.
    ///
    /// When the detailed query fails the plain list is used instead, leaving
    /// destinations to be inferred from transition names.
    async fn transitions_from(&self, issue_id: &str, state: &str) -> OracleResult<Vec<Transition>> {
        match self.detailed_available_transitions(issue_id).await {
            Ok(transitions) => Ok(transitions),
            Err(e) => {
                tracing::debug!(
                    issue = issue_id,
                    state,
                    error = %e,
                    "Detailed transitions unavailable, using plain list"
                );
                self.available_transitions(issue_id).await
            }
        }
    }
}
