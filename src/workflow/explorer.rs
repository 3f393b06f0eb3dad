//! Depth-first discovery of workflow paths.
//!
//! The explorer walks outward from the issue's current state, asking the
//! oracle for transitions at each state it stands in and resolving where
//! each one leads. States on the current branch are never re-entered, so a
//! cyclic workflow cannot trap the search.

use std::collections::HashSet;

use futures::future::BoxFuture;

use super::oracle::TransitionOracle;
use super::resolver::StateResolver;
use super::types::{WorkflowPath, WorkflowStep};

/// Bookkeeping for a single discovery call.
#[derive(Debug, Default)]
struct Search {
    /// Steps on the branch currently being explored
    steps: Vec<WorkflowStep>,
    /// States on the branch currently being explored
    visited: HashSet<String>,
    /// Number of oracle queries issued
    queries: usize,
}

/// Outcome of a discovery call, with search statistics.
#[derive(Debug, Clone)]
pub struct Discovery {
    /// The path found, if any
    pub path: Option<WorkflowPath>,
    /// Number of states whose transitions were queried
    pub states_examined: usize,
}

/// Path finder over the transitions reported by a [`TransitionOracle`].
pub struct PathExplorer<'a> {
    oracle: &'a dyn TransitionOracle,
    resolver: &'a dyn StateResolver,
}

impl<'a> PathExplorer<'a> {
    /// Create an explorer.
    pub fn new(oracle: &'a dyn TransitionOracle, resolver: &'a dyn StateResolver) -> Self {
        Self { oracle, resolver }
    }

    /// Find a path from `start_state` to `target_state`.
    ///
    /// Returns `None` when every reachable branch dead-ends. Oracle errors
    /// are logged and treated as a state with no way out.
    pub async fn discover(
        &self,
        issue_id: &str,
        start_state: &str,
        target_state: &str,
    ) -> Discovery {
        tracing::info!(
            issue = issue_id,
            from = start_state,
            to = target_state,
            "Discovering workflow path"
        );

        let mut search = Search::default();
        let found = self.explore(issue_id, start_state.to_string(), target_state, &mut search).await;

        let path = if found {
            tracing::info!(issue = issue_id, steps = search.steps.len(), "Workflow path found");
            Some(WorkflowPath::new(search.steps))
        } else {
            tracing::info!(
                issue = issue_id,
                from = start_state,
                to = target_state,
                "No workflow path found"
            );
            None
        };

        Discovery { path, states_examined: search.queries }
    }

    fn explore<'s>(
        &'s self,
        issue_id: &'s str,
        current: String,
        target: &'s str,
        search: &'s mut Search,
    ) -> BoxFuture<'s, bool> {
        Box::pin(async move {
            if current == target {
                return true;
            }
            if search.visited.contains(&current) {
                return false;
            }
            search.visited.insert(current.clone());

            search.queries += 1;
            let transitions = match self.oracle.transitions_from(issue_id, &current).await {
                Ok(transitions) => transitions,
                Err(e) => {
                    tracing::warn!(
                        issue = issue_id,
                        state = %current,
                        error = %e,
                        "Failed to fetch transitions, treating state as a dead end"
                    );
                    Vec::new()
                }
            };

            tracing::info!(state = %current, count = transitions.len(), "Exploring state");

            for transition in &transitions {
                let Some(next) = self.resolver.resolve(transition) else {
                    tracing::debug!(
                        transition = %transition.name,
                        "Cannot tell where transition leads, skipping"
                    );
                    continue;
                };

                if search.visited.contains(&next) {
                    continue;
                }

                tracing::info!(
                    from = %current,
                    to = %next,
                    via = %transition.name,
                    "Trying transition"
                );
                search.steps.push(WorkflowStep::new(&current, &next, transition));

                if self.explore(issue_id, next, target, &mut *search).await {
                    return true;
                }

                search.steps.pop();
            }

            // Let other branches pass back through this state
            search.visited.remove(&current);
            false
        })
    }
}
