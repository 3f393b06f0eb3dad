//! In-memory oracle backed by a complete workflow graph.
//!
//! Unlike a live tracker, [`GraphOracle`] can answer "what transitions leave
//! state X" for any X, and it moves its single simulated issue between
//! states as transitions are applied. Useful for tests, benchmarks and
//! dry runs against a known workflow.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::oracle::{OracleError, OracleResult, TransitionOracle};
use super::resolver::HeuristicResolver;
use super::types::Transition;

/// Workflow graph oracle for a single simulated issue.
#[derive(Debug)]
pub struct GraphOracle {
    /// Issue type reported for every issue
    issue_type: String,
    /// Current state of the simulated issue
    state: Mutex<String>,
    /// Outgoing transitions per state, in report order
    edges: HashMap<String, Vec<Transition>>,
    /// States whose transition queries fail
    failing_states: HashSet<String>,
    /// Transition IDs that land somewhere other than advertised
    drift: HashMap<String, String>,
    /// Zero-based apply call that should fail
    fail_apply_at: Option<usize>,
    /// Transition IDs applied so far
    applied: Mutex<Vec<String>>,
}

impl GraphOracle {
    /// Create an oracle whose issue starts in `state`.
    pub fn new(issue_type: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            issue_type: issue_type.into(),
            state: Mutex::new(state.into()),
            edges: HashMap::new(),
            failing_states: HashSet::new(),
            drift: HashMap::new(),
            fail_apply_at: None,
            applied: Mutex::new(Vec::new()),
        }
    }

    /// Add a transition with a known destination.
    pub fn with_edge(self, from: &str, id: &str, name: &str, to: &str) -> Self {
        self.with_transition(from, Transition::new(id, name).with_to_state(to))
    }

    /// Add a transition as-is (possibly without destination metadata).
    pub fn with_transition(mut self, from: &str, transition: Transition) -> Self {
        self.edges.entry(from.to_string()).or_default().push(transition);
        self
    }

    /// Make transition queries from `state` fail.
    pub fn failing_state(mut self, state: &str) -> Self {
        self.failing_states.insert(state.to_string());
        self
    }

    /// Make transition `id` land in `actual` instead of its advertised state.
    pub fn drifting(mut self, id: &str, actual: &str) -> Self {
        self.drift.insert(id.to_string(), actual.to_string());
        self
    }

    /// Make the `index`-th apply call (zero-based) fail.
    pub fn fail_apply_at(mut self, index: usize) -> Self {
        self.fail_apply_at = Some(index);
        self
    }

    /// Current state of the simulated issue.
    pub fn state(&self) -> String {
        self.state.lock().clone()
    }

    /// Transition IDs applied so far, in order.
    pub fn applied(&self) -> Vec<String> {
        self.applied.lock().clone()
    }

    fn outgoing(&self, state: &str) -> OracleResult<Vec<Transition>> {
        if self.failing_states.contains(state) {
            return Err(OracleError::new(format!("Transitions unavailable for state '{}'", state)));
        }
        Ok(self.edges.get(state).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl TransitionOracle for GraphOracle {
    async fn current_state(&self, _issue_id: &str) -> OracleResult<String> {
        Ok(self.state())
    }

    async fn issue_type(&self, _issue_id: &str) -> OracleResult<String> {
        Ok(self.issue_type.clone())
    }

    async fn available_transitions(&self, _issue_id: &str) -> OracleResult<Vec<Transition>> {
        let transitions = self.outgoing(&self.state())?;
        Ok(transitions.into_iter().map(|t| Transition::new(t.id, t.name)).collect())
    }

    async fn detailed_available_transitions(
        &self,
        _issue_id: &str,
    ) -> OracleResult<Vec<Transition>> {
        self.outgoing(&self.state())
    }

    async fn apply_transition(&self, _issue_id: &str, transition_id: &str) -> OracleResult<()> {
        let call = {
            let mut applied = self.applied.lock();
            applied.push(transition_id.to_string());
            applied.len() - 1
        };

        if self.fail_apply_at == Some(call) {
            return Err(OracleError::new(format!("Transition {} was rejected", transition_id)));
        }

        let mut state = self.state.lock();
        let transition = self
            .edges
            .get(state.as_str())
            .and_then(|ts| ts.iter().find(|t| t.id == transition_id))
            .ok_or_else(|| {
                OracleError::new(format!(
                    "Transition {} is not available from '{}'",
                    transition_id, state
                ))
            })?;

        let next = match self.drift.get(transition_id) {
            Some(actual) => actual.clone(),
            None => transition
                .to_state
                .clone()
                .or_else(|| HeuristicResolver::infer_from_name(&transition.name))
                .unwrap_or_else(|| state.clone()),
        };
        *state = next;
        Ok(())
    }

    async fn transitions_from(&self, _issue_id: &str, state: &str) -> OracleResult<Vec<Transition>> {
        self.outgoing(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oracle() -> GraphOracle {
        GraphOracle::new("Task", "To Do")
            .with_edge("To Do", "11", "Start Progress", "In Progress")
            .with_edge("In Progress", "31", "Done", "Done")
    }

    #[tokio::test]
    async fn test_apply_moves_state() {
        let oracle = oracle();
        oracle.apply_transition("PROJ-1", "11").await.unwrap();
        assert_eq!(oracle.current_state("PROJ-1").await.unwrap(), "In Progress");
        assert_eq!(oracle.applied(), vec!["11"]);
    }

    #[tokio::test]
    async fn test_apply_rejects_unavailable_transition() {
        let oracle = oracle();
        assert!(oracle.apply_transition("PROJ-1", "31").await.is_err());
        assert_eq!(oracle.state(), "To Do");
    }

    #[tokio::test]
    async fn test_plain_list_has_no_destinations() {
        let oracle = oracle();
        let plain = oracle.available_transitions("PROJ-1").await.unwrap();
        assert_eq!(plain.len(), 1);
        assert!(plain[0].to_state.is_none());

        let detailed = oracle.detailed_available_transitions("PROJ-1").await.unwrap();
        assert_eq!(detailed[0].to_state.as_deref(), Some("In Progress"));
    }

    #[tokio::test]
    async fn test_transitions_from_any_state() {
        let oracle = oracle();
        let from_progress = oracle.transitions_from("PROJ-1", "In Progress").await.unwrap();
        assert_eq!(from_progress[0].id, "31");
        assert!(oracle.transitions_from("PROJ-1", "Nowhere").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drift_and_failures() {
        let oracle = oracle().drifting("11", "Blocked").fail_apply_at(1);
        oracle.apply_transition("PROJ-1", "11").await.unwrap();
        assert_eq!(oracle.state(), "Blocked");
        assert!(oracle.apply_transition("PROJ-1", "31").await.is_err());
    }
}
