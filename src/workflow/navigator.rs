//! Get-or-discover facade over the cache, explorer and executor.

use std::sync::Arc;
use std::time::Duration;

use super::cache::{PathCache, PathSuggestion};
use super::error::{require, WorkflowResult};
use super::executor::{
    Confirmer, ExecutionReport, StdinConfirmer, WorkflowExecutor, DEFAULT_STEP_DELAY,
};
use super::explorer::PathExplorer;
use super::oracle::TransitionOracle;
use super::resolver::{HeuristicResolver, StateResolver};
use super::types::WorkflowPath;

/// Where an issue stands, as reported by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSnapshot {
    /// Issue key
    pub issue_id: String,
    /// Issue type name
    pub issue_type: String,
    /// Current state name
    pub state: String,
}

/// Ties the path cache, the explorer and the executor together.
pub struct WorkflowNavigator {
    oracle: Arc<dyn TransitionOracle>,
    cache: PathCache,
    resolver: Box<dyn StateResolver>,
    confirmer: Box<dyn Confirmer>,
    step_delay: Duration,
}

impl WorkflowNavigator {
    /// Create a navigator with heuristic state resolution and stdin prompts.
    pub fn new(oracle: Arc<dyn TransitionOracle>, cache: PathCache) -> Self {
        Self {
            oracle,
            cache,
            resolver: Box::new(HeuristicResolver),
            confirmer: Box::new(StdinConfirmer),
            step_delay: DEFAULT_STEP_DELAY,
        }
    }

    /// Replace the state resolver.
    pub fn with_resolver(mut self, resolver: Box<dyn StateResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the confirmation channel.
    pub fn with_confirmer(mut self, confirmer: Box<dyn Confirmer>) -> Self {
        self.confirmer = confirmer;
        self
    }

    /// Set the pause taken after each applied transition.
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// The underlying path cache.
    pub fn cache(&self) -> &PathCache {
        &self.cache
    }

    /// Mutable access to the underlying path cache.
    pub fn cache_mut(&mut self) -> &mut PathCache {
        &mut self.cache
    }

    /// Read the issue's type and current state.
    pub async fn snapshot(&self, issue_id: &str) -> WorkflowResult<IssueSnapshot> {
        require(issue_id, "issue id")?;
        let state = self.oracle.current_state(issue_id).await?;
        let issue_type = self.oracle.issue_type(issue_id).await?;
        Ok(IssueSnapshot { issue_id: issue_id.to_string(), issue_type, state })
    }

    /// Discover a fresh path to `target_state` and cache it, ignoring any
    /// cached entry.
    pub async fn discover_path(
        &mut self,
        issue_id: &str,
        target_state: &str,
    ) -> WorkflowResult<Option<WorkflowPath>> {
        require(target_state, "target state")?;
        let snapshot = self.snapshot(issue_id).await?;
        Ok(self.discover_from(&snapshot, target_state).await)
    }

    /// Return the cached path to `target_state`, discovering one on a miss.
    ///
    /// Failed discoveries are not cached and are retried on the next call.
    pub async fn get_path(
        &mut self,
        issue_id: &str,
        target_state: &str,
    ) -> WorkflowResult<Option<WorkflowPath>> {
        require(target_state, "target state")?;
        let snapshot = self.snapshot(issue_id).await?;

        if let Some(path) = self.cache.get(&snapshot.issue_type, &snapshot.state, target_state) {
            tracing::info!(
                issue = issue_id,
                from = %snapshot.state,
                to = target_state,
                steps = path.len(),
                "Using cached workflow path"
            );
            return Ok(Some(path.clone()));
        }

        Ok(self.discover_from(&snapshot, target_state).await)
    }

    async fn discover_from(
        &mut self,
        snapshot: &IssueSnapshot,
        target_state: &str,
    ) -> Option<WorkflowPath> {
        let explorer = PathExplorer::new(self.oracle.as_ref(), self.resolver.as_ref());
        let discovery = explorer.discover(&snapshot.issue_id, &snapshot.state, target_state).await;

        let path = discovery.path?;
        self.cache.put(&snapshot.issue_type, &snapshot.state, target_state, path.clone());
        Some(path)
    }

    /// Execute `path` against the issue and persist updated usage on success.
    pub async fn execute(
        &mut self,
        issue_id: &str,
        path: &WorkflowPath,
        interactive: bool,
    ) -> WorkflowResult<ExecutionReport> {
        require(issue_id, "issue id")?;

        // Read before any transition moves the issue
        let issue_type =
            if path.is_empty() { None } else { Some(self.oracle.issue_type(issue_id).await?) };

        let executor = WorkflowExecutor::new(self.oracle.as_ref(), self.confirmer.as_ref())
            .with_step_delay(self.step_delay);
        let report = executor.execute(issue_id, path, interactive).await?;

        if let (true, Some(issue_type)) = (report.succeeded(), issue_type) {
            if let (Some(from), Some(to)) = (path.start_state(), path.target_state()) {
                self.cache.put(&issue_type, from, to, report.path.clone());
            }
        }

        Ok(report)
    }

    /// Get or discover a path to `target_state`, then execute it.
    ///
    /// Returns `None` when no path exists.
    pub async fn transition_to(
        &mut self,
        issue_id: &str,
        target_state: &str,
        interactive: bool,
    ) -> WorkflowResult<Option<ExecutionReport>> {
        let Some(path) = self.get_path(issue_id, target_state).await? else {
            return Ok(None);
        };
        self.execute(issue_id, &path, interactive).await.map(Some)
    }

    /// Most-used cached destinations for an issue type and state.
    pub fn suggestions(
        &self,
        issue_type: &str,
        from_state: &str,
        limit: usize,
    ) -> Vec<PathSuggestion> {
        self.cache.top_suggestions(issue_type, from_state, limit)
    }

    /// Most-used cached destinations from the issue's current state.
    pub async fn suggestions_for_issue(
        &self,
        issue_id: &str,
        limit: usize,
    ) -> WorkflowResult<(IssueSnapshot, Vec<PathSuggestion>)> {
        let snapshot = self.snapshot(issue_id).await?;
        let suggestions = self.suggestions(&snapshot.issue_type, &snapshot.state, limit);
        Ok((snapshot, suggestions))
    }
}
