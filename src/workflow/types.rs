//! Workflow path data model.
//!
//! A [`WorkflowPath`] is the ordered list of transitions that walks an issue
//! from one state to another. Paths are keyed in the cache by a [`CacheKey`]
//! made of the issue type and the two state names.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A transition reported by the tracker for an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Transition ID
    pub id: String,
    /// Display name (e.g., "Start Progress")
    pub name: String,
    /// Name of the state this transition leads to, when the tracker reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_state: Option<String>,
    /// ID of the state this transition leads to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_state_id: Option<String>,
}

impl Transition {
    /// Create a transition without destination metadata.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), to_state: None, to_state_id: None }
    }

    /// Attach the destination state name.
    pub fn with_to_state(mut self, state: impl Into<String>) -> Self {
        self.to_state = Some(state.into());
        self
    }

    /// Attach the destination state ID.
    pub fn with_to_state_id(mut self, id: impl Into<String>) -> Self {
        self.to_state_id = Some(id.into());
        self
    }
}

/// One edge taken along a workflow path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    /// State the issue is in before the transition
    pub from_state: String,
    /// State the issue is expected to be in afterwards
    pub to_state: String,
    /// Transition display name
    pub transition_name: String,
    /// Transition ID used to apply it
    pub transition_id: String,
}

impl WorkflowStep {
    /// Build a step from a transition taken out of `from_state`.
    pub fn new(from_state: &str, to_state: &str, transition: &Transition) -> Self {
        Self {
            from_state: from_state.to_string(),
            to_state: to_state.to_string(),
            transition_name: transition.name.clone(),
            transition_id: transition.id.clone(),
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {} (via \"{}\")", self.from_state, self.to_state, self.transition_name)
    }
}

/// An ordered walk from a start state to a target state.
///
/// A path with no steps means the issue is already at the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowPath {
    /// Steps in execution order
    pub steps: Vec<WorkflowStep>,
    /// When the path was first discovered
    #[serde(rename = "discoveredDate")]
    pub discovered_at: DateTime<Utc>,
    /// When the path was last executed successfully
    #[serde(rename = "lastUsed")]
    pub last_used_at: DateTime<Utc>,
    /// Number of successful full executions
    #[serde(default)]
    pub usage_count: u32,
}

impl WorkflowPath {
    /// Wrap freshly discovered steps in a new, unused path.
    pub fn new(steps: Vec<WorkflowStep>) -> Self {
        let now = Utc::now();
        Self { steps, discovered_at: now, last_used_at: now, usage_count: 0 }
    }

    /// A path that needs no transitions.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Whether the path has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// State the first step starts from.
    pub fn start_state(&self) -> Option<&str> {
        self.steps.first().map(|s| s.from_state.as_str())
    }

    /// State the last step ends in.
    pub fn target_state(&self) -> Option<&str> {
        self.steps.last().map(|s| s.to_state.as_str())
    }

    /// Return a copy recording one more successful execution.
    pub fn record_use(&self) -> Self {
        let mut updated = self.clone();
        updated.usage_count = updated.usage_count.saturating_add(1);
        updated.last_used_at = Utc::now();
        updated
    }
}

/// Cache key for a path: `"{issue_type}:{from}:{to}"`.
///
/// Keys are exact-match and case-sensitive; "Done" and "done" are different.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Issue type name (e.g., "Task", "Bug")
    pub issue_type: String,
    /// Start state
    pub from_state: String,
    /// Target state
    pub to_state: String,
}

impl CacheKey {
    /// Create a key.
    pub fn new(
        issue_type: impl Into<String>,
        from_state: impl Into<String>,
        to_state: impl Into<String>,
    ) -> Self {
        Self { issue_type: issue_type.into(), from_state: from_state.into(), to_state: to_state.into() }
    }

    /// Prefix shared by every key leaving `from_state` for this issue type.
    pub fn prefix(issue_type: &str, from_state: &str) -> String {
        format!("{}:{}:", issue_type, from_state)
    }

    /// Split a serialized key back into its parts.
    ///
    /// The issue type and start state are taken up to the first two
    /// separators; the remainder is the target state.
    pub fn parse(key: &str) -> Option<Self> {
        let mut parts = key.splitn(3, ':');
        let issue_type = parts.next()?;
        let from_state = parts.next()?;
        let to_state = parts.next()?;
        Some(Self::new(issue_type, from_state, to_state))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.issue_type, self.from_state, self.to_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(from: &str, to: &str) -> WorkflowStep {
        WorkflowStep::new(from, to, &Transition::new("11", format!("Go {}", to)))
    }

    #[test]
    fn test_cache_key_format() {
        let key = CacheKey::new("Task", "To Do", "Done");
        assert_eq!(key.to_string(), "Task:To Do:Done");
        assert_eq!(CacheKey::prefix("Task", "To Do"), "Task:To Do:");
    }

    #[test]
    fn test_cache_key_is_case_sensitive() {
        let upper = CacheKey::new("Task", "To Do", "Done");
        let lower = CacheKey::new("Task", "To Do", "done");
        assert_ne!(upper, lower);
        assert_ne!(upper.to_string(), lower.to_string());
    }

    #[test]
    fn test_cache_key_parse() {
        let key = CacheKey::parse("Bug:Open:Closed: Won't Fix").unwrap();
        assert_eq!(key.issue_type, "Bug");
        assert_eq!(key.from_state, "Open");
        assert_eq!(key.to_state, "Closed: Won't Fix");
        assert!(CacheKey::parse("no-separators").is_none());
    }

    #[test]
    fn test_empty_path() {
        let path = WorkflowPath::empty();
        assert!(path.is_empty());
        assert_eq!(path.usage_count, 0);
        assert!(path.start_state().is_none());
        assert!(path.target_state().is_none());
    }

    #[test]
    fn test_path_endpoints() {
        let path = WorkflowPath::new(vec![step("To Do", "In Progress"), step("In Progress", "Done")]);
        assert_eq!(path.len(), 2);
        assert_eq!(path.start_state(), Some("To Do"));
        assert_eq!(path.target_state(), Some("Done"));
    }

    #[test]
    fn test_record_use_returns_updated_copy() {
        let mut path = WorkflowPath::new(vec![step("To Do", "Done")]);
        path.usage_count = 2;
        let updated = path.record_use();
        assert_eq!(path.usage_count, 2);
        assert_eq!(updated.usage_count, 3);
        assert!(updated.last_used_at >= path.last_used_at);
    }

    #[test]
    fn test_path_json_field_names() {
        let path = WorkflowPath::new(vec![step("To Do", "Done")]);
        let json = serde_json::to_value(&path).unwrap();
        assert!(json.get("discoveredDate").is_some());
        assert!(json.get("lastUsed").is_some());
        assert!(json.get("usageCount").is_some());
        assert_eq!(json["steps"][0]["fromState"], "To Do");
        assert_eq!(json["steps"][0]["transitionName"], "Go Done");
    }

    #[test]
    fn test_step_display() {
        let s = step("To Do", "In Progress");
        assert_eq!(s.to_string(), "To Do → In Progress (via \"Go In Progress\")");
    }
}
