//! Destination-state resolution for transitions.
//!
//! Jira usually reports where a transition leads. When it does not, the
//! destination has to be guessed from the transition's display name, which
//! only works for workflows that follow common naming. The guessing lives
//! behind [`StateResolver`] so it can be swapped out or disabled.

use super::types::Transition;

/// Decides which state a transition leads to.
pub trait StateResolver: Send + Sync {
    /// Destination state for `transition`, or `None` if it cannot be known.
    fn resolve(&self, transition: &Transition) -> Option<String>;
}

/// Trusts only the destination reported by the tracker.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataResolver;

impl StateResolver for MetadataResolver {
    fn resolve(&self, transition: &Transition) -> Option<String> {
        transition.to_state.clone().filter(|s| !s.is_empty())
    }
}

/// Known transition names and the state they conventionally lead to.
const KNOWN_TRANSITIONS: &[(&str, &str)] = &[
    ("Start Progress", "In Progress"),
    ("Start Work", "In Progress"),
    ("Stop Progress", "To Do"),
    ("Start Review", "In Review"),
    ("Submit for Review", "In Review"),
    ("Request Review", "In Review"),
    ("Resolve Issue", "Resolved"),
    ("Resolve", "Resolved"),
    ("Close Issue", "Closed"),
    ("Close", "Closed"),
    ("Reopen Issue", "Reopened"),
    ("Reopen", "Reopened"),
    ("Done", "Done"),
    ("Complete", "Done"),
    ("Backlog", "Backlog"),
    ("To Do", "To Do"),
    ("In Progress", "In Progress"),
];

/// Prefixes stripped from a transition name to reveal the target state.
const KNOWN_PREFIXES: &[&str] =
    &["Transition to ", "Move to ", "Set to ", "Mark as ", "Go to ", "Back to ", "Send to "];

/// Reported metadata first, then the verb table, then prefix stripping.
///
/// A name that matches neither stays unresolved, so the search never
/// invents states the workflow does not have.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicResolver;

impl HeuristicResolver {
    /// Guess a destination from a display name alone.
    pub fn infer_from_name(name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        if let Some((_, state)) =
            KNOWN_TRANSITIONS.iter().find(|(verb, _)| verb.eq_ignore_ascii_case(name))
        {
            return Some((*state).to_string());
        }

        for prefix in KNOWN_PREFIXES {
            if name.len() > prefix.len()
                && name.is_char_boundary(prefix.len())
                && name[..prefix.len()].eq_ignore_ascii_case(prefix)
            {
                return Some(name[prefix.len()..].trim().to_string());
            }
        }

        None
    }
}

impl StateResolver for HeuristicResolver {
    fn resolve(&self, transition: &Transition) -> Option<String> {
        MetadataResolver.resolve(transition).or_else(|| Self::infer_from_name(&transition.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_resolver_uses_reported_state() {
        let t = Transition::new("21", "Start Progress").with_to_state("Doing");
        assert_eq!(MetadataResolver.resolve(&t), Some("Doing".to_string()));
        assert_eq!(MetadataResolver.resolve(&Transition::new("21", "Start Progress")), None);
    }

    #[test]
    fn test_heuristic_prefers_metadata() {
        let t = Transition::new("21", "Start Progress").with_to_state("Doing");
        assert_eq!(HeuristicResolver.resolve(&t), Some("Doing".to_string()));
    }

    #[test]
    fn test_heuristic_verb_table() {
        let t = Transition::new("21", "Start Progress");
        assert_eq!(HeuristicResolver.resolve(&t), Some("In Progress".to_string()));
        let t = Transition::new("31", "resolve issue");
        assert_eq!(HeuristicResolver.resolve(&t), Some("Resolved".to_string()));
    }

    #[test]
    fn test_heuristic_prefix_stripping() {
        assert_eq!(HeuristicResolver::infer_from_name("Move to QA"), Some("QA".to_string()));
        assert_eq!(
            HeuristicResolver::infer_from_name("Transition to Ready for Release"),
            Some("Ready for Release".to_string())
        );
        assert_eq!(HeuristicResolver::infer_from_name("Mark as Blocked"), Some("Blocked".to_string()));
    }

    #[test]
    fn test_heuristic_unknown_name_unresolved() {
        assert_eq!(HeuristicResolver::infer_from_name("Deployed"), None);
        assert_eq!(HeuristicResolver::infer_from_name("   "), None);
        assert_eq!(HeuristicResolver.resolve(&Transition::new("71", "Ship It")), None);
    }

    #[test]
    fn test_heuristic_bare_prefix_is_not_stripped() {
        assert_eq!(HeuristicResolver::infer_from_name("Move to "), None);
    }
}
