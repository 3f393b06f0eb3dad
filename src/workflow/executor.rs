//! Step-by-step execution of workflow paths.
//!
//! Each step is applied through the oracle and then verified by re-reading
//! the issue's state. A state that differs from the expected one is
//! recorded as a warning and execution moves on; the tracker is the source
//! of truth. An oracle error stops the run, and steps already applied stay
//! applied.

use std::io::{self, Write};
use std::time::Duration;

use super::error::{require, WorkflowResult};
use super::oracle::TransitionOracle;
use super::types::WorkflowPath;

/// Default pause between applying a transition and re-reading the state.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(1000);

/// Asks a human whether to go ahead.
pub trait Confirmer: Send + Sync {
    /// Return `true` to proceed.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Prompts on stdout and reads the answer from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            return false;
        }

        matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Answers every prompt the same way.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirmer for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// How an execution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The path had no steps
    AlreadyAtTarget,
    /// Every step was applied
    Completed,
    /// The human declined the confirmation prompt
    Cancelled,
    /// The oracle failed on a step; earlier steps remain applied
    Aborted {
        /// Zero-based index of the failing step
        step: usize,
        /// Error reported by the oracle
        error: String,
    },
}

/// Result of executing a path.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    /// How the run ended
    pub outcome: ExecutionOutcome,
    /// Number of transitions applied
    pub steps_applied: usize,
    /// Verification mismatches observed along the way
    pub warnings: Vec<String>,
    /// The path after the run; usage statistics are updated only on completion
    pub path: WorkflowPath,
}

impl ExecutionReport {
    /// Whether the issue ended up where the path leads.
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, ExecutionOutcome::AlreadyAtTarget | ExecutionOutcome::Completed)
    }
}

/// Applies workflow paths to a real issue.
pub struct WorkflowExecutor<'a> {
    oracle: &'a dyn TransitionOracle,
    confirmer: &'a dyn Confirmer,
    step_delay: Duration,
}

impl<'a> WorkflowExecutor<'a> {
    /// Create an executor with the default step delay.
    pub fn new(oracle: &'a dyn TransitionOracle, confirmer: &'a dyn Confirmer) -> Self {
        Self { oracle, confirmer, step_delay: DEFAULT_STEP_DELAY }
    }

    /// Set the pause taken after each transition.
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// Execute `path` against `issue_id`.
    ///
    /// The caller's path is left untouched; the report carries the updated
    /// copy to persist.
    pub async fn execute(
        &self,
        issue_id: &str,
        path: &WorkflowPath,
        interactive: bool,
    ) -> WorkflowResult<ExecutionReport> {
        require(issue_id, "issue id")?;

        if path.is_empty() {
            tracing::info!(issue = issue_id, "Issue is already in the target state");
            return Ok(Self::report(ExecutionOutcome::AlreadyAtTarget, 0, Vec::new(), path.clone()));
        }

        if interactive {
            println!("Workflow for {} ({} step(s)):", issue_id, path.len());
            for (i, step) in path.steps.iter().enumerate() {
                println!("  {}. {}", i + 1, step);
            }

            if !self.confirmer.confirm("Proceed with these transitions?") {
                println!("Cancelled.");
                tracing::info!(issue = issue_id, "Workflow execution cancelled by user");
                return Ok(Self::report(ExecutionOutcome::Cancelled, 0, Vec::new(), path.clone()));
            }
        }

        let mut warnings = Vec::new();

        for (i, step) in path.steps.iter().enumerate() {
            println!("[{}/{}] {}", i + 1, path.len(), step);
            tracing::info!(
                issue = issue_id,
                transition = %step.transition_name,
                id = %step.transition_id,
                "Applying transition"
            );

            if let Err(e) = self.oracle.apply_transition(issue_id, &step.transition_id).await {
                tracing::error!(issue = issue_id, step = i + 1, error = %e, "Transition failed, aborting");
                let outcome = ExecutionOutcome::Aborted { step: i, error: e.to_string() };
                return Ok(Self::report(outcome, i, warnings, path.clone()));
            }

            if !self.step_delay.is_zero() {
                tokio::time::sleep(self.step_delay).await;
            }

            match self.oracle.current_state(issue_id).await {
                Ok(actual) if actual == step.to_state => {
                    tracing::debug!(issue = issue_id, state = %actual, "Transition verified");
                }
                Ok(actual) => {
                    let warning = format!(
                        "Expected '{}' after \"{}\" but issue is in '{}'",
                        step.to_state, step.transition_name, actual
                    );
                    tracing::warn!(issue = issue_id, "{}", warning);
                    warnings.push(warning);
                }
                Err(e) => {
                    tracing::error!(issue = issue_id, step = i + 1, error = %e, "Could not verify state, aborting");
                    let outcome = ExecutionOutcome::Aborted { step: i, error: e.to_string() };
                    return Ok(Self::report(outcome, i + 1, warnings, path.clone()));
                }
            }
        }

        tracing::info!(issue = issue_id, steps = path.len(), "Workflow completed");
        Ok(Self::report(ExecutionOutcome::Completed, path.len(), warnings, path.record_use()))
    }

    fn report(
        outcome: ExecutionOutcome,
        steps_applied: usize,
        warnings: Vec<String>,
        path: WorkflowPath,
    ) -> ExecutionReport {
        ExecutionReport { outcome, steps_applied, warnings, path }
    }
}
