//! Jiraflow - multi-step Jira workflow transitions from your terminal.
//!
//! Finds, caches and replays the transitions that move an issue to a
//! requested status.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use jiraflow::integrations::{format_transition, JiraClient};
use jiraflow::workflow::{
    ExecutionOutcome, ExecutionReport, HeuristicResolver, MetadataResolver, PathCache,
    StateResolver, TransitionOracle, WorkflowNavigator, WorkflowPath,
};
use jiraflow::Config;

/// Move Jira issues through multi-step workflows
#[derive(Parser)]
#[command(name = "jiraflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project key used to scope the workflow cache
    #[arg(short, long, global = true, env = "JIRAFLOW_PROJECT")]
    project: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the path to a status, using the cache when possible
    Path {
        /// Issue key (e.g., PROJ-123)
        issue: String,

        /// Target status
        target: String,
    },

    /// Discover a fresh path to a status and cache it
    Discover {
        /// Issue key (e.g., PROJ-123)
        issue: String,

        /// Target status
        target: String,
    },

    /// Move an issue to a status, running every transition on the way
    Move {
        /// Issue key (e.g., PROJ-123)
        issue: String,

        /// Target status
        target: String,

        /// Don't confirm before executing
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Suggest cached destinations from the issue's current status
    Suggest {
        /// Issue key (e.g., PROJ-123)
        issue: String,

        /// Maximum number of suggestions
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List the transitions currently available on an issue
    Transitions {
        /// Issue key (e.g., PROJ-123)
        issue: String,
    },

    /// Manage the workflow path cache
    Cache {
        /// Cache operation
        #[command(subcommand)]
        operation: CacheOperation,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Cache operations.
#[derive(Subcommand)]
enum CacheOperation {
    /// List cached paths
    List,

    /// Remove one cached path
    Forget {
        /// Issue type (e.g., Task)
        issue_type: String,

        /// Start status
        from: String,

        /// Target status
        to: String,
    },

    /// Remove every cached path
    Clear {
        /// Don't confirm before clearing
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show the cache file path
    Path,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("jiraflow=info,warn")
    };

    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring configuration, using defaults");
            Config::default()
        }
    };
    let project = cli.project.clone().or_else(|| config.jira.project.clone());

    // Handle commands
    match cli.command {
        Commands::Path { issue, target } => {
            cmd_path(&config, project.as_deref(), &issue, &target, false)?;
        }
        Commands::Discover { issue, target } => {
            cmd_path(&config, project.as_deref(), &issue, &target, true)?;
        }
        Commands::Move { issue, target, yes } => {
            if !cmd_move(&config, project.as_deref(), &issue, &target, !yes)? {
                std::process::exit(1);
            }
        }
        Commands::Suggest { issue, limit } => {
            let limit = limit.unwrap_or(config.workflow.suggestion_limit);
            cmd_suggest(&config, project.as_deref(), &issue, limit)?;
        }
        Commands::Transitions { issue } => cmd_transitions(&config, &issue)?,
        Commands::Cache { operation } => cmd_cache(&config, project.as_deref(), operation)?,
        Commands::Config { path } => cmd_config(&config, project.as_deref(), path)?,
        Commands::Completions { shell } => cmd_completions(shell),
    }

    Ok(())
}

/// Build the Jira client from environment and config.
fn jira_client(config: &Config) -> Result<JiraClient> {
    JiraClient::from_config(&config.jira).ok_or_else(|| {
        anyhow::anyhow!(
            "Jira integration not configured.\n\n\
             To enable, set JIRA_BASE_URL, JIRA_EMAIL and JIRA_API_TOKEN.\n\
             Generate a token at: https://id.atlassian.com/manage-profile/security/api-tokens"
        )
    })
}

/// Open the cache for the given project scope.
fn open_cache(config: &Config, project: Option<&str>) -> Result<PathCache> {
    let dir = config.cache_dir()?;
    Ok(PathCache::open(&dir, project))
}

/// Build a navigator over Jira.
fn navigator(config: &Config, project: Option<&str>) -> Result<WorkflowNavigator> {
    let oracle: Arc<dyn TransitionOracle> = Arc::new(jira_client(config)?);
    let resolver: Box<dyn StateResolver> = if config.workflow.heuristics {
        Box::new(HeuristicResolver)
    } else {
        Box::new(MetadataResolver)
    };

    Ok(WorkflowNavigator::new(oracle, open_cache(config, project)?)
        .with_resolver(resolver)
        .with_step_delay(config.workflow.step_delay()))
}

/// Print a workflow path.
fn print_path(path: &WorkflowPath) {
    if path.is_empty() {
        println!("  Already in the target status.");
        return;
    }

    for (i, step) in path.steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
    println!("\n{} step(s), used {} time(s)", path.len(), path.usage_count);
}

/// Handle path lookup and discovery.
fn cmd_path(
    config: &Config,
    project: Option<&str>,
    issue: &str,
    target: &str,
    fresh: bool,
) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let mut nav = navigator(config, project)?;

    rt.block_on(async {
        let path = if fresh {
            nav.discover_path(issue, target).await?
        } else {
            nav.get_path(issue, target).await?
        };

        match path {
            Some(path) => {
                println!("Path for {} to '{}':\n", issue, target);
                print_path(&path);
                anyhow::Ok(())
            }
            None => anyhow::bail!(
                "No workflow path found from the current status of {} to '{}'",
                issue,
                target
            ),
        }
    })
}

/// Handle moving an issue to a status.
///
/// Returns `false` when the user declined to proceed.
fn cmd_move(
    config: &Config,
    project: Option<&str>,
    issue: &str,
    target: &str,
    interactive: bool,
) -> Result<bool> {
    let rt = tokio::runtime::Runtime::new()?;
    let mut nav = navigator(config, project)?;

    rt.block_on(async {
        match nav.transition_to(issue, target, interactive).await? {
            Some(report) => report_outcome(issue, target, &report),
            None => anyhow::bail!(
                "No workflow path found from the current status of {} to '{}'",
                issue,
                target
            ),
        }
    })
}

/// Print the result of an execution and turn failures into errors.
fn report_outcome(issue: &str, target: &str, report: &ExecutionReport) -> Result<bool> {
    for warning in &report.warnings {
        println!("  Warning: {}", warning);
    }

    match &report.outcome {
        ExecutionOutcome::AlreadyAtTarget => {
            println!("{} is already in '{}'.", issue, target);
            Ok(true)
        }
        ExecutionOutcome::Completed => {
            println!("\n{} moved to '{}' in {} step(s).", issue, target, report.steps_applied);
            Ok(true)
        }
        // Already reported by the executor; not an error, but not a success either
        ExecutionOutcome::Cancelled => Ok(false),
        ExecutionOutcome::Aborted { step, error } => anyhow::bail!(
            "Transition {} of {} failed: {}\n{} step(s) were applied and have not been undone.",
            step + 1,
            report.path.len(),
            error,
            report.steps_applied
        ),
    }
}

/// Handle suggestions.
fn cmd_suggest(config: &Config, project: Option<&str>, issue: &str, limit: usize) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let nav = navigator(config, project)?;

    rt.block_on(async {
        let (snapshot, suggestions) = nav.suggestions_for_issue(issue, limit).await?;

        println!("{} ({}) is in '{}'.\n", issue, snapshot.issue_type, snapshot.state);
        if suggestions.is_empty() {
            println!("  No cached destinations yet.");
        } else {
            println!("Frequent destinations:");
            for suggestion in &suggestions {
                println!("  {}", suggestion.summary());
            }
        }
        anyhow::Ok(())
    })
}

/// Handle listing transitions.
fn cmd_transitions(config: &Config, issue: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let jira = jira_client(config)?;

    rt.block_on(async {
        let state = jira.current_state(issue).await?;
        let transitions = jira.detailed_available_transitions(issue).await?;

        println!("{} is in '{}'.\n", issue, state);
        if transitions.is_empty() {
            println!("  No transitions available.");
        } else {
            for transition in &transitions {
                println!("{}", format_transition(transition));
            }
        }
        anyhow::Ok(())
    })
}

/// Handle cache commands.
fn cmd_cache(config: &Config, project: Option<&str>, operation: CacheOperation) -> Result<()> {
    let mut cache = open_cache(config, project)?;

    match operation {
        CacheOperation::List => {
            if cache.is_empty() {
                println!("No cached workflow paths.");
                return Ok(());
            }

            println!("Cached workflow paths:\n");
            for (key, path) in cache.entries() {
                println!(
                    "  [{}] {} → {}  ({} step(s), used {}x, last {})",
                    key.issue_type,
                    key.from_state,
                    key.to_state,
                    path.len(),
                    path.usage_count,
                    path.last_used_at.format("%Y-%m-%d %H:%M")
                );
            }
            println!(
                "\nTotal: {} path(s), last updated {}",
                cache.len(),
                cache.last_updated().format("%Y-%m-%d %H:%M")
            );
        }
        CacheOperation::Forget { issue_type, from, to } => {
            if cache.forget(&issue_type, &from, &to) {
                println!("Forgot {}:{}:{}", issue_type, from, to);
            } else {
                anyhow::bail!("No cached path for {}:{}:{}", issue_type, from, to);
            }
        }
        CacheOperation::Clear { yes } => {
            if !yes {
                print!("Remove all {} cached path(s)? [y/N] ", cache.len());
                io::stdout().flush()?;

                let mut input = String::new();
                io::stdin().read_line(&mut input)?;

                if !input.trim().eq_ignore_ascii_case("y") {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            let removed = cache.clear();
            println!("Removed {} cached path(s).", removed);
        }
        CacheOperation::Path => {
            println!("{}", cache.path().display());
        }
    }

    Ok(())
}

/// Handle config command.
fn cmd_config(config: &Config, project: Option<&str>, show_path: bool) -> Result<()> {
    if show_path {
        match Config::global_config_path() {
            Some(path) => println!("{}", path.display()),
            None => println!("Could not determine config directory"),
        }
        return Ok(());
    }

    println!("{}", toml::to_string_pretty(config)?);
    let cache_file = config.cache_dir()?.join(PathCache::file_name(project));
    println!("# Workflow cache: {}", cache_file.display());
    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "jiraflow", &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: ExecutionOutcome) -> ExecutionReport {
        ExecutionReport {
            outcome,
            steps_applied: 0,
            warnings: Vec::new(),
            path: WorkflowPath::empty(),
        }
    }

    #[test]
    fn test_cancelled_move_is_not_an_error() {
        assert!(!report_outcome("PROJ-1", "Done", &report(ExecutionOutcome::Cancelled)).unwrap());
        assert!(report_outcome("PROJ-1", "Done", &report(ExecutionOutcome::Completed)).unwrap());
    }

    #[test]
    fn test_aborted_move_is_an_error() {
        let aborted = ExecutionOutcome::Aborted { step: 0, error: "boom".to_string() };
        let err = report_outcome("PROJ-1", "Done", &report(aborted)).unwrap_err();
        assert!(err.to_string().contains("Transition 1 of 0 failed: boom"));
    }
}
