//! Jira issue tracker integration.
//!
//! Talks to the Jira REST API (v2) to read issue status and type, list the
//! transitions available on an issue and apply them. Implements
//! [`TransitionOracle`] so the workflow engine can drive it.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::JiraConfig;
use crate::workflow::{OracleError, OracleResult, Transition, TransitionOracle};

/// Jira REST API client.
#[derive(Debug, Clone)]
pub struct JiraClient {
    /// Site URL (e.g., "https://example.atlassian.net")
    base_url: String,
    /// Account email used for basic auth
    email: String,
    /// API token
    token: String,
    /// HTTP client
    client: reqwest::Client,
}

/// A Jira issue, reduced to the fields the workflow engine needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssue {
    /// Issue ID
    pub id: String,
    /// Issue key (e.g., "PROJ-123")
    pub key: String,
    /// Issue fields
    pub fields: JiraIssueFields,
}

/// Selected issue fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssueFields {
    /// Issue summary
    #[serde(default)]
    pub summary: String,
    /// Current status
    pub status: JiraStatus,
    /// Issue type
    #[serde(rename = "issuetype")]
    pub issue_type: JiraIssueType,
}

/// A Jira workflow status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraStatus {
    /// Status ID
    pub id: String,
    /// Status name
    pub name: String,
}

/// A Jira issue type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssueType {
    /// Issue type ID
    #[serde(default)]
    pub id: String,
    /// Issue type name
    pub name: String,
}

/// A transition as returned by the transitions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraTransition {
    /// Transition ID
    pub id: String,
    /// Transition name
    pub name: String,
    /// Destination status, present when the server reports it
    #[serde(default)]
    pub to: Option<JiraStatus>,
}

impl From<JiraTransition> for Transition {
    fn from(t: JiraTransition) -> Self {
        let mut transition = Self::new(t.id, t.name);
        if let Some(to) = t.to {
            transition = transition.with_to_state(to.name).with_to_state_id(to.id);
        }
        transition
    }
}

/// Result type for Jira operations.
pub type JiraResult<T> = Result<T, JiraError>;

/// Error types for Jira operations.
#[derive(Debug, thiserror::Error)]
pub enum JiraError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Jira API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl From<JiraError> for OracleError {
    fn from(e: JiraError) -> Self {
        Self::new(e.to_string())
    }
}

impl JiraClient {
    /// Create a new Jira client.
    pub fn new(
        base_url: impl Into<String>,
        email: impl Into<String>,
        token: impl Into<String>,
    ) -> JiraResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!("jiraflow/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            email: email.into(),
            token: token.into(),
            client,
        })
    }

    /// Create from the environment, using `config` for the URL and email when
    /// the environment does not set them. The token always comes from the
    /// environment.
    pub fn from_config(config: &JiraConfig) -> Option<Self> {
        let base_url = std::env::var("JIRA_BASE_URL").ok().or_else(|| config.base_url.clone())?;
        let email = std::env::var("JIRA_EMAIL").ok().or_else(|| config.email.clone())?;
        let token = std::env::var("JIRA_API_TOKEN").ok()?;
        Self::new(base_url, email, token).ok()
    }

    /// Site URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL for an issue resource, with the key percent-encoded.
    fn issue_url(&self, key: &str, suffix: &str) -> String {
        format!("{}/rest/api/2/issue/{}{}", self.base_url, urlencoding::encode(key), suffix)
    }

    /// Map error statuses to [`JiraError`].
    async fn check(response: reqwest::Response, what: &str) -> JiraResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Err(JiraError::Unauthorized)
            }
            reqwest::StatusCode::NOT_FOUND => Err(JiraError::NotFound(what.to_string())),
            reqwest::StatusCode::TOO_MANY_REQUESTS => Err(JiraError::RateLimited),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(JiraError::Api { status: status.as_u16(), message: error_message(&body) })
            }
        }
    }

    /// Get an issue by key.
    pub async fn get_issue(&self, key: &str) -> JiraResult<JiraIssue> {
        tracing::debug!(issue = key, "Fetching Jira issue");

        let response = self
            .client
            .get(self.issue_url(key, ""))
            .query(&[("fields", "summary,status,issuetype")])
            .basic_auth(&self.email, Some(&self.token))
            .header("Accept", "application/json")
            .send()
            .await?;

        let response = Self::check(response, key).await?;
        response.json().await.map_err(|e| JiraError::Parse(e.to_string()))
    }

    /// List the transitions available on an issue.
    ///
    /// With `expand` set, each transition carries its destination status.
    pub async fn get_transitions(&self, key: &str, expand: bool) -> JiraResult<Vec<JiraTransition>> {
        #[derive(Deserialize)]
        struct Response {
            transitions: Vec<JiraTransition>,
        }

        tracing::debug!(issue = key, expand, "Fetching Jira transitions");

        let mut request = self
            .client
            .get(self.issue_url(key, "/transitions"))
            .basic_auth(&self.email, Some(&self.token))
            .header("Accept", "application/json");

        if expand {
            request = request.query(&[("expand", "transitions.fields")]);
        }

        let response = Self::check(request.send().await?, key).await?;
        let body: Response = response.json().await.map_err(|e| JiraError::Parse(e.to_string()))?;
        Ok(body.transitions)
    }

    /// Apply a transition to an issue.
    pub async fn do_transition(&self, key: &str, transition_id: &str) -> JiraResult<()> {
        tracing::debug!(issue = key, transition = transition_id, "Applying Jira transition");

        let body = serde_json::json!({ "transition": { "id": transition_id } });

        let response = self
            .client
            .post(self.issue_url(key, "/transitions"))
            .basic_auth(&self.email, Some(&self.token))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        Self::check(response, key).await?;
        Ok(())
    }
}

/// Pull a readable message out of a Jira error body.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ErrorBody {
        #[serde(default)]
        error_messages: Vec<String>,
        #[serde(default)]
        errors: std::collections::HashMap<String, String>,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => {
            let mut messages = parsed.error_messages;
            let mut fields: Vec<_> = parsed.errors.into_iter().collect();
            fields.sort();
            messages.extend(fields.into_iter().map(|(field, msg)| format!("{}: {}", field, msg)));
            if messages.is_empty() {
                "Unknown error".to_string()
            } else {
                messages.join("; ")
            }
        }
        Err(_) if body.trim().is_empty() => "Unknown error".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl TransitionOracle for JiraClient {
    async fn current_state(&self, issue_id: &str) -> OracleResult<String> {
        Ok(self.get_issue(issue_id).await?.fields.status.name)
    }

    async fn issue_type(&self, issue_id: &str) -> OracleResult<String> {
        Ok(self.get_issue(issue_id).await?.fields.issue_type.name)
    }

    async fn available_transitions(&self, issue_id: &str) -> OracleResult<Vec<Transition>> {
        let transitions = self.get_transitions(issue_id, false).await?;
        Ok(transitions.into_iter().map(|t| Transition::new(t.id, t.name)).collect())
    }

    async fn detailed_available_transitions(
        &self,
        issue_id: &str,
    ) -> OracleResult<Vec<Transition>> {
        let transitions = self.get_transitions(issue_id, true).await?;
        Ok(transitions.into_iter().map(Transition::from).collect())
    }

    async fn apply_transition(&self, issue_id: &str, transition_id: &str) -> OracleResult<()> {
        Ok(self.do_transition(issue_id, transition_id).await?)
    }
}

/// Format a transition for terminal display.
pub fn format_transition(transition: &Transition) -> String {
    match &transition.to_state {
        Some(to) => format!("  [{}] {} → {}", transition.id, transition.name, to),
        None => format!("  [{}] {}", transition.id, transition.name),
    }
}
