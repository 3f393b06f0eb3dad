//! Persistent cache of discovered workflow paths.
//!
//! One JSON document per project scope, loaded fully on open and rewritten
//! fully on every change. Concurrent writers are not coordinated; the last
//! one to finish wins.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{CacheKey, WorkflowPath};

/// File name used when no project scope is given.
pub const DEFAULT_CACHE_FILE: &str = "jira-workflows.json";

/// Stored cache document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheDocument {
    /// Paths keyed by `"{type}:{from}:{to}"`
    #[serde(default)]
    pub workflows: BTreeMap<String, WorkflowPath>,
    /// When the document was last written
    pub last_updated: DateTime<Utc>,
}

impl Default for CacheDocument {
    fn default() -> Self {
        Self { workflows: BTreeMap::new(), last_updated: Utc::now() }
    }
}

/// A cached destination offered for a given issue type and state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSuggestion {
    /// Destination state
    pub to_state: String,
    /// Number of transitions needed
    pub step_count: usize,
    /// How many times the path has been executed
    pub usage_count: u32,
    /// When the path was last executed
    pub last_used_at: DateTime<Utc>,
}

impl PathSuggestion {
    /// One-line summary for display.
    pub fn summary(&self) -> String {
        let steps = if self.step_count == 1 { "step" } else { "steps" };
        format!("{} ({} {}, used {}x)", self.to_state, self.step_count, steps, self.usage_count)
    }
}

/// Workflow path cache backed by a JSON file.
#[derive(Debug)]
pub struct PathCache {
    /// Path to the cache file
    path: PathBuf,
    /// In-memory document, authoritative for the life of the process
    document: CacheDocument,
}

impl PathCache {
    /// Cache file name for an optional project scope.
    pub fn file_name(scope: Option<&str>) -> String {
        match scope.map(str::trim).filter(|s| !s.is_empty()) {
            Some(scope) => format!("jira-workflows-{}.json", scope.to_lowercase()),
            None => DEFAULT_CACHE_FILE.to_string(),
        }
    }

    /// Open the cache for `scope` inside `dir`.
    ///
    /// Never fails: a missing, unreadable or corrupt file yields an empty cache.
    pub fn open(dir: &Path, scope: Option<&str>) -> Self {
        Self::with_path(dir.join(Self::file_name(scope)))
    }

    /// Open a cache at an explicit file path.
    pub fn with_path(path: PathBuf) -> Self {
        let document = Self::load(&path);
        Self { path, document }
    }

    fn load(path: &Path) -> CacheDocument {
        if !path.exists() {
            tracing::debug!(path = ?path, "No workflow cache yet, starting empty");
            return CacheDocument::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Failed to read workflow cache, starting empty");
                return CacheDocument::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Failed to parse workflow cache, starting empty");
                CacheDocument::default()
            }
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the document was last written.
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.document.last_updated
    }

    /// Number of cached paths.
    pub fn len(&self) -> usize {
        self.document.workflows.len()
    }

    /// Whether the cache holds no paths.
    pub fn is_empty(&self) -> bool {
        self.document.workflows.is_empty()
    }

    /// Exact-match lookup.
    pub fn get(&self, issue_type: &str, from_state: &str, to_state: &str) -> Option<&WorkflowPath> {
        let key = CacheKey::new(issue_type, from_state, to_state);
        self.document.workflows.get(&key.to_string())
    }

    /// Insert or replace a path and persist the whole document.
    pub fn put(&mut self, issue_type: &str, from_state: &str, to_state: &str, path: WorkflowPath) {
        let key = CacheKey::new(issue_type, from_state, to_state);
        self.document.workflows.insert(key.to_string(), path);
        self.persist();
    }

    /// Remove one cached path. Returns whether anything was removed.
    pub fn forget(&mut self, issue_type: &str, from_state: &str, to_state: &str) -> bool {
        let key = CacheKey::new(issue_type, from_state, to_state);
        let removed = self.document.workflows.remove(&key.to_string()).is_some();
        if removed {
            self.persist();
        }
        removed
    }

    /// Remove every cached path. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.document.workflows.len();
        self.document.workflows.clear();
        self.persist();
        count
    }

    /// All cached paths in key order.
    pub fn entries(&self) -> Vec<(CacheKey, &WorkflowPath)> {
        self.document
            .workflows
            .iter()
            .filter_map(|(key, path)| CacheKey::parse(key).map(|k| (k, path)))
            .collect()
    }

    /// Most-used cached destinations leaving `from_state` for `issue_type`.
    pub fn top_suggestions(
        &self,
        issue_type: &str,
        from_state: &str,
        limit: usize,
    ) -> Vec<PathSuggestion> {
        let prefix = CacheKey::prefix(issue_type, from_state);

        let mut suggestions: Vec<PathSuggestion> = self
            .document
            .workflows
            .iter()
            .filter_map(|(key, path)| {
                key.strip_prefix(&prefix).map(|to_state| PathSuggestion {
                    to_state: to_state.to_string(),
                    step_count: path.len(),
                    usage_count: path.usage_count,
                    last_used_at: path.last_used_at,
                })
            })
            .collect();

        // Most used first, with the destination name as tie-breaker for determinism
        suggestions
            .sort_by(|a, b| b.usage_count.cmp(&a.usage_count).then_with(|| a.to_state.cmp(&b.to_state)));
        suggestions.truncate(limit);
        suggestions
    }

    /// Write the whole document to disk.
    ///
    /// The content goes to a temporary file in the same directory which is
    /// then renamed over the cache file, so a failed write leaves the
    /// previous file intact.
    pub fn save(&mut self) -> anyhow::Result<()> {
        self.document.last_updated = Utc::now();
        let content = serde_json::to_string_pretty(&self.document)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        Ok(())
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            tracing::warn!(path = ?self.path, error = %e, "Failed to save workflow cache");
        }
    }
}
