// ABOUTME: Serde data models for GitHub API responses
// ABOUTME: Tolerant parsing with optional fields and flexible payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two kinds of items a repository can mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Issue,
    PullRequest,
}

impl ItemKind {
    /// Filename prefix, as in "Issue - 42.md" / "Pull Request - 7.md".
    pub fn file_prefix(&self) -> &'static str {
        match self {
            ItemKind::Issue => "Issue",
            ItemKind::PullRequest => "Pull Request",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Issue => "issue",
            ItemKind::PullRequest => "pull request",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// An open issue or pull request as returned by the list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteItem {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
    #[serde(default)]
    pub user: Option<Account>,
    #[serde(default)]
    pub assignees: Vec<Account>,
    #[serde(default)]
    pub requested_reviewers: Vec<Account>,
    #[serde(default)]
    pub labels: Vec<Label>,
    // The /issues listing also returns pull requests, marked by this field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl RemoteItem {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn author_login(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.login.as_str())
    }
}


/// A conversation or review comment on an issue or pull request.
///
/// `is_review` is never present in the API payload; the client sets it after
/// fetching the review-comment endpoint so the renderer can pick the header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteComment {
    #[serde(default)]
    pub user: Option<Account>,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub line: Option<u64>,
    #[serde(default)]
    pub is_review: bool,
}
