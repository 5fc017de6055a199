// ABOUTME: Settings model with JSON persistence in the platform config dir
// ABOUTME: Per-repository tracking entries with per-kind accessors

use crate::escape::EscapeMode;
use crate::model::ItemKind;
use crate::notice::NoticeMode;
use crate::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// What happens to an existing mirror file when its item is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateMode {
    None,
    Update,
    Append,
}

impl UpdateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateMode::None => "none",
            UpdateMode::Update => "update",
            UpdateMode::Append => "append",
        }
    }
}

impl Default for UpdateMode {
    fn default() -> Self {
        UpdateMode::None
    }
}

/// Tracking configuration for a single `owner/name` repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepoTracking {
    pub repository: String,

    pub track_issues: bool,
    pub issue_update_mode: UpdateMode,
    pub allow_delete_issue: bool,
    pub issue_folder: String,

    pub track_pull_request: bool,
    pub pull_request_update_mode: UpdateMode,
    pub allow_delete_pull_request: bool,
    pub pull_request_folder: String,

    pub require_assignee: bool,
    pub assignee_match: String,
    pub require_opened_by_issue: bool,
    pub opened_by_issue_match: String,

    pub require_reviewer: bool,
    pub reviewer_match: String,
    pub require_pull_request_assignee: bool,
    pub pull_request_assignee_match: String,
    pub require_opened_by_pr: bool,
    pub opened_by_pr_match: String,

    pub require_issue_label: bool,
    pub issue_label_match: Vec<String>,
    pub require_pull_request_label: bool,
    pub pull_request_label_match: Vec<String>,
}

impl Default for RepoTracking {
    fn default() -> Self {
        RepoTracking {
            repository: String::new(),
            track_issues: false,
            issue_update_mode: UpdateMode::None,
            allow_delete_issue: true,
            issue_folder: "GitHub Issues".to_string(),
            track_pull_request: false,
            pull_request_update_mode: UpdateMode::None,
            allow_delete_pull_request: true,
            pull_request_folder: "GitHub Pull Requests".to_string(),
            require_assignee: false,
            assignee_match: String::new(),
            require_opened_by_issue: false,
            opened_by_issue_match: String::new(),
            require_reviewer: false,
            reviewer_match: String::new(),
            require_pull_request_assignee: false,
            pull_request_assignee_match: String::new(),
            require_opened_by_pr: false,
            opened_by_pr_match: String::new(),
            require_issue_label: false,
            issue_label_match: Vec::new(),
            require_pull_request_label: false,
            pull_request_label_match: Vec::new(),
        }
    }
}

impl RepoTracking {
    /// Splits `repository` into (owner, name). None when either part is
    /// missing; anything past the second segment is ignored.
    pub fn owner_and_name(&self) -> Option<(&str, &str)> {
        let mut parts = self.repository.split('/').filter(|s| !s.is_empty());
        match (parts.next(), parts.next()) {
            (Some(owner), Some(name)) => Some((owner, name)),
            _ => None,
        }
    }

    pub fn tracks(&self, kind: ItemKind) -> bool {
        match kind {
            ItemKind::Issue => self.track_issues,
            ItemKind::PullRequest => self.track_pull_request,
        }
    }

    pub fn folder(&self, kind: ItemKind) -> &str {
        match kind {
            ItemKind::Issue => &self.issue_folder,
            ItemKind::PullRequest => &self.pull_request_folder,
        }
    }

    pub fn update_mode(&self, kind: ItemKind) -> UpdateMode {
        match kind {
            ItemKind::Issue => self.issue_update_mode,
            ItemKind::PullRequest => self.pull_request_update_mode,
        }
    }

    pub fn allow_delete(&self, kind: ItemKind) -> bool {
        match kind {
            ItemKind::Issue => self.allow_delete_issue,
            ItemKind::PullRequest => self.allow_delete_pull_request,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub github_token: String,
    pub repositories: Vec<RepoTracking>,
    /// chrono strftime format for rendered timestamps; empty means default.
    pub date_format: String,
    pub sync_on_startup: bool,
    /// Minutes between passes in watch mode; 0 disables the interval.
    pub sync_interval: u64,
    pub sync_notice_mode: NoticeMode,
    pub escape_mode: EscapeMode,
    /// Mirror root; falls back to the platform data dir when unset.
    pub vault_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            github_token: String::new(),
            repositories: Vec::new(),
            date_format: String::new(),
            sync_on_startup: true,
            sync_interval: 0,
            sync_notice_mode: NoticeMode::Normal,
            escape_mode: EscapeMode::Strict,
            vault_dir: None,
        }
    }
}

impl Settings {
    pub fn config_path(path_override: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = path_override {
            return Ok(path);
        }
        let dirs = ProjectDirs::from("", "", "octomirror").ok_or_else(|| {
            Error::Filesystem(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        Ok(dirs.config_dir().join("config.json"))
    }

    /// Loads settings from disk; a missing file yields full defaults.
    pub fn load(path_override: Option<PathBuf>) -> Result<Self> {
        let path = Self::config_path(path_override)?;
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self, path_override: Option<PathBuf>) -> Result<PathBuf> {
        let path = Self::config_path(path_override)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}
