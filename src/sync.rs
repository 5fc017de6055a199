// ABOUTME: Reconciliation engine syncing remote items into mirror files
// ABOUTME: Delete pass before create/update, folder sweep, single-flight latch

use crate::api::GithubClient;
use crate::config::{RepoTracking, Settings};
use crate::filter;
use crate::frontmatter;
use crate::model::{ItemKind, RemoteComment, RemoteItem};
use crate::notice::NoticeManager;
use crate::render;
use crate::storage::Vault;
use crate::Result;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

/// Clears the in-flight latch on every exit path, including early returns
/// and propagated errors.
struct LatchGuard<'a>(&'a AtomicBool);

impl Drop for LatchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SyncEngine<'a> {
    settings: &'a Settings,
    client: &'a GithubClient,
    vault: &'a Vault,
    notices: &'a NoticeManager,
    in_flight: AtomicBool,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        settings: &'a Settings,
        client: &'a GithubClient,
        vault: &'a Vault,
        notices: &'a NoticeManager,
    ) -> Self {
        SyncEngine {
            settings,
            client,
            vault,
            notices,
            in_flight: AtomicBool::new(false),
        }
    }

    /// One full pass: issues for every tracking repository, then pull
    /// requests, then the folder sweep. A failure in one repository is
    /// reported and the rest of the pass continues. Concurrent invocations
    /// are rejected, not queued.
    pub fn sync_all(&self) -> Result<()> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.notices.warning("Sync already in progress, skipping this run");
            return Ok(());
        }
        let _latch = LatchGuard(&self.in_flight);

        self.notices.info("Syncing issues and pull requests");

        for kind in [ItemKind::Issue, ItemKind::PullRequest] {
            for repo in &self.settings.repositories {
                if !repo.tracks(kind) {
                    continue;
                }
                if let Err(e) = self.sync_repo_kind(repo, kind) {
                    self.notices.error(&format!(
                        "Failed to sync {}s for {}: {}",
                        kind.label(),
                        repo.repository,
                        e
                    ));
                }
            }
        }

        if let Err(e) = self.cleanup_folders() {
            self.notices
                .error(&format!("Folder cleanup failed: {}", e));
        }

        self.notices.success("Synced issues and pull requests");
        Ok(())
    }

    /// One repository, one kind: fetch, filter, delete stale mirrors, then
    /// create or update the rest. A listing failure propagates before the
    /// delete pass runs, so a network blip never wipes existing mirrors.
    fn sync_repo_kind(&self, repo: &RepoTracking, kind: ItemKind) -> Result<()> {
        let (owner, name) = match repo.owner_and_name() {
            Some(pair) => pair,
            None => {
                self.notices.warning(&format!(
                    "Skipping invalid repository entry: {:?}",
                    repo.repository
                ));
                return Ok(());
            }
        };

        self.notices
            .debug(&format!("Fetching {}s for {}", kind.label(), repo.repository));
        let items = match kind {
            ItemKind::Issue => self.client.list_open_issues(owner, name)?,
            ItemKind::PullRequest => self.client.list_open_pull_requests(owner, name)?,
        };

        let matching: Vec<&RemoteItem> = items
            .iter()
            .filter(|item| filter::matches(repo, item, kind))
            .collect();
        self.notices.debug(&format!(
            "Found {} {}s, {} match filters",
            items.len(),
            kind.label(),
            matching.len()
        ));

        let current: HashSet<String> = matching
            .iter()
            .map(|item| item.number.to_string())
            .collect();
        let folder = format!("{}/{}/{}", repo.folder(kind), owner, name);

        self.delete_missing(repo, kind, &folder, &current)?;
        self.create_or_update(repo, kind, &folder, owner, name, &matching)?;

        self.notices.debug(&format!(
            "Synced {} {}s for {}",
            matching.len(),
            kind.label(),
            repo.repository
        ));
        Ok(())
    }

    /// Trashes mirror files whose item number is absent from the current
    /// set. A file's own allowDelete frontmatter wins over the repository
    /// default, in either direction.
    fn delete_missing(
        &self,
        repo: &RepoTracking,
        kind: ItemKind,
        folder: &str,
        current: &HashSet<String>,
    ) -> Result<()> {
        if !self.vault.folder_exists(folder) {
            return Ok(());
        }

        let prefix = format!("{} - ", kind.file_prefix());
        for name in self.vault.list_markdown_files(folder)? {
            let stem = name.trim_end_matches(".md");
            let key = stem.strip_prefix(&prefix).unwrap_or(stem);
            if current.contains(key) {
                continue;
            }

            let rel = format!("{}/{}", folder, name);
            let allow = match self.file_allow_delete(&rel)? {
                Some(value) => value,
                None => repo.allow_delete(kind),
            };
            if !allow {
                continue;
            }

            self.vault.trash(&rel)?;
            self.notices.info(&format!(
                "Deleted {} {} from {}",
                kind.label(),
                key,
                repo.repository
            ));
        }
        Ok(())
    }

    fn create_or_update(
        &self,
        repo: &RepoTracking,
        kind: ItemKind,
        folder: &str,
        owner: &str,
        name: &str,
        items: &[&RemoteItem],
    ) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        self.ensure_folder_chain(repo, kind, owner, name)?;

        for item in items {
            // Fetched fresh on every pass, never cached
            let comments = self.fetch_comments(owner, name, kind, item.number);
            let rel = format!("{}/{} - {}.md", folder, kind.file_prefix(), item.number);

            if !self.vault.exists(&rel) {
                let props = render::default_properties(item, kind, repo, self.settings);
                let content = render::document(&props, item, &comments, self.settings);
                self.vault.write(&rel, &content)?;
                self.notices
                    .debug(&format!("Created file for {} {}", kind.label(), item.number));
                continue;
            }

            let existing = self.vault.read(&rel)?;
            let mut props = frontmatter::extract(&existing);
            render::refresh_people(&mut props, item, kind);

            let mode = match props.get("updateMode") {
                Some(value) => frontmatter::unquote(value).to_ascii_lowercase(),
                None => {
                    self.notices.warning(&format!(
                        "No update mode found for {} {}. Using repository setting.",
                        kind.label(),
                        item.number
                    ));
                    repo.update_mode(kind).as_str().to_string()
                }
            };

            match mode.as_str() {
                "update" => {
                    let content = render::document(&props, item, &comments, self.settings);
                    self.vault.write(&rel, &content)?;
                    self.notices
                        .debug(&format!("Updated {} {}", kind.label(), item.number));
                }
                "append" => {
                    let block = render::append_block(item, &comments, self.settings);
                    let content = format!("{}\n\n{}", existing, block);
                    self.vault.write(&rel, &content)?;
                    self.notices
                        .debug(&format!("Appended to {} {}", kind.label(), item.number));
                }
                other => {
                    self.notices.debug(&format!(
                        "Skipped update for {} {} (mode: {})",
                        kind.label(),
                        item.number,
                        other
                    ));
                }
            }
        }
        Ok(())
    }

    // Folders appear lazily: only once at least one matching item exists
    fn ensure_folder_chain(
        &self,
        repo: &RepoTracking,
        kind: ItemKind,
        owner: &str,
        name: &str,
    ) -> Result<()> {
        let base = repo.folder(kind).to_string();
        let owner_folder = format!("{}/{}", base, owner);
        let repo_folder = format!("{}/{}", owner_folder, name);
        for folder in [base, owner_folder, repo_folder] {
            if self.vault.ensure_folder(&folder)? {
                self.notices.debug(&format!("Created folder: {}", folder));
            }
        }
        Ok(())
    }

    fn fetch_comments(
        &self,
        owner: &str,
        name: &str,
        kind: ItemKind,
        number: u64,
    ) -> Vec<RemoteComment> {
        let fetched = match kind {
            ItemKind::Issue => self.client.list_issue_comments(owner, name, number),
            ItemKind::PullRequest => self.client.list_pull_request_comments(owner, name, number),
        };
        match fetched {
            Ok(comments) => comments,
            Err(e) => {
                self.notices.error(&format!(
                    "Failed to fetch comments for {} {}: {}",
                    kind.label(),
                    number,
                    e
                ));
                Vec::new()
            }
        }
    }

    fn file_allow_delete(&self, rel: &str) -> Result<Option<bool>> {
        if !self.vault.exists(rel) {
            return Ok(None);
        }
        let content = self.vault.read(rel)?;
        let props = frontmatter::extract(&content);
        Ok(props
            .get("allowDelete")
            .map(|value| frontmatter::unquote(value).eq_ignore_ascii_case("true")))
    }

    /// Sweeps the mirror tree after the pass: files under repositories whose
    /// tracking for a kind was turned off are trashed when their own
    /// frontmatter opts in (default is keep), and emptied repo and owner
    /// folders are removed. The kind root folder itself always stays.
    fn cleanup_folders(&self) -> Result<()> {
        for kind in [ItemKind::Issue, ItemKind::PullRequest] {
            for repo in &self.settings.repositories {
                let (owner, name) = match repo.owner_and_name() {
                    Some(pair) => pair,
                    None => continue,
                };
                let owner_folder = format!("{}/{}", repo.folder(kind), owner);
                let repo_folder = format!("{}/{}", owner_folder, name);
                if !self.vault.folder_exists(&repo_folder) {
                    continue;
                }

                if !repo.tracks(kind) {
                    for file in self.vault.list_markdown_files(&repo_folder)? {
                        let rel = format!("{}/{}", repo_folder, file);
                        if !self.file_allow_delete(&rel)?.unwrap_or(false) {
                            continue;
                        }
                        self.vault.trash(&rel)?;
                        self.notices.debug(&format!(
                            "Deleted file {} from untracked repository {}",
                            file, repo.repository
                        ));
                    }
                }

                if self.vault.remove_empty_folder(&repo_folder)? {
                    self.notices
                        .info(&format!("Deleting empty folder: {}", repo_folder));
                }
                if self.vault.remove_empty_folder(&owner_folder)? {
                    self.notices
                        .info(&format!("Deleting empty folder: {}", owner_folder));
                }
            }
        }
        Ok(())
    }
}
