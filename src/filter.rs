// ABOUTME: Per-repository filter evaluator for remote items
// ABOUTME: OR of enabled criteria; no criteria enabled matches everything

use crate::config::RepoTracking;
use crate::model::{ItemKind, RemoteItem};

// TODO: wire require_issue_label/issue_label_match (and the PR variants)
// into the evaluator; the fields parse and persist but nothing reads them.

fn login_matches(login: &str, pattern: &str) -> bool {
    !pattern.is_empty() && login.eq_ignore_ascii_case(pattern)
}

pub fn matches_issue(repo: &RepoTracking, item: &RemoteItem) -> bool {
    if !repo.require_assignee && !repo.require_opened_by_issue {
        return true;
    }

    if repo.require_assignee
        && item
            .assignees
            .iter()
            .any(|a| login_matches(&a.login, &repo.assignee_match))
    {
        return true;
    }

    if repo.require_opened_by_issue {
        if let Some(author) = item.author_login() {
            if login_matches(author, &repo.opened_by_issue_match) {
                return true;
            }
        }
    }

    false
}

pub fn matches_pull_request(repo: &RepoTracking, item: &RemoteItem) -> bool {
    if !repo.require_reviewer && !repo.require_pull_request_assignee && !repo.require_opened_by_pr {
        return true;
    }

    if repo.require_reviewer
        && item
            .requested_reviewers
            .iter()
            .any(|r| login_matches(&r.login, &repo.reviewer_match))
    {
        return true;
    }

    if repo.require_pull_request_assignee
        && item
            .assignees
            .iter()
            .any(|a| login_matches(&a.login, &repo.pull_request_assignee_match))
    {
        return true;
    }

    if repo.require_opened_by_pr {
        if let Some(author) = item.author_login() {
            if login_matches(author, &repo.opened_by_pr_match) {
                return true;
            }
        }
    }

    false
}

pub fn matches(repo: &RepoTracking, item: &RemoteItem, kind: ItemKind) -> bool {
    match kind {
        ItemKind::Issue => matches_issue(repo, item),
        ItemKind::PullRequest => matches_pull_request(repo, item),
    }
}
