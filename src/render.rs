// ABOUTME: Canonical renderer for mirror documents
// ABOUTME: One layout shared by create and update so passes are byte-stable

use crate::config::{RepoTracking, Settings};
use crate::escape::escape_body;
use crate::frontmatter;
use crate::model::{Account, ItemKind, RemoteComment, RemoteItem};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats a timestamp with the user's strftime string. Empty or invalid
/// formats fall back to the default instead of failing mid-render.
pub fn format_timestamp(ts: DateTime<Utc>, date_format: &str) -> String {
    let format = if date_format.is_empty() {
        DEFAULT_DATE_FORMAT
    } else {
        date_format
    };

    let valid = !StrftimeItems::new(format).any(|item| matches!(item, Item::Error));
    if valid {
        ts.format(format).to_string()
    } else {
        ts.format(DEFAULT_DATE_FORMAT).to_string()
    }
}

fn format_logins(accounts: &[Account]) -> String {
    let quoted: Vec<String> = accounts
        .iter()
        .map(|a| format!("\"{}\"", a.login))
        .collect();
    format!("[{}]", quoted.join(", "))
}

/// The frontmatter written on first creation of a mirror file. updateMode
/// and allowDelete snapshot the repository defaults; edits to those lines
/// later override the defaults for this file.
pub fn default_properties(
    item: &RemoteItem,
    kind: ItemKind,
    repo: &RepoTracking,
    settings: &Settings,
) -> IndexMap<String, String> {
    let mut props = IndexMap::new();
    props.insert(
        "title".to_string(),
        format!("\"{}\"", escape_body(&item.title, settings.escape_mode)),
    );
    props.insert("status".to_string(), format!("\"{}\"", item.state));
    props.insert(
        "created".to_string(),
        format!(
            "\"{}\"",
            format_timestamp(item.created_at, &settings.date_format)
        ),
    );
    props.insert("url".to_string(), format!("\"{}\"", item.html_url));
    props.insert(
        "opened_by".to_string(),
        format!("\"{}\"", item.author_login().unwrap_or("")),
    );
    props.insert("assignees".to_string(), format_logins(&item.assignees));
    if kind == ItemKind::PullRequest {
        props.insert(
            "requested_reviewers".to_string(),
            format_logins(&item.requested_reviewers),
        );
    }
    props.insert(
        "updateMode".to_string(),
        format!("\"{}\"", repo.update_mode(kind).as_str()),
    );
    props.insert(
        "allowDelete".to_string(),
        repo.allow_delete(kind).to_string(),
    );
    props
}

/// Refreshes the people lists in an existing properties map. insert keeps
/// the original entry position, so the layout stays byte-stable.
pub fn refresh_people(props: &mut IndexMap<String, String>, item: &RemoteItem, kind: ItemKind) {
    props.insert("assignees".to_string(), format_logins(&item.assignees));
    if kind == ItemKind::PullRequest {
        props.insert(
            "requested_reviewers".to_string(),
            format_logins(&item.requested_reviewers),
        );
    }
}

fn comments_section(comments: &[RemoteComment], settings: &Settings) -> String {
    if comments.is_empty() {
        return String::new();
    }

    let mut sorted: Vec<&RemoteComment> = comments.iter().collect();
    sorted.sort_by_key(|c| c.created_at);

    let mut out = String::from("\n## Comments\n\n");
    for comment in sorted {
        let user = comment
            .user
            .as_ref()
            .map(|u| u.login.as_str())
            .unwrap_or("Unknown User");
        let date = format_timestamp(comment.created_at, &settings.date_format);

        if comment.is_review {
            let line = comment
                .line
                .map(|l| l.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            let path = comment.path.as_deref().unwrap_or("unknown");
            out.push_str(&format!(
                "### {} commented on line {} of file `{}` ({}):\n\n",
                user, line, path, date
            ));
        } else {
            out.push_str(&format!("### {} commented ({}):\n\n", user, date));
        }

        let body = comment
            .body
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or("No content");
        out.push_str(&escape_body(body, settings.escape_mode));
        out.push_str("\n\n---\n\n");
    }
    out
}

fn body_section(item: &RemoteItem, comments: &[RemoteComment], settings: &Settings) -> String {
    let title = escape_body(&item.title, settings.escape_mode);
    let body = item.body.as_deref().unwrap_or("No description found");

    let mut out = format!("# {}\n{}\n", title, escape_body(body, settings.escape_mode));
    out.push_str(&comments_section(comments, settings));
    out
}

/// The full canonical document: frontmatter, blank line, title, body,
/// comment thread.
pub fn document(
    props: &IndexMap<String, String>,
    item: &RemoteItem,
    comments: &[RemoteComment],
    settings: &Settings,
) -> String {
    format!(
        "{}\n{}",
        frontmatter::serialize(props),
        body_section(item, comments, settings)
    )
}

/// The block appended (after a blank line) in append mode. The existing
/// file content is never rewritten on this path.
pub fn append_block(item: &RemoteItem, comments: &[RemoteComment], settings: &Settings) -> String {
    format!(
        "---\n### New status: \"{}\"\n\n{}",
        item.state,
        body_section(item, comments, settings)
    )
}


#[cfg(test)]
mod document_tests {
    use super::*;
    use crate::model::Account;

    fn issue() -> RemoteItem {
        RemoteItem {
            number: 7,
            title: "Fix the flux capacitor".into(),
            body: Some("It overheats.".into()),
            state: "open".into(),
            created_at: "2026-01-05T10:30:00Z".parse().unwrap(),
            html_url: "https://github.com/octo/widgets/issues/7".into(),
            user: Some(Account {
                login: "octocat".into(),
            }),
            assignees: vec![Account {
                login: "hermione".into(),
            }],
            requested_reviewers: Vec::new(),
            labels: Vec::new(),
            pull_request: None,
        }
    }

    fn settings() -> Settings {
        Settings {
            date_format: "%Y-%m-%d".into(),
            ..Settings::default()
        }
    }

    fn repo() -> RepoTracking {
        RepoTracking {
            repository: "octo/widgets".into(),
            track_issues: true,
            issue_update_mode: crate::config::UpdateMode::Update,
            ..RepoTracking::default()
        }
    }

    #[test]
    fn test_document_layout() {
        let item = issue();
        let settings = settings();
        let props = default_properties(&item, ItemKind::Issue, &repo(), &settings);
        let doc = document(&props, &item, &[], &settings);

        insta::assert_snapshot!(doc, @r#"
---
title: "Fix the flux capacitor"
status: "open"
created: "2026-01-05"
url: "https://github.com/octo/widgets/issues/7"
opened_by: "octocat"
assignees: ["hermione"]
updateMode: "update"
allowDelete: true
---

# Fix the flux capacitor
It overheats.
"#);
    }

    #[test]
    fn test_document_roundtrips_through_frontmatter() {
        let item = issue();
        let settings = settings();
        let props = default_properties(&item, ItemKind::Issue, &repo(), &settings);
        let doc = document(&props, &item, &[], &settings);

        let parsed = frontmatter::extract(&doc);
        assert_eq!(parsed, props);
    }

    #[test]
    fn test_missing_body_gets_placeholder() {
        let mut item = issue();
        item.body = None;
        let settings = settings();
        let props = default_properties(&item, ItemKind::Issue, &repo(), &settings);
        let doc = document(&props, &item, &[], &settings);
        assert!(doc.contains("# Fix the flux capacitor\nNo description found\n"));
    }

    #[test]
    fn test_pull_request_gets_reviewers_property() {
        let mut item = issue();
        item.requested_reviewers = vec![
            Account { login: "ron".into() },
            Account {
                login: "ginny".into(),
            },
        ];
        let settings = settings();
        let props = default_properties(&item, ItemKind::PullRequest, &repo(), &settings);
        assert_eq!(
            props.get("requested_reviewers").map(String::as_str),
            Some("[\"ron\", \"ginny\"]")
        );
        // Issue documents never carry the key
        let issue_props = default_properties(&item, ItemKind::Issue, &repo(), &settings);
        assert!(issue_props.get("requested_reviewers").is_none());
    }

    #[test]
    fn test_missing_author_renders_empty_opened_by() {
        let mut item = issue();
        item.user = None;
        let props = default_properties(&item, ItemKind::Issue, &repo(), &settings());
        assert_eq!(props.get("opened_by").map(String::as_str), Some("\"\""));
    }

    #[test]
    fn test_refresh_people_keeps_layout_stable() {
        let mut item = issue();
        let settings = settings();
        let mut props = default_properties(&item, ItemKind::Issue, &repo(), &settings);
        let before: Vec<String> = props.keys().cloned().collect();

        item.assignees.push(Account { login: "ron".into() });
        refresh_people(&mut props, &item, ItemKind::Issue);

        let after: Vec<String> = props.keys().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(
            props.get("assignees").map(String::as_str),
            Some("[\"hermione\", \"ron\"]")
        );
    }

    #[test]
    fn test_update_render_matches_create_render() {
        // Extract-then-rerender must reproduce the created bytes exactly
        let item = issue();
        let settings = settings();
        let props = default_properties(&item, ItemKind::Issue, &repo(), &settings);
        let created = document(&props, &item, &[], &settings);

        let mut reread = frontmatter::extract(&created);
        refresh_people(&mut reread, &item, ItemKind::Issue);
        let updated = document(&reread, &item, &[], &settings);

        assert_eq!(created, updated);
    }
}

#[cfg(test)]
mod comment_tests {
    use super::*;
    use crate::model::Account;

    fn comment(user: &str, body: &str, created_at: &str) -> RemoteComment {
        RemoteComment {
            user: Some(Account { login: user.into() }),
            body: Some(body.into()),
            created_at: created_at.parse().unwrap(),
            path: None,
            line: None,
            is_review: false,
        }
    }

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    fn test_empty_thread_renders_nothing() {
        assert_eq!(comments_section(&[], &settings()), "");
    }

    #[test]
    fn test_comments_sorted_by_creation_time() {
        let comments = vec![
            comment("ron", "Try reversing the polarity", "2026-01-06T08:00:00Z"),
            comment("hermione", "Read the manual", "2026-01-05T20:00:00Z"),
        ];
        let out = comments_section(&comments, &settings());

        assert!(out.starts_with("\n## Comments\n\n"));
        let hermione = out.find("### hermione commented (2026-01-05 20:00:00):").unwrap();
        let ron = out.find("### ron commented (2026-01-06 08:00:00):").unwrap();
        assert!(hermione < ron);
    }

    #[test]
    fn test_each_comment_followed_by_separator() {
        let comments = vec![comment("ron", "Looks fine", "2026-01-06T08:00:00Z")];
        let out = comments_section(&comments, &settings());
        assert!(out.ends_with("Looks fine\n\n---\n\n"));
    }

    #[test]
    fn test_blank_line_between_header_and_body() {
        let comments = vec![comment("ron", "Looks fine", "2026-01-06T08:00:00Z")];
        let out = comments_section(&comments, &settings());
        assert!(out.contains("### ron commented (2026-01-06 08:00:00):\n\nLooks fine"));
    }

    #[test]
    fn test_review_comment_header_names_file_and_line() {
        let mut review = comment("hermione", "This loop never terminates", "2026-01-05T20:00:00Z");
        review.is_review = true;
        review.path = Some("src/flux.rs".into());
        review.line = Some(88);

        let out = comments_section(&[review], &settings());
        assert!(out.contains(
            "### hermione commented on line 88 of file `src/flux.rs` (2026-01-05 20:00:00):"
        ));
    }

    #[test]
    fn test_review_comment_fallbacks() {
        let mut review = comment("x", "y", "2026-01-05T20:00:00Z");
        review.is_review = true;
        review.user = None;
        review.path = None;
        review.line = None;
        review.body = None;

        let out = comments_section(&[review], &settings());
        assert!(out.contains("### Unknown User commented on line N/A of file `unknown`"));
        assert!(out.contains("No content\n\n---\n\n"));
    }

    #[test]
    fn test_comment_body_is_sanitized() {
        let noisy = comment("ron", "run `rm -rf` {{now}}", "2026-01-06T08:00:00Z");
        let out = comments_section(&[noisy], &settings());
        // Settings default to strict: backticks and braces are stripped
        assert!(out.contains("run rm -rf now"));
    }
}

#[cfg(test)]
mod append_tests {
    use super::*;
    use crate::model::Account;

    #[test]
    fn test_append_block_shape() {
        let item = RemoteItem {
            number: 42,
            title: "Crash on startup".into(),
            body: Some("Still broken".into()),
            state: "open".into(),
            created_at: "2026-01-05T10:30:00Z".parse().unwrap(),
            html_url: "https://github.com/octo/widgets/issues/42".into(),
            user: Some(Account {
                login: "octocat".into(),
            }),
            assignees: Vec::new(),
            requested_reviewers: Vec::new(),
            labels: Vec::new(),
            pull_request: None,
        };

        let block = append_block(&item, &[], &Settings::default());
        assert_eq!(
            block,
            "---\n### New status: \"open\"\n\n# Crash on startup\nStill broken\n"
        );
    }
}
