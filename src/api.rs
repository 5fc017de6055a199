// ABOUTME: Blocking HTTP client for the GitHub REST API
// ABOUTME: Handles throttling, auth headers, pagination, and fail-fast errors

use crate::{Error, RemoteComment, RemoteItem, Result};
use rand::Rng;
use reqwest::blocking::Client;
use std::time::Duration;

const PER_PAGE: usize = 100;

fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.len() <= max_chars {
        return s.to_string();
    }

    // Find a valid UTF-8 boundary at or before max_chars
    let mut boundary = max_chars;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }

    if boundary == 0 {
        return String::new();
    }

    format!("{}...", &s[..boundary])
}

pub struct GithubClient {
    client: Client,
    base_url: String,
    token: String,
    throttle_min: u64,
    throttle_max: u64,
}

impl GithubClient {
    pub fn new(token: String, base_url: Option<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(GithubClient {
            client,
            base_url: base_url.unwrap_or_else(|| "https://api.github.com".into()),
            token,
            throttle_min: 100,
            throttle_max: 300,
        })
    }

    pub fn with_throttle(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.throttle_min = min_ms;
        self.throttle_max = max_ms;
        self
    }

    pub fn disable_throttle(mut self) -> Self {
        self.throttle_min = 0;
        self.throttle_max = 0;
        self
    }

    fn throttle(&self) {
        if self.throttle_max > 0 {
            let sleep_ms = rand::thread_rng().gen_range(self.throttle_min..=self.throttle_max);
            std::thread::sleep(Duration::from_millis(sleep_ms));
        }
    }

    /// Fetches every page of a list endpoint, 100 records at a time, until a
    /// short page signals the end of the collection.
    fn get_paged<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut all = Vec::new();
        let mut page = 1u32;

        loop {
            let mut request = self
                .client
                .get(&url)
                .header("Authorization", format!("Bearer {}", self.token))
                .header("Accept", "application/vnd.github+json")
                .header("X-GitHub-Api-Version", "2022-11-28")
                .header("User-Agent", "octomirror/0.1 (Rust)")
                .query(&[
                    ("per_page", PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ]);
            for pair in query {
                request = request.query(&[pair]);
            }

            let response = request.send()?;
            self.throttle();

            let status = response.status();
            if !status.is_success() {
                let message = response.text().unwrap_or_default();
                let preview = truncate_str(&message, 100);
                return Err(Error::Api {
                    endpoint: endpoint.into(),
                    status: status.as_u16(),
                    message: preview,
                });
            }

            // Get response text for better error messages
            let body = response.text()?;
            let batch: Vec<T> = serde_json::from_str(&body).map_err(|e| {
                eprintln!("Failed to parse response from {}: {}", endpoint, e);
                eprintln!("Response body (first 500 chars): {}", truncate_str(&body, 500));
                Error::Parse(e)
            })?;

            let fetched = batch.len();
            all.extend(batch);
            if fetched < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    /// Open issues for a repository. The listing endpoint also returns pull
    /// requests; those carry a marker field and are dropped here.
    pub fn list_open_issues(&self, owner: &str, repo: &str) -> Result<Vec<RemoteItem>> {
        let endpoint = format!("/repos/{}/{}/issues", owner, repo);
        let mut items: Vec<RemoteItem> = self.get_paged(&endpoint, &[("state", "open")])?;
        items.retain(|item| !item.is_pull_request());
        Ok(items)
    }

    pub fn list_open_pull_requests(&self, owner: &str, repo: &str) -> Result<Vec<RemoteItem>> {
        let endpoint = format!("/repos/{}/{}/pulls", owner, repo);
        self.get_paged(&endpoint, &[("state", "open")])
    }

    pub fn list_issue_comments(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<RemoteComment>> {
        let endpoint = format!("/repos/{}/{}/issues/{}/comments", owner, repo, number);
        self.get_paged(&endpoint, &[])
    }

    /// Conversation comments followed by line-level review comments, the
    /// latter flagged so the renderer can show file and line.
    pub fn list_pull_request_comments(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<RemoteComment>> {
        let mut comments = self.list_issue_comments(owner, repo, number)?;

        let endpoint = format!("/repos/{}/{}/pulls/{}/comments", owner, repo, number);
        let mut review: Vec<RemoteComment> = self.get_paged(&endpoint, &[])?;
        for comment in &mut review {
            comment.is_review = true;
        }

        comments.append(&mut review);
        Ok(comments)
    }
}
