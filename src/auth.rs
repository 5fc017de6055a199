// ABOUTME: GitHub token discovery with precedence chain
// ABOUTME: CLI flag → env var → config file

use crate::config::Settings;
use crate::{Error, Result};
use std::env;

pub fn resolve_token(cli_token: Option<String>, settings: &Settings) -> Result<String> {
    // 1. CLI flag
    if let Some(token) = cli_token {
        if !token.is_empty() {
            return Ok(token);
        }
    }

    // 2. Environment variable
    if let Ok(token) = env::var("GITHUB_TOKEN") {
        if !token.is_empty() {
            return Ok(token);
        }
    }

    // 3. Config file
    if !settings.github_token.is_empty() {
        return Ok(settings.github_token.clone());
    }

    Err(Error::Auth(
        "No GitHub token found. Provide via --token, GITHUB_TOKEN env var, or githubToken in the config".into(),
    ))
}
