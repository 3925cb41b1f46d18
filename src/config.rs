//! Configuration for upload runs.
//!
//! Values come from CLI arguments first, then from the environment. The
//! environment is captured once into an [`EnvConfig`] so resolution can be
//! tested without touching the process environment.

use crate::artifact::ArtifactDiscovery;
use crate::error::{ConfigError, Result};
use crate::github::DEFAULT_API_URL;
use crate::uploader::{DEFAULT_INITIAL_DELAY, DEFAULT_MAX_RETRIES, RetryPolicy, UploadPolicy};
use std::collections::HashMap;
use std::time::Duration;

/// Upper bound for `KODEGEN_UPLOAD_RETRIES`
const MAX_RETRIES: u32 = 10;

/// Upper bound for `KODEGEN_UPLOAD_RETRY_DELAY` (seconds)
const MAX_INITIAL_DELAY_SECS: u64 = 300;

/// Snapshot of environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture the current process environment
    pub fn from_env() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Look up a non-empty variable
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.trim().is_empty()).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Where and as whom to talk to GitHub
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// API token
    pub token: String,
    /// API base URL
    pub api_url: String,
}

impl ConnectionConfig {
    /// Resolve connection settings.
    ///
    /// Token order: explicit, `GH_TOKEN`, `GITHUB_TOKEN`. Repository order:
    /// explicit, `GITHUB_REPOSITORY`. API URL order: explicit,
    /// `GITHUB_API_URL`, public GitHub.
    pub fn resolve(
        repo: Option<&str>,
        token: Option<&str>,
        api_url: Option<&str>,
        env: &EnvConfig,
    ) -> Result<Self> {
        let slug = repo
            .map(str::to_string)
            .or_else(|| env.get("GITHUB_REPOSITORY"))
            .unwrap_or_default();
        let (owner, repo) = parse_github_repo(&slug)?;

        let token = token
            .map(str::to_string)
            .filter(|t| !t.trim().is_empty())
            .or_else(|| env.get("GH_TOKEN"))
            .or_else(|| env.get("GITHUB_TOKEN"))
            .ok_or(ConfigError::MissingToken)?;

        let api_url = api_url
            .map(str::to_string)
            .or_else(|| env.get("GITHUB_API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            owner,
            repo,
            token,
            api_url,
        })
    }
}

/// Everything an upload run needs
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// GitHub connection
    pub connection: ConnectionConfig,
    /// Target release
    pub release_id: u64,
    /// Upload endpoint; looked up from the release when absent
    pub upload_url: Option<String>,
    /// Artifact glob patterns
    pub artifacts: Vec<String>,
    /// Content type forced on every artifact
    pub content_type: Option<String>,
    /// Fail when a pattern matches nothing
    pub fail_on_missing_artifacts: bool,
    /// Replace/remove/error policy
    pub policy: UploadPolicy,
}

impl UploadConfig {
    /// Artifact discovery configured from this run
    pub fn discovery(&self) -> ArtifactDiscovery {
        ArtifactDiscovery::new(self.artifacts.clone())
            .with_content_type(self.content_type.clone())
            .fail_on_missing(self.fail_on_missing_artifacts)
    }
}

/// Parse `owner/repo`
pub fn parse_github_repo(value: &str) -> Result<(String, String)> {
    let invalid = || ConfigError::InvalidRepository {
        value: value.to_string(),
    };

    let (owner, repo) = value.trim().split_once('/').ok_or_else(invalid)?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(invalid().into());
    }

    Ok((owner.to_string(), repo.to_string()))
}

/// Parse a number from the environment, clamped to `max`
fn parse_env_clamped<T>(env: &EnvConfig, var_name: &str, default: T, max: T) -> T
where
    T: std::str::FromStr + Ord,
{
    env.get(var_name)
        .and_then(|s| s.trim().parse::<T>().ok())
        .map(|v| v.min(max))
        .unwrap_or(default)
}

/// Retry policy with `KODEGEN_UPLOAD_RETRIES` / `KODEGEN_UPLOAD_RETRY_DELAY` overrides
pub fn retry_policy_from_env(env: &EnvConfig) -> RetryPolicy {
    let max_retries = parse_env_clamped(env, "KODEGEN_UPLOAD_RETRIES", DEFAULT_MAX_RETRIES, MAX_RETRIES);
    let delay_secs = parse_env_clamped(
        env,
        "KODEGEN_UPLOAD_RETRY_DELAY",
        DEFAULT_INITIAL_DELAY.as_secs(),
        MAX_INITIAL_DELAY_SECS,
    );
    RetryPolicy::new(max_retries, Duration::from_secs(delay_secs))
}
