//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.appraise.toml` in the current directory,
//!    home directory, or XDG config directory
//! 3. **Environment variables** – `APPRAISE_*`, or the legacy
//!    `GITHUB_TOKEN` / `OPENAI_API_KEY`
//! 4. **Command-line arguments** – `--repo-url`/`-u`, `--assignment`/`-a`,
//!    and friends

use std::env;
use std::num::NonZeroU32;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::error::AppraiseError;
use crate::github::locator::AccessToken;
use crate::review::gateway::OpenAiChatConfig;
use crate::review::level::CandidateLevel;

/// Hourly repository-API quota granted to authenticated clients.
const AUTHENTICATED_HOURLY_QUOTA: u32 = 5_000;
/// Hourly repository-API quota granted to anonymous clients.
const ANONYMOUS_HOURLY_QUOTA: u32 = 60;
const MINUTES_PER_HOUR: u32 = 60;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OPENAI_REQUESTS_PER_MINUTE: u32 = 500;
const DEFAULT_OPENAI_TIMEOUT_SECONDS: u64 = 60;

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `APPRAISE_REPO_URL` or `--repo-url`: repository URL to review
/// - `APPRAISE_ASSIGNMENT` or `--assignment`: assignment description
/// - `APPRAISE_CANDIDATE_LEVEL` or `--candidate-level`: Junior, Middle, or
///   Senior (case-insensitive)
/// - `APPRAISE_GITHUB_TOKEN`, `GITHUB_TOKEN` (legacy), or `--github-token`
/// - `APPRAISE_OPENAI_API_KEY`, `OPENAI_API_KEY` (legacy), or
///   `--openai-api-key`
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "APPRAISE",
    discovery(
        dotfile_name = ".appraise.toml",
        config_file_name = "appraise.toml",
        app_name = "appraise"
    )
)]
pub struct AppraiseConfig {
    /// Repository URL to fetch and review.
    #[ortho_config(cli_short = 'u')]
    pub repo_url: Option<String>,

    /// Description of the assignment the candidate was given.
    #[ortho_config(cli_short = 'a')]
    pub assignment: Option<String>,

    /// Candidate competency level (Junior, Middle, or Senior).
    #[ortho_config(cli_short = 'l')]
    pub candidate_level: Option<String>,

    /// Access token for the repository-hosting API.
    ///
    /// Optional: anonymous access works, under a far smaller quota.
    #[ortho_config(cli_short = 't')]
    pub github_token: Option<String>,

    /// Override for the hourly repository-API quota.
    ///
    /// When unset, the quota follows token presence: 5000 authenticated,
    /// 60 anonymous.
    #[ortho_config()]
    pub github_hourly_quota: Option<u32>,

    /// API key for the text-generation service.
    #[ortho_config()]
    pub openai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[ortho_config()]
    pub openai_base_url: String,

    /// Model identifier for generation requests.
    #[ortho_config()]
    pub openai_model: String,

    /// Per-minute request budget for the generation API.
    #[ortho_config()]
    pub openai_requests_per_minute: u32,

    /// Per-call timeout for generation requests, in seconds.
    #[ortho_config()]
    pub openai_timeout_seconds: u64,
}

impl Default for AppraiseConfig {
    fn default() -> Self {
        Self {
            repo_url: None,
            assignment: None,
            candidate_level: None,
            github_token: None,
            github_hourly_quota: None,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_owned(),
            openai_model: DEFAULT_OPENAI_MODEL.to_owned(),
            openai_requests_per_minute: DEFAULT_OPENAI_REQUESTS_PER_MINUTE,
            openai_timeout_seconds: DEFAULT_OPENAI_TIMEOUT_SECONDS,
        }
    }
}

impl AppraiseConfig {
    /// Returns the repository URL or an error if missing.
    ///
    /// # Errors
    ///
    /// Returns [`AppraiseError::Configuration`] when no URL is configured.
    pub fn require_repo_url(&self) -> Result<&str, AppraiseError> {
        self.repo_url
            .as_deref()
            .ok_or_else(|| AppraiseError::Configuration {
                message: "repository URL is required (use --repo-url)".to_owned(),
            })
    }

    /// Returns the assignment description or an error if missing.
    ///
    /// # Errors
    ///
    /// Returns [`AppraiseError::Configuration`] when no assignment is
    /// configured.
    pub fn require_assignment(&self) -> Result<&str, AppraiseError> {
        self.assignment
            .as_deref()
            .ok_or_else(|| AppraiseError::Configuration {
                message: "assignment description is required (use --assignment)".to_owned(),
            })
    }

    /// Parses the configured candidate level.
    ///
    /// # Errors
    ///
    /// Returns [`AppraiseError::Configuration`] when no level is configured
    /// and [`AppraiseError::InvalidCandidateLevel`] when the value matches
    /// no known level.
    pub fn resolve_level(&self) -> Result<CandidateLevel, AppraiseError> {
        self.candidate_level
            .as_deref()
            .ok_or_else(|| AppraiseError::Configuration {
                message: "candidate level is required (use --candidate-level)".to_owned(),
            })?
            .parse()
    }

    /// Resolves the repository-API token from configuration or the legacy
    /// `GITHUB_TOKEN` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`AppraiseError::Configuration`] when a configured token is
    /// blank.
    pub fn resolve_github_token(&self) -> Result<Option<AccessToken>, AppraiseError> {
        self.github_token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .filter(|token| !token.trim().is_empty())
            .map(AccessToken::new)
            .transpose()
    }

    /// Computes the per-minute repository-API budget.
    ///
    /// The hourly quota is divided into per-minute slices, truncating — a
    /// deliberately conservative reading of the upstream quota.
    ///
    /// # Errors
    ///
    /// Returns [`AppraiseError::Configuration`] when the configured hourly
    /// quota truncates to zero requests per minute.
    pub fn github_requests_per_minute(
        &self,
        authenticated: bool,
    ) -> Result<NonZeroU32, AppraiseError> {
        let hourly = self.github_hourly_quota.unwrap_or(if authenticated {
            AUTHENTICATED_HOURLY_QUOTA
        } else {
            ANONYMOUS_HOURLY_QUOTA
        });

        NonZeroU32::new(hourly / MINUTES_PER_HOUR).ok_or_else(|| AppraiseError::Configuration {
            message: format!(
                "hourly quota {hourly} is below {MINUTES_PER_HOUR}; per-minute budget would be zero"
            ),
        })
    }

    /// Returns the per-minute generation-API budget.
    ///
    /// # Errors
    ///
    /// Returns [`AppraiseError::Configuration`] when the configured budget
    /// is zero.
    pub fn openai_budget_per_minute(&self) -> Result<NonZeroU32, AppraiseError> {
        NonZeroU32::new(self.openai_requests_per_minute).ok_or_else(|| {
            AppraiseError::Configuration {
                message: "openai_requests_per_minute must be at least 1".to_owned(),
            }
        })
    }

    /// Builds the chat gateway configuration, resolving the API key from
    /// configuration or the legacy `OPENAI_API_KEY` environment variable.
    #[must_use]
    pub fn openai_chat_config(&self) -> OpenAiChatConfig {
        let api_key = self
            .openai_api_key
            .clone()
            .or_else(|| env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty());

        OpenAiChatConfig::new(
            self.openai_base_url.clone(),
            self.openai_model.clone(),
            api_key,
            Duration::from_secs(self.openai_timeout_seconds),
        )
    }
}
