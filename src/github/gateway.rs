//! Rate-limited gateway over the repository hosting API.
//!
//! The trait-based design enables mocking in tests while the Octocrab
//! implementation handles real HTTP requests. Every request passes through
//! the gateway's [`SlidingWindowLimiter`] before it is issued, so callers
//! fanning out concurrently are bounded by the upstream quota rather than by
//! any separate concurrency cap.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use http::Uri;
use octocrab::Octocrab;

use crate::error::AppraiseError;
use crate::github::locator::{AccessToken, RepositoryLocator};
use crate::github::models::{ApiFileContent, ApiRepository, ApiTreeListing};
use crate::throttle::SlidingWindowLimiter;

/// Gateway over the three repository read operations the fetcher needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryDataGateway: Send + Sync {
    /// Fetch repository metadata (canonical name, owner, default branch).
    async fn repository(
        &self,
        locator: &RepositoryLocator,
    ) -> Result<ApiRepository, AppraiseError>;

    /// Fetch the full recursive tree listing of `branch`.
    async fn tree(
        &self,
        locator: &RepositoryLocator,
        branch: &str,
    ) -> Result<ApiTreeListing, AppraiseError>;

    /// Fetch one file's content, decoded to UTF-8 text.
    async fn file_text(
        &self,
        locator: &RepositoryLocator,
        path: &str,
    ) -> Result<String, AppraiseError>;
}

/// Octocrab-backed gateway holding its own request limiter.
pub struct OctocrabRepositoryGateway {
    client: Octocrab,
    limiter: Arc<SlidingWindowLimiter>,
}

impl OctocrabRepositoryGateway {
    /// Builds a gateway for the locator's API base.
    ///
    /// The token is optional; anonymous clients simply operate under the
    /// smaller anonymous quota, which the caller reflects in the limiter's
    /// budget.
    ///
    /// # Errors
    ///
    /// Returns [`AppraiseError::InvalidReference`] when the API base cannot
    /// be parsed as a URI and [`AppraiseError::Configuration`] when Octocrab
    /// fails to construct a client.
    pub fn for_locator(
        locator: &RepositoryLocator,
        token: Option<&AccessToken>,
        limiter: Arc<SlidingWindowLimiter>,
    ) -> Result<Self, AppraiseError> {
        let base_uri: Uri = locator.api_base().as_str().parse::<Uri>().map_err(|error| {
            AppraiseError::InvalidReference {
                message: error.to_string(),
            }
        })?;

        let builder = Octocrab::builder();
        let builder = match token {
            Some(token) => builder.personal_token(token.value().to_owned()),
            None => builder,
        };

        let client = builder
            .base_uri(base_uri)
            .map_err(|error| AppraiseError::Configuration {
                message: format!("failed to configure API base: {error}"),
            })?
            .build()
            .map_err(|error| AppraiseError::Configuration {
                message: format!("failed to build API client: {error}"),
            })?;

        Ok(Self { client, limiter })
    }
}

#[async_trait]
impl RepositoryDataGateway for OctocrabRepositoryGateway {
    async fn repository(
        &self,
        locator: &RepositoryLocator,
    ) -> Result<ApiRepository, AppraiseError> {
        self.limiter.acquire().await;
        self.client
            .get(locator.repository_path(), None::<&()>)
            .await
            .map_err(|error| map_octocrab_error("repository lookup", &error))
    }

    async fn tree(
        &self,
        locator: &RepositoryLocator,
        branch: &str,
    ) -> Result<ApiTreeListing, AppraiseError> {
        self.limiter.acquire().await;
        let query = [("recursive", "1")];
        self.client
            .get(locator.tree_path(branch), Some(&query))
            .await
            .map_err(|error| map_octocrab_error("tree listing", &error))
    }

    async fn file_text(
        &self,
        locator: &RepositoryLocator,
        path: &str,
    ) -> Result<String, AppraiseError> {
        self.limiter.acquire().await;
        let payload: ApiFileContent = self
            .client
            .get(locator.contents_path(path), None::<&()>)
            .await
            .map_err(|error| map_octocrab_error("content fetch", &error))?;

        decode_file_content(path, &payload)
    }
}

/// Maps an Octocrab failure onto the upstream error class, preserving the
/// HTTP status and message when the API produced one.
fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> AppraiseError {
    if let octocrab::Error::GitHub { source, .. } = error {
        return AppraiseError::UpstreamUnavailable {
            status: Some(source.status_code.as_u16()),
            message: format!(
                "{operation} failed with status {status}: {message}",
                status = source.status_code,
                message = source.message
            ),
        };
    }

    AppraiseError::UpstreamUnavailable {
        status: None,
        message: format!("{operation} failed: {error}"),
    }
}

/// Decodes a contents payload to UTF-8 text.
///
/// The API wraps base64 bodies across lines, so whitespace is stripped
/// before decoding.
fn decode_file_content(path: &str, payload: &ApiFileContent) -> Result<String, AppraiseError> {
    let unavailable = |message: String| AppraiseError::UpstreamUnavailable {
        status: None,
        message,
    };

    if payload.encoding != "base64" {
        return Err(unavailable(format!(
            "{path}: unsupported content encoding `{}`",
            payload.encoding
        )));
    }

    let compact: String = payload
        .content
        .chars()
        .filter(|character| !character.is_ascii_whitespace())
        .collect();

    let bytes = BASE64
        .decode(compact)
        .map_err(|error| unavailable(format!("{path}: content is not valid base64: {error}")))?;

    String::from_utf8(bytes)
        .map_err(|error| unavailable(format!("{path}: content is not valid UTF-8: {error}")))
}
