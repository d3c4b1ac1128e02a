//! Repository URL parsing and identity wrappers.

use url::Url;

use crate::error::AppraiseError;

fn invalid_reference(message: impl Into<String>) -> AppraiseError {
    AppraiseError::InvalidReference {
        message: message.into(),
    }
}

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    pub(crate) fn new(value: &str) -> Result<Self, AppraiseError> {
        if value.is_empty() {
            return Err(invalid_reference("owner segment is empty"));
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub(crate) fn new(value: &str) -> Result<Self, AppraiseError> {
        if value.is_empty() {
            return Err(invalid_reference("repository segment is empty"));
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Access token wrapper enforcing a non-blank value.
///
/// The token is optional at the API level (anonymous requests merely get a
/// far smaller quota), so callers hold an `Option<AccessToken>` rather than
/// an `AccessToken` holding an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`AppraiseError::Configuration`] when the supplied string is
    /// blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, AppraiseError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AppraiseError::Configuration {
                message: "access token must not be blank".to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Derives the REST API base URL from a host string.
///
/// `github.com` maps to the public API host; any other host is treated as an
/// enterprise installation serving the API under `/api/v3`.
fn derive_api_base(parsed: &Url) -> Result<Url, AppraiseError> {
    let host = parsed
        .host_str()
        .ok_or_else(|| invalid_reference("URL must include a host"))?;

    if host.eq_ignore_ascii_case("github.com") {
        return Url::parse("https://api.github.com")
            .map_err(|error| invalid_reference(error.to_string()));
    }

    let mut api_url = Url::parse(&format!("{}://{host}", parsed.scheme()))
        .map_err(|error| invalid_reference(error.to_string()))?;
    api_url
        .set_port(parsed.port())
        .map_err(|()| invalid_reference("invalid port"))?;
    api_url.set_path("api/v3");
    Ok(api_url)
}

/// Parsed repository URL with derived API base.
///
/// # Example
///
/// ```
/// use appraise::github::RepositoryLocator;
///
/// let locator = RepositoryLocator::parse("https://github.com/octo/repo")
///     .expect("should parse repository URL");
/// assert_eq!(locator.owner().as_str(), "octo");
/// assert_eq!(locator.repository().as_str(), "repo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    api_base: Url,
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryLocator {
    /// Parses a repository URL in the form
    /// `https://<host>/<owner>/<repo>[/...]`.
    ///
    /// Trailing path segments beyond the repository name are ignored, so a
    /// URL copied with a `/tree/main` suffix still resolves.
    ///
    /// # Errors
    ///
    /// Returns [`AppraiseError::InvalidReference`] when the URL does not
    /// parse or carries fewer than two path segments after the host.
    pub fn parse(input: &str) -> Result<Self, AppraiseError> {
        let parsed = Url::parse(input).map_err(|error| invalid_reference(error.to_string()))?;

        let mut segments = parsed
            .path_segments()
            .ok_or_else(|| invalid_reference("URL has no path segments"))?;

        let owner_segment = segments
            .next()
            .ok_or_else(|| invalid_reference("URL is missing the owner segment"))?;
        let repository_segment = segments
            .next()
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| invalid_reference("URL is missing the repository segment"))?;

        let owner = RepositoryOwner::new(owner_segment)?;
        let repository = RepositoryName::new(repository_segment)?;
        let api_base = derive_api_base(&parsed)?;

        Ok(Self {
            api_base,
            owner,
            repository,
        })
    }

    /// API base URL derived from the repository host.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Repository owner as parsed from the URL.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name as parsed from the URL.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Returns the API path for the repository metadata lookup.
    pub(crate) fn repository_path(&self) -> String {
        format!(
            "/repos/{}/{}",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    /// Returns the API path for the recursive tree listing of `branch`.
    pub(crate) fn tree_path(&self, branch: &str) -> String {
        format!(
            "/repos/{}/{}/git/trees/{branch}",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    /// Returns the API path for the content of `file_path`.
    pub(crate) fn contents_path(&self, file_path: &str) -> String {
        format!(
            "/repos/{}/{}/contents/{file_path}",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }
}
