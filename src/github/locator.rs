//! Identity wrappers for GitHub owners, repositories, tokens, and endpoints.

use std::fmt;

use url::Url;

use super::error::BoardError;

/// Public GitHub API host.
const GITHUB_API_BASE: &str = "https://api.github.com";

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    pub(crate) fn new(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub(crate) fn new(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.contains('/') {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository reference in `owner/name` form, used for board linking.
///
/// # Example
///
/// ```
/// use boardsync::github::locator::RepositorySlug;
///
/// let slug = RepositorySlug::parse("kubernetes/enhancements").expect("valid slug");
/// assert_eq!(slug.owner().as_str(), "kubernetes");
/// assert_eq!(slug.name().as_str(), "enhancements");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositorySlug {
    owner: RepositoryOwner,
    name: RepositoryName,
}

impl RepositorySlug {
    /// Parses `owner/name`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidRepository`] when either half is missing.
    pub fn parse(input: &str) -> Result<Self, BoardError> {
        let invalid = || BoardError::InvalidRepository(input.to_owned());
        let (owner_part, name_part) = input.split_once('/').ok_or_else(invalid)?;
        let owner = RepositoryOwner::new(owner_part).ok_or_else(invalid)?;
        let name = RepositoryName::new(name_part).ok_or_else(invalid)?;
        Ok(Self { owner, name })
    }

    /// Parses a comma-separated list, qualifying bare names with
    /// `default_owner`.
    ///
    /// Blank entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidRepository`] for the first malformed entry.
    pub fn parse_list(raw: &str, default_owner: &str) -> Result<Vec<Self>, BoardError> {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                if entry.contains('/') {
                    Self::parse(entry)
                } else {
                    Self::parse(&format!("{default_owner}/{entry}"))
                }
            })
            .collect()
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn name(&self) -> &RepositoryName {
        &self.name
    }
}

impl fmt::Display for RepositorySlug {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}/{}", self.owner.as_str(), self.name.as_str())
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, BoardError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(BoardError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Location of the GraphQL API.
///
/// `https://api.github.com` maps to `/graphql`; a GitHub Enterprise REST base
/// ending in `/api/v3` maps to `/api/graphql`; any other base gets `/graphql`
/// appended to its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQlEndpoint {
    origin: Url,
    path: String,
}

impl GraphQlEndpoint {
    /// Endpoint for github.com.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the constant base is valid.
    pub fn github() -> Result<Self, BoardError> {
        Self::from_api_base(GITHUB_API_BASE)
    }

    /// Derives the endpoint from a REST API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidUrl`] when the base cannot be parsed or
    /// has no host.
    pub fn from_api_base(api_base: &str) -> Result<Self, BoardError> {
        let parsed =
            Url::parse(api_base).map_err(|error| BoardError::InvalidUrl(error.to_string()))?;
        if parsed.host_str().is_none() {
            return Err(BoardError::InvalidUrl("URL must include a host".to_owned()));
        }

        let base_path = parsed.path().trim_end_matches('/');
        let path = base_path.strip_suffix("/api/v3").map_or_else(
            || format!("{base_path}/graphql"),
            |prefix| format!("{prefix}/api/graphql"),
        );

        let mut origin = parsed;
        origin.set_path("");
        origin.set_query(None);
        origin.set_fragment(None);

        Ok(Self { origin, path })
    }

    /// Scheme, host, and port of the API.
    #[must_use]
    pub const fn origin(&self) -> &Url {
        &self.origin
    }

    /// Path requests are posted to.
    #[must_use]
    pub fn path(&self) -> &str {
        self.path.as_str()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{GraphQlEndpoint, PersonalAccessToken, RepositorySlug};
    use crate::github::error::BoardError;

    #[rstest]
    #[case::github("https://api.github.com", "https://api.github.com/", "/graphql")]
    #[case::github_slash("https://api.github.com/", "https://api.github.com/", "/graphql")]
    #[case::enterprise("https://ghe.example.com/api/v3", "https://ghe.example.com/", "/api/graphql")]
    #[case::mock_server("http://127.0.0.1:8080", "http://127.0.0.1:8080/", "/graphql")]
    fn derives_graphql_endpoint(#[case] base: &str, #[case] origin: &str, #[case] path: &str) {
        let endpoint = GraphQlEndpoint::from_api_base(base).expect("endpoint should parse");
        assert_eq!(endpoint.origin().as_str(), origin, "origin mismatch");
        assert_eq!(endpoint.path(), path, "path mismatch");
    }

    #[rstest]
    fn rejects_unparseable_api_base() {
        let result = GraphQlEndpoint::from_api_base("not a url");
        assert!(
            matches!(result, Err(BoardError::InvalidUrl(_))),
            "expected InvalidUrl, got {result:?}"
        );
    }

    #[rstest]
    #[case::missing_slash("kubernetes")]
    #[case::empty_owner("/enhancements")]
    #[case::empty_name("kubernetes/")]
    #[case::nested("a/b/c")]
    fn rejects_malformed_slugs(#[case] input: &str) {
        let result = RepositorySlug::parse(input);
        assert!(
            matches!(result, Err(BoardError::InvalidRepository(_))),
            "expected InvalidRepository for {input:?}, got {result:?}"
        );
    }

    #[rstest]
    fn parse_list_qualifies_bare_names() {
        let slugs = RepositorySlug::parse_list(" enhancements, kubernetes/website ,,", "octo")
            .expect("list should parse");
        let rendered: Vec<String> = slugs.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["octo/enhancements", "kubernetes/website"]);
    }

    #[rstest]
    fn rejects_empty_token() {
        let result = PersonalAccessToken::new("   ");
        assert!(
            matches!(result, Err(BoardError::MissingToken)),
            "expected MissingToken, got {result:?}"
        );
    }
}
