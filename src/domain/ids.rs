//! Domain identifier types with validation
//!
//! Newtype wrappers for GitHub identifiers so a repository slug can't be
//! confused with an arbitrary path or URL.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Repository slug in `owner/repo` form
///
/// # Examples
///
/// ```
/// use issue_mirror::domain::ids::RepoSlug;
/// use std::str::FromStr;
///
/// let slug = RepoSlug::from_str("octo/notes").unwrap();
/// assert_eq!(slug.owner(), "octo");
/// assert_eq!(slug.repo(), "notes");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoSlug {
    owner: String,
    repo: String,
}

impl RepoSlug {
    /// Creates a new RepoSlug from `owner/repo`
    ///
    /// # Returns
    ///
    /// Returns `Ok(RepoSlug)` if both halves are present and non-empty, `Err` otherwise
    pub fn new(slug: impl Into<String>) -> Result<Self, String> {
        let slug = slug.into();
        let trimmed = slug.trim();
        if trimmed.is_empty() {
            return Err("Repository cannot be empty".to_string());
        }

        let mut parts = trimmed.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
                Ok(Self {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                })
            }
            _ => Err(format!(
                "Invalid repository '{trimmed}'. Expected format: owner/repo"
            )),
        }
    }

    /// Repository owner (user or organisation)
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Default GitHub Pages base URL for this repository
    pub fn pages_url(&self) -> String {
        format!("https://{}.github.io/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoSlug {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RepoSlug {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RepoSlug> for String {
    fn from(slug: RepoSlug) -> Self {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_repo_slug_valid() {
        let slug = RepoSlug::new("octo/notes").unwrap();
        assert_eq!(slug.owner(), "octo");
        assert_eq!(slug.repo(), "notes");
        assert_eq!(slug.to_string(), "octo/notes");
    }

    #[test]
    fn test_repo_slug_trims_whitespace() {
        let slug = RepoSlug::new("  octo/notes \n").unwrap();
        assert_eq!(slug.to_string(), "octo/notes");
    }

    #[test_case("" ; "empty")]
    #[test_case("octo" ; "missing repo")]
    #[test_case("octo/" ; "empty repo")]
    #[test_case("/notes" ; "empty owner")]
    #[test_case("octo/notes/extra" ; "too many segments")]
    fn test_repo_slug_invalid(input: &str) {
        assert!(RepoSlug::new(input).is_err());
    }

    #[test]
    fn test_pages_url() {
        let slug = RepoSlug::new("owner/repo").unwrap();
        assert_eq!(slug.pages_url(), "https://owner.github.io/repo");
    }

    #[test]
    fn test_repo_slug_serde() {
        let slug: RepoSlug = serde_json::from_str("\"octo/notes\"").unwrap();
        assert_eq!(slug.repo(), "notes");
        assert_eq!(serde_json::to_string(&slug).unwrap(), "\"octo/notes\"");
        assert!(serde_json::from_str::<RepoSlug>("\"nope\"").is_err());
    }
}
