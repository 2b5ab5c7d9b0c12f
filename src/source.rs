//! Source URL analysis: artifact naming and GitHub archive recognition.

/// Host whose archive URLs can be rewritten to a structured fetch.
const GITHUB_HOST: &str = "github.com";

/// Archive suffix required for the structured fetch rewrite.
const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Derive the artifact filename from a source URL.
///
/// Returns the final path segment with any query string or fragment
/// stripped. `fetchurl` names the downloaded file after the URL and cannot
/// strip parameters itself, so the generated expression pins the name
/// explicitly.
///
/// # Examples
///
/// ```
/// use ros_nix_expression::source_file_name;
///
/// assert_eq!(
///     source_file_name("https://example.org/pkg/foo-1.0.tar.gz?token=abc"),
///     "foo-1.0.tar.gz"
/// );
/// ```
pub fn source_file_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path).to_string()
}

/// A GitHub release archive recognized from its download URL.
///
/// GitHub serves source tarballs at
/// `https://github.com/<owner>/<repo>/archive/<rev>.tar.gz`. When a source
/// URL has exactly this shape the generated expression can use
/// `fetchFromGitHub` instead of `fetchurl`, which hashes the unpacked tree
/// rather than the tarball bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubArchive {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Tag or revision, possibly containing `/`.
    pub rev: String,
}

impl GithubArchive {
    /// Recognize a GitHub archive URL, returning `None` for anything else.
    ///
    /// The check is deliberately structural rather than a general URL
    /// parse: after the scheme the URL must split into at least five
    /// `/`-separated segments laid out as
    /// `[github.com, owner, repo, "archive", rev...]`, and the whole URL
    /// must end in `.tar.gz`. The revision segments are re-joined, so tags
    /// containing `/` survive. The host comparison is exact; mirrors and
    /// subdomains stay on the generic fetch path. Malformed input is never
    /// an error, just unrecognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use ros_nix_expression::GithubArchive;
    ///
    /// let archive =
    ///     GithubArchive::from_url("https://github.com/me/foo/archive/1.0.0.tar.gz").unwrap();
    /// assert_eq!(archive.owner, "me");
    /// assert_eq!(archive.repo, "foo");
    /// assert_eq!(archive.rev, "1.0.0");
    ///
    /// assert!(GithubArchive::from_url("https://example.org/foo.tar.gz").is_none());
    /// ```
    pub fn from_url(url: &str) -> Option<GithubArchive> {
        if !url.ends_with(ARCHIVE_SUFFIX) {
            return None;
        }
        let after_scheme = match url.split_once("//") {
            Some((_, rest)) => rest,
            None => return None,
        };

        // Expected layout: github.com/<owner>/<repo>/archive/<rev...>.tar.gz
        let segments: Vec<&str> = after_scheme.split('/').collect();
        if segments.len() < 5 {
            return None;
        }
        if segments[0] != GITHUB_HOST || segments[3] != "archive" {
            return None;
        }

        let mut rev_segments: Vec<&str> = segments[4..].to_vec();
        let last = rev_segments.last_mut()?;
        *last = last.strip_suffix(ARCHIVE_SUFFIX)?;

        Some(GithubArchive {
            owner: segments[1].to_string(),
            repo: segments[2].to_string(),
            rev: rev_segments.join("/"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_plain() {
        assert_eq!(
            source_file_name("https://example.org/pkg/foo-1.0.tar.gz"),
            "foo-1.0.tar.gz"
        );
    }

    #[test]
    fn file_name_strips_query() {
        assert_eq!(
            source_file_name("https://example.org/pkg/foo-1.0.tar.gz?token=abc"),
            "foo-1.0.tar.gz"
        );
    }

    #[test]
    fn file_name_strips_fragment() {
        assert_eq!(
            source_file_name("https://example.org/pkg/foo-1.0.tar.gz#sec"),
            "foo-1.0.tar.gz"
        );
    }

    #[test]
    fn file_name_query_with_slash() {
        assert_eq!(
            source_file_name("https://example.org/pkg/foo.tar.gz?path=a/b"),
            "foo.tar.gz"
        );
    }

    #[test]
    fn recognize_archive_url() {
        let archive =
            GithubArchive::from_url("https://github.com/owner/repo/archive/v1.2.0.tar.gz")
                .unwrap();
        assert_eq!(archive.owner, "owner");
        assert_eq!(archive.repo, "repo");
        assert_eq!(archive.rev, "v1.2.0");
    }

    #[test]
    fn recognize_tag_with_slash() {
        let archive = GithubArchive::from_url(
            "https://github.com/owner/repo/archive/release/v1.2.0.tar.gz",
        )
        .unwrap();
        assert_eq!(archive.rev, "release/v1.2.0");
    }

    #[test]
    fn reject_wrong_host() {
        assert!(GithubArchive::from_url("https://gitlab.com/owner/repo/archive/v1.tar.gz").is_none());
    }

    #[test]
    fn reject_subdomain_host() {
        assert!(GithubArchive::from_url(
            "https://codeload.github.com/owner/repo/archive/v1.tar.gz"
        )
        .is_none());
    }

    #[test]
    fn reject_missing_archive_segment() {
        assert!(GithubArchive::from_url("https://github.com/owner/repo/v1.tar.gz").is_none());
    }

    #[test]
    fn reject_renamed_archive_segment() {
        assert!(
            GithubArchive::from_url("https://github.com/owner/repo/releases/v1.tar.gz").is_none()
        );
    }

    #[test]
    fn reject_wrong_suffix() {
        assert!(GithubArchive::from_url("https://github.com/owner/repo/archive/v1.zip").is_none());
    }

    #[test]
    fn reject_no_scheme() {
        assert!(GithubArchive::from_url("github.com/owner/repo/archive/v1.tar.gz").is_none());
    }

    #[test]
    fn reject_empty() {
        assert!(GithubArchive::from_url("").is_none());
    }
}
