pub mod diff;
pub mod types;

pub use types::{ChangedFile, FileStatus, PrContext};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum PrError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Invalid PR URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid PR context: {0}")]
    InvalidContext(String),
}

/// Supplies the set of files touched by a pull request. Implemented by
/// [`GithubClient`] in production and by stubs in pipeline tests.
#[async_trait]
pub trait ChangeSetProvider: Send + Sync {
    /// List the files changed by the PR, in the order the host reports
    /// them. Any transport or auth failure is fatal to the run.
    async fn changed_files(&self, ctx: &PrContext) -> Result<Vec<ChangedFile>, PrError>;
}

/// Parse a GitHub PR URL into its component parts.
/// Expected format: https://github.com/{owner}/{repo}/pull/{number}
pub fn parse_pr_url(url: &str) -> Result<PrContext, PrError> {
    let parsed =
        reqwest::Url::parse(url).map_err(|_| PrError::InvalidUrl(url.to_string()))?;

    if parsed.host_str() != Some("github.com") {
        return Err(PrError::InvalidUrl(url.to_string()));
    }

    let segments: Vec<_> = parsed
        .path_segments()
        .ok_or_else(|| PrError::InvalidUrl(url.to_string()))?
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.len() != 4 || segments[2] != "pull" {
        return Err(PrError::InvalidUrl(url.to_string()));
    }

    let number = segments[3]
        .parse::<u64>()
        .map_err(|_| PrError::InvalidUrl(url.to_string()))?;

    Ok(PrContext {
        owner: segments[0].to_string(),
        repo: segments[1].to_string(),
        number,
    })
}

/// Build a PrContext from the GitHub Actions environment:
/// GITHUB_REPOSITORY ("owner/repo") plus PR_NUMBER set by the workflow.
pub fn context_from_env() -> Result<PrContext, PrError> {
    let repository = std::env::var("GITHUB_REPOSITORY")
        .map_err(|_| PrError::InvalidContext("GITHUB_REPOSITORY is not set".to_string()))?;
    let (owner, repo) = repository.split_once('/').ok_or_else(|| {
        PrError::InvalidContext(format!("GITHUB_REPOSITORY is not owner/repo: {repository}"))
    })?;
    let number = std::env::var("PR_NUMBER")
        .map_err(|_| PrError::InvalidContext("PR_NUMBER is not set".to_string()))?
        .parse::<u64>()
        .map_err(|_| PrError::InvalidContext("PR_NUMBER is not a number".to_string()))?;

    Ok(PrContext {
        owner: owner.to_string(),
        repo: repo.to_string(),
        number,
    })
}

/// Keep only the files worth reviewing: a supported source extension
/// and not removed by the PR. An empty result is the normal early-exit
/// path for the whole run.
pub fn filter_reviewable(files: &[ChangedFile], extensions: &[String]) -> Vec<ChangedFile> {
    files
        .iter()
        .filter(|f| f.status != FileStatus::Removed)
        .filter(|f| extensions.iter().any(|ext| f.filename.ends_with(ext.as_str())))
        .cloned()
        .collect()
}

/// Authenticated GitHub REST client. Constructed once per run and used
/// both to fetch the change set and to publish the review.
pub struct GithubClient {
    client: reqwest::Client,
    token: String,
}

const USER_AGENT: &str = "pr-reviewer";

impl GithubClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }

    pub(crate) fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .bearer_auth(&self.token)
    }

    pub(crate) fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("User-Agent", USER_AGENT)
            .bearer_auth(&self.token)
    }
}

#[async_trait]
impl ChangeSetProvider for GithubClient {
    #[instrument(skip(self), fields(owner = %ctx.owner, repo = %ctx.repo, pr = ctx.number))]
    async fn changed_files(&self, ctx: &PrContext) -> Result<Vec<ChangedFile>, PrError> {
        let url = format!(
            "https://api.github.com/repos/{}/{}/pulls/{}/files?per_page=100",
            ctx.owner, ctx.repo, ctx.number
        );

        debug!("fetching changed files from GitHub API");
        let files = self
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<ChangedFile>>()
            .await?;
        debug!(files = files.len(), "received change set");

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, status: FileStatus) -> ChangedFile {
        ChangedFile {
            filename: name.to_string(),
            status,
            patch: None,
        }
    }

    fn default_extensions() -> Vec<String> {
        vec![".ts", ".js", ".tsx", ".jsx"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_valid_pr_url() {
        let ctx = parse_pr_url("https://github.com/org/repo/pull/42").unwrap();
        assert_eq!(ctx.owner, "org");
        assert_eq!(ctx.repo, "repo");
        assert_eq!(ctx.number, 42);
    }

    #[test]
    fn test_parse_invalid_pr_url() {
        assert!(parse_pr_url("https://example.com").is_err());
        assert!(parse_pr_url("not-a-url").is_err());
        assert!(parse_pr_url("https://github.com/org/repo/pulls/42").is_err());
    }

    #[test]
    fn test_filter_keeps_supported_extensions() {
        let files = vec![
            file("src/app.ts", FileStatus::Modified),
            file("README.md", FileStatus::Modified),
            file("pages/index.jsx", FileStatus::Added),
            file("Cargo.toml", FileStatus::Added),
        ];
        let kept = filter_reviewable(&files, &default_extensions());
        let names: Vec<&str> = kept.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["src/app.ts", "pages/index.jsx"]);
    }

    #[test]
    fn test_filter_drops_removed_files() {
        let files = vec![
            file("src/old.js", FileStatus::Removed),
            file("src/new.js", FileStatus::Added),
        ];
        let kept = filter_reviewable(&files, &default_extensions());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].filename, "src/new.js");
    }

    #[test]
    fn test_filter_keeps_renamed_and_unknown_status() {
        let files = vec![
            file("src/moved.tsx", FileStatus::Renamed),
            file("src/copied.js", FileStatus::Other),
        ];
        assert_eq!(filter_reviewable(&files, &default_extensions()).len(), 2);
    }

    #[test]
    fn test_filter_empty_input() {
        assert!(filter_reviewable(&[], &default_extensions()).is_empty());
    }
}
