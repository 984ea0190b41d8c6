use std::sync::LazyLock;

use async_trait::async_trait;
use octocrab::Octocrab;
use regex::Regex;

use crate::{
    error::{ApiError, Operation},
    graphql::{
        GraphQLResponse, RepositoryData, ResolveThreadData, ReviewThreadNode,
        collect_review_threads, flatten_threads, resolve_thread_request, review_threads_request,
        thread_for_comment,
    },
    types::{PrInfo, ReviewComment},
};

static PR_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com/([^/]+)/([^/]+)/pull/(\d+)(?:[/?#]|$)")
        .expect("PR URL pattern is valid")
});

/// Parses `https://github.com/<owner>/<repo>/pull/<number>[/...]`.
pub fn parse_pr_url(url: &str) -> Result<PrInfo, ApiError> {
    let captures = PR_URL.captures(url.trim()).ok_or(ApiError::InvalidPrUrl)?;

    let owner = &captures[1];
    let repo = &captures[2];
    let pull_number = captures[3]
        .parse::<u64>()
        .map_err(|_| ApiError::InvalidPrUrl)?;

    Ok(PrInfo::new(owner, repo, pull_number))
}

/// The pull request review operations the commands depend on.
#[async_trait]
pub trait ReviewApi {
    /// Lists every review comment on the pull request, tagged with whether
    /// its thread is resolved.
    async fn review_comments(&self, pr: &PrInfo) -> Result<Vec<ReviewComment>, ApiError>;

    /// Resolves the review thread containing the comment.
    async fn resolve_comment(&self, pr: &PrInfo, comment_id: u64) -> Result<(), ApiError>;

    /// Permanently deletes the review comment.
    async fn delete_comment(&self, pr: &PrInfo, comment_id: u64) -> Result<(), ApiError>;
}

/// `ReviewApi` backed by GitHub: GraphQL for threads, REST for deletes.
pub struct GitHub {
    octocrab: Octocrab,
}

impl GitHub {
    /// Creates a client from an already-resolved token.
    pub fn new(token: Option<String>) -> Result<Self, ApiError> {
        let token = token.ok_or(ApiError::MissingCredentials)?;
        let octocrab = Octocrab::builder()
            .personal_token(token)
            .build()
            .map_err(|e| ApiError::from_octocrab(Operation::CreateClient, e))?;

        Ok(Self { octocrab })
    }

    async fn review_threads(
        &self,
        pr: &PrInfo,
        operation: Operation,
    ) -> Result<Vec<ReviewThreadNode>, ApiError> {
        let threads = collect_review_threads(move |after| async move {
            let request =
                review_threads_request(&pr.owner, &pr.repo, pr.pull_number, after.as_deref());
            let response: GraphQLResponse<RepositoryData> = self
                .octocrab
                .graphql(&request)
                .await
                .map_err(|e| ApiError::from_octocrab(operation, e))?;

            response
                .into_data(operation)?
                .repository
                .and_then(|repo| repo.pull_request)
                .map(|pull| pull.review_threads)
                .ok_or_else(|| {
                    ApiError::request(operation, Some(format!("pull request {pr} not found")))
                })
        })
        .await?;

        tracing::debug!("{pr} has {} review threads", threads.len());
        Ok(threads)
    }
}

#[async_trait]
impl ReviewApi for GitHub {
    async fn review_comments(&self, pr: &PrInfo) -> Result<Vec<ReviewComment>, ApiError> {
        let threads = self.review_threads(pr, Operation::FetchComments).await?;
        let comments = flatten_threads(threads);
        tracing::debug!("{pr} has {} review comments", comments.len());
        Ok(comments)
    }

    async fn resolve_comment(&self, pr: &PrInfo, comment_id: u64) -> Result<(), ApiError> {
        let operation = Operation::ResolveComment;
        let threads = self.review_threads(pr, operation).await?;

        let thread = thread_for_comment(&threads, comment_id)?;

        tracing::debug!("resolving thread {} for comment {comment_id}", thread.id);

        let response: GraphQLResponse<ResolveThreadData> = self
            .octocrab
            .graphql(&resolve_thread_request(&thread.id))
            .await
            .map_err(|e| ApiError::from_octocrab(operation, e))?;

        let resolved = response
            .into_data(operation)?
            .resolve_review_thread
            .ok_or_else(|| ApiError::request(operation, None))?;

        if !resolved.thread.is_resolved {
            tracing::warn!("thread {} still reported as unresolved", resolved.thread.id);
        }

        Ok(())
    }

    async fn delete_comment(&self, pr: &PrInfo, comment_id: u64) -> Result<(), ApiError> {
        let operation = Operation::DeleteComment;
        let route = format!(
            "/repos/{}/{}/pulls/comments/{comment_id}",
            pr.owner, pr.repo
        );
        tracing::debug!("deleting comment {comment_id} on {pr}");

        // `_delete` leaves error statuses to the caller.
        let response = self
            .octocrab
            ._delete(route, None::<&()>)
            .await
            .map_err(|e| ApiError::from_octocrab(operation, e))?;
        octocrab::map_github_error(response)
            .await
            .map_err(|e| ApiError::from_octocrab(operation, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pr_url_basic() {
        let pr = parse_pr_url("https://github.com/owner/repo/pull/123").unwrap();
        assert_eq!(pr, PrInfo::new("owner", "repo", 123));
    }

    #[test]
    fn test_parse_pr_url_ignores_trailing_segments() {
        let pr = parse_pr_url("https://github.com/owner-1/repo_2/pull/123/files").unwrap();
        assert_eq!(pr.owner, "owner-1");
        assert_eq!(pr.repo, "repo_2");
        assert_eq!(pr.pull_number, 123);

        let pr = parse_pr_url("https://github.com/owner/repo/pull/9#discussion_r1").unwrap();
        assert_eq!(pr.pull_number, 9);

        let pr = parse_pr_url("https://github.com/owner/repo/pull/9?w=1").unwrap();
        assert_eq!(pr.pull_number, 9);
    }

    #[test]
    fn test_parse_pr_url_rejects_invalid() {
        for url in [
            "",
            "https://gitlab.com/owner/repo/pull/123",
            "https://github.com/owner/repo",
            "https://github.com/owner/repo/pull/",
            "https://github.com/owner/repo/pull/abc",
            "https://github.com/owner/repo/pull/12abc",
            "https://github.com/owner/repo/issues/123",
        ] {
            let err = parse_pr_url(url).unwrap_err();
            assert_eq!(err, ApiError::InvalidPrUrl, "url: {url:?}");
            assert_eq!(err.to_string(), "Invalid GitHub PR URL format");
        }
    }

    #[test]
    fn test_missing_token_is_an_error() {
        assert_eq!(GitHub::new(None).err(), Some(ApiError::MissingCredentials));
    }
}
