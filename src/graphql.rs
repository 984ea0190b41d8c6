//! GraphQL documents and response shapes for review threads.
//!
//! Responses are decoded once into these records; a payload that does not
//! match fails the decode instead of surfacing as missing fields later.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    error::{ApiError, Operation},
    types::{Author, ReviewComment, UNKNOWN_AUTHOR},
};

pub const REVIEW_THREADS_QUERY: &str = r#"
    query($owner: String!, $repo: String!, $number: Int!, $after: String) {
        repository(owner: $owner, name: $repo) {
            pullRequest(number: $number) {
                reviewThreads(first: 100, after: $after) {
                    nodes {
                        id
                        isResolved
                        comments(first: 100) {
                            nodes {
                                id
                                databaseId
                                body
                                path
                                line
                                startLine
                                author {
                                    login
                                }
                                url
                                position
                                originalPosition
                                diffHunk
                                createdAt
                                updatedAt
                            }
                            pageInfo {
                                hasNextPage
                            }
                        }
                    }
                    pageInfo {
                        hasNextPage
                        endCursor
                    }
                }
            }
        }
    }
"#;

pub const RESOLVE_THREAD_MUTATION: &str = r#"
    mutation($threadId: ID!) {
        resolveReviewThread(input: { threadId: $threadId }) {
            thread {
                id
                isResolved
            }
        }
    }
"#;

/// Builds the request body for one page of review threads.
pub fn review_threads_request(
    owner: &str,
    repo: &str,
    number: u64,
    after: Option<&str>,
) -> serde_json::Value {
    serde_json::json!({
        "query": REVIEW_THREADS_QUERY,
        "variables": {
            "owner": owner,
            "repo": repo,
            "number": number,
            "after": after,
        }
    })
}

pub fn resolve_thread_request(thread_id: &str) -> serde_json::Value {
    serde_json::json!({
        "query": RESOLVE_THREAD_MUTATION,
        "variables": { "threadId": thread_id }
    })
}

/// Top-level GraphQL envelope. GitHub reports query failures with HTTP 200
/// and an `errors` array.
#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
}

impl<T> GraphQLResponse<T> {
    /// Returns the payload, or the reclassified error when GitHub reported
    /// one or returned no data.
    pub fn into_data(self, operation: Operation) -> Result<T, ApiError> {
        if !self.errors.is_empty() {
            let message = self
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            let types = self.errors.iter().filter_map(|e| e.error_type.as_deref());
            return Err(ApiError::from_graphql(operation, types, Some(message)));
        }

        self.data.ok_or_else(|| ApiError::request(operation, None))
    }
}

#[derive(Debug, Deserialize)]
pub struct RepositoryData {
    pub repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub pull_request: Option<PullRequestThreads>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestThreads {
    pub review_threads: ReviewThreadConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewThreadConnection {
    pub nodes: Vec<ReviewThreadNode>,
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

impl PageInfo {
    /// The cursor to request next, or `None` on the last page.
    pub fn next_cursor(self) -> Option<String> {
        let has_next_page = self.has_next_page;
        self.end_cursor.filter(|_| has_next_page)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewThreadNode {
    pub id: String,
    #[serde(default)]
    pub is_resolved: bool,
    pub comments: ThreadCommentConnection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadCommentConnection {
    pub nodes: Vec<ThreadCommentNode>,
    #[serde(default)]
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadCommentNode {
    pub id: String,
    pub database_id: Option<u64>,
    #[serde(default)]
    pub body: String,
    pub path: Option<String>,
    pub line: Option<u64>,
    pub start_line: Option<u64>,
    pub author: Option<GraphQLAuthor>,
    #[serde(default)]
    pub url: String,
    pub position: Option<u64>,
    pub original_position: Option<u64>,
    pub diff_hunk: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLAuthor {
    pub login: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveThreadData {
    pub resolve_review_thread: Option<ResolvedThreadPayload>,
}

#[derive(Debug, Deserialize)]
pub struct ResolvedThreadPayload {
    pub thread: ResolvedThread,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedThread {
    pub id: String,
    pub is_resolved: bool,
}

impl ReviewThreadNode {
    /// Whether the thread contains the comment with the given REST id.
    pub fn contains_comment(&self, database_id: u64) -> bool {
        self.comments
            .nodes
            .iter()
            .any(|c| c.database_id == Some(database_id))
    }
}

impl ThreadCommentNode {
    /// Converts to a `ReviewComment`, or `None` when the comment has no
    /// numeric id to act on.
    pub fn into_review_comment(self, is_resolved: bool) -> Option<ReviewComment> {
        let id = self.database_id?;
        let created_at = self.created_at.unwrap_or_default();

        Some(ReviewComment {
            id,
            body: self.body,
            path: self.path.filter(|p| !p.is_empty()),
            line: self.line,
            start_line: self.start_line,
            user: Author {
                login: self
                    .author
                    .map(|a| a.login)
                    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            },
            html_url: self.url,
            position: self.position,
            original_position: self.original_position,
            diff_hunk: self.diff_hunk.filter(|h| !h.is_empty()),
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
            is_resolved,
        })
    }
}

/// Finds the thread holding the comment with the given REST id.
pub fn thread_for_comment(
    threads: &[ReviewThreadNode],
    comment_id: u64,
) -> Result<&ReviewThreadNode, ApiError> {
    threads
        .iter()
        .find(|t| t.contains_comment(comment_id))
        .ok_or(ApiError::ThreadNotFound(comment_id))
}

/// Collects every page of review threads. `fetch_page` receives the cursor
/// to continue from, `None` for the first page.
pub async fn collect_review_threads<F, Fut>(
    mut fetch_page: F,
) -> Result<Vec<ReviewThreadNode>, ApiError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<ReviewThreadConnection, ApiError>>,
{
    let mut threads = Vec::new();
    let mut after = None;

    loop {
        let connection = fetch_page(after).await?;

        for thread in &connection.nodes {
            if thread.comments.page_info.has_next_page {
                tracing::warn!(
                    "review thread {} has more than {} comments; later ones are skipped",
                    thread.id,
                    thread.comments.nodes.len()
                );
            }
        }

        threads.extend(connection.nodes);
        tracing::debug!("fetched {} review threads", threads.len());

        match connection.page_info.next_cursor() {
            Some(cursor) => after = Some(cursor),
            None => break,
        }
    }

    Ok(threads)
}

/// Flattens threads into comments, preserving thread then comment order.
pub fn flatten_threads(threads: Vec<ReviewThreadNode>) -> Vec<ReviewComment> {
    threads
        .into_iter()
        .flat_map(|thread| {
            let is_resolved = thread.is_resolved;
            thread
                .comments
                .nodes
                .into_iter()
                .filter_map(move |comment| comment.into_review_comment(is_resolved))
        })
        .collect()
}
