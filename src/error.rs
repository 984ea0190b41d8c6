use thiserror::Error;

const MISSING_CREDENTIALS: &str = "GitHub authentication required. Please set GITHUB_TOKEN environment variable or authenticate with GitHub CLI (gh auth login).";

const AUTH_FAILED: &str = "GitHub authentication failed. Please ensure you have a valid token:
1. Set GITHUB_TOKEN environment variable with a personal access token
2. Or authenticate with GitHub CLI: gh auth login

For GitHub.com, create a token at: https://github.com/settings/tokens
For GitHub Enterprise, contact your administrator for token generation.";

const FORBIDDEN: &str = "GitHub API rate limit exceeded or insufficient permissions.
Please check your token permissions or wait before retrying.";

/// The API operations whose failures are reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateClient,
    FetchComments,
    ResolveComment,
    DeleteComment,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateClient => "create GitHub client",
            Operation::FetchComments => "fetch PR comments",
            Operation::ResolveComment => "resolve comment",
            Operation::DeleteComment => "delete comment",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("{}", MISSING_CREDENTIALS)]
    MissingCredentials,

    #[error("Invalid GitHub PR URL format")]
    InvalidPrUrl,

    #[error("{}", AUTH_FAILED)]
    Unauthorized,

    #[error("{}", FORBIDDEN)]
    Forbidden,

    #[error("Could not find review thread for comment {0}")]
    ThreadNotFound(u64),

    #[error("Failed to {operation}{}", detail(.message))]
    Request {
        operation: Operation,
        message: Option<String>,
    },
}

/// GraphQL error types that mean the token may not perform the call.
const FORBIDDEN_ERROR_TYPES: &[&str] = &["FORBIDDEN", "RATE_LIMITED", "INSUFFICIENT_SCOPES"];

impl ApiError {
    pub fn request(operation: Operation, message: Option<String>) -> Self {
        ApiError::Request {
            operation,
            message: message.filter(|m| !m.is_empty()),
        }
    }

    /// Reclassifies a failed call. Authentication and permission failures
    /// get remediation text; everything else is reported against the
    /// operation that failed.
    ///
    /// The HTTP status decides when there is one. The message is only
    /// inspected for transport failures that carry no status.
    pub fn from_failure(
        operation: Operation,
        status: Option<u16>,
        message: Option<String>,
    ) -> Self {
        match status {
            Some(401) => ApiError::Unauthorized,
            Some(403) => ApiError::Forbidden,
            Some(_) => Self::request(operation, message),
            None => {
                let text = message.as_deref().unwrap_or_default();
                if text.contains("Bad credentials") || text.contains("401") {
                    ApiError::Unauthorized
                } else if text.contains("403") {
                    ApiError::Forbidden
                } else {
                    Self::request(operation, message)
                }
            }
        }
    }

    /// Reclassifies a GraphQL `errors` array by the entries' `type` codes.
    /// GraphQL messages echo query arguments such as the PR number, so they
    /// are reported but never matched.
    pub fn from_graphql<'a>(
        operation: Operation,
        error_types: impl IntoIterator<Item = &'a str>,
        message: Option<String>,
    ) -> Self {
        if error_types
            .into_iter()
            .any(|t| FORBIDDEN_ERROR_TYPES.contains(&t))
        {
            return ApiError::Forbidden;
        }

        Self::request(operation, message)
    }

    pub fn from_octocrab(operation: Operation, err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. } => Self::from_failure(
                operation,
                Some(source.status_code.as_u16()),
                Some(source.message.clone()),
            ),
            other => Self::from_failure(operation, None, Some(other.to_string())),
        }
    }
}
