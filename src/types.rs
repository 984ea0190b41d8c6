use chrono::{DateTime, Utc};
use serde::Serialize;

/// Login recorded when GitHub returns no author (deleted accounts, ghosts).
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Identifies a single pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrInfo {
    pub owner: String,
    pub repo: String,
    pub pull_number: u64,
}

impl PrInfo {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, pull_number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            pull_number,
        }
    }
}

impl std::fmt::Display for PrInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.pull_number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub login: String,
}

/// A pull request review comment as returned by the API client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewComment {
    pub id: u64,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u64>,
    pub user: Author,
    pub html_url: String,
    // Position 0 is a valid diff offset, so these serialize as explicit null.
    pub position: Option<u64>,
    pub original_position: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_hunk: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_resolved: bool,
}

/// A review comment that matched the mention filter, with the author
/// flattened to a plain login.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredComment {
    pub id: u64,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u64>,
    pub user: String,
    pub html_url: String,
    pub position: Option<u64>,
    pub original_position: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_hunk: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_resolved: bool,
}

impl From<&ReviewComment> for FilteredComment {
    fn from(comment: &ReviewComment) -> Self {
        Self {
            id: comment.id,
            body: comment.body.clone(),
            path: comment.path.clone(),
            line: comment.line,
            start_line: comment.start_line,
            user: comment.user.login.clone(),
            html_url: comment.html_url.clone(),
            position: comment.position,
            original_position: comment.original_position,
            diff_hunk: comment.diff_hunk.clone(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            is_resolved: comment.is_resolved,
        }
    }
}

/// A filtered comment paired with its rendered prompt text.
#[derive(Debug, Clone)]
pub struct PromptSection<'a> {
    pub comment: &'a FilteredComment,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn comment_without_location() -> ReviewComment {
        let at = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        ReviewComment {
            id: 2,
            body: "Another comment".to_string(),
            path: None,
            line: None,
            start_line: None,
            user: Author {
                login: UNKNOWN_AUTHOR.to_string(),
            },
            html_url: "https://github.com/test/repo/pull/1#discussion_r124".to_string(),
            position: None,
            original_position: None,
            diff_hunk: None,
            created_at: at,
            updated_at: at,
            is_resolved: true,
        }
    }

    #[test]
    fn test_absent_location_fields_are_omitted_but_positions_are_null() {
        let json = serde_json::to_value(comment_without_location()).unwrap();
        let object = json.as_object().unwrap();

        assert!(!object.contains_key("path"));
        assert!(!object.contains_key("line"));
        assert!(!object.contains_key("startLine"));
        assert!(!object.contains_key("diffHunk"));
        assert_eq!(object["position"], serde_json::Value::Null);
        assert_eq!(object["originalPosition"], serde_json::Value::Null);
        assert_eq!(object["user"]["login"], "unknown");
    }

    #[test]
    fn test_filtered_comment_flattens_user() {
        let raw = comment_without_location();
        let filtered = FilteredComment::from(&raw);

        assert_eq!(filtered.user, "unknown");
        assert_eq!(filtered.id, raw.id);
        assert!(filtered.is_resolved);
        assert_eq!(serde_json::to_value(&filtered).unwrap()["user"], "unknown");
    }

    #[test]
    fn test_pr_info_display() {
        assert_eq!(PrInfo::new("owner", "repo", 7).to_string(), "owner/repo#7");
    }
}
