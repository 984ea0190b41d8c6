use crate::types::{FilteredComment, ReviewComment};

/// Marker used when no `--mention` is given.
pub const DEFAULT_MENTION: &str = "[ai]";

/// Keeps the comments whose body contains `mention` verbatim, in their
/// original order.
pub fn filter_by_mention(comments: &[ReviewComment], mention: &str) -> Vec<FilteredComment> {
    comments
        .iter()
        .filter(|comment| comment.body.contains(mention))
        .map(FilteredComment::from)
        .collect()
}

/// Strips every occurrence of `mention` and any surrounding blank lines.
pub fn clean_body(body: &str, mention: &str) -> String {
    let stripped = if mention.is_empty() {
        body.to_string()
    } else {
        body.replace(mention, "")
    };

    // Whitespace trimming also drops leading and trailing blank lines.
    stripped.trim().to_string()
}

/// `L<n>` or `L<start>-L<end>`, or `None` when the comment has no line.
pub fn line_spec(comment: &FilteredComment) -> Option<String> {
    match (comment.start_line, comment.line) {
        (Some(start), Some(end)) if start != end => Some(format!("L{start}-L{end}")),
        (_, Some(line)) | (Some(line), None) => Some(format!("L{line}")),
        (None, None) => None,
    }
}

/// Renders one comment as a prompt section:
///
/// ```text
/// ./<path>:<line spec>
/// <cleaned body>
/// ```
///
/// Comments without a path or line are rendered as the cleaned body alone.
pub fn format_comment(comment: &FilteredComment, mention: &str) -> String {
    let body = clean_body(&comment.body, mention);

    match (comment.path.as_deref(), line_spec(comment)) {
        (Some(path), Some(lines)) => format!("./{path}:{lines}\n{body}"),
        _ => body,
    }
}
