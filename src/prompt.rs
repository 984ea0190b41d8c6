use std::io::Write;

use crate::{
    comment::format_comment,
    types::{FilteredComment, PromptSection},
};

/// Line placed between consecutive comment sections.
pub const SECTION_SEPARATOR: &str = "\n=====\n";

/// Printed by [`display_prompt`] when there is nothing to show.
pub const NO_COMMENTS_NOTICE: &str = "No comments found with the specified mention.";

/// Pairs each comment with its rendered section.
pub fn prompt_sections<'a>(
    comments: &'a [FilteredComment],
    mention: &str,
) -> Vec<PromptSection<'a>> {
    comments
        .iter()
        .map(|comment| PromptSection {
            comment,
            content: format_comment(comment, mention),
        })
        .collect()
}

/// Joins the formatted comments with [`SECTION_SEPARATOR`]. An empty
/// selection produces an empty prompt.
pub fn build_prompt(comments: &[FilteredComment], mention: &str) -> String {
    prompt_sections(comments, mention)
        .into_iter()
        .map(|section| section.content)
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}

/// Writes the prompt verbatim, or [`NO_COMMENTS_NOTICE`] when it is blank.
pub fn display_prompt<W: Write>(prompt: &str, writer: &mut W) -> std::io::Result<()> {
    if prompt.trim().is_empty() {
        writeln!(writer, "{NO_COMMENTS_NOTICE}")
    } else {
        writeln!(writer, "{prompt}")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn comment(id: u64, body: &str, path: Option<&str>, line: Option<u64>) -> FilteredComment {
        let at = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        FilteredComment {
            id,
            body: body.to_string(),
            path: path.map(str::to_string),
            line,
            start_line: None,
            user: "testuser".to_string(),
            html_url: format!("https://github.com/test/repo/pull/1#discussion_r{id}"),
            position: None,
            original_position: None,
            diff_hunk: None,
            created_at: at,
            updated_at: at,
            is_resolved: false,
        }
    }

    fn displayed(prompt: &str) -> String {
        let mut output = Vec::new();
        display_prompt(prompt, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_empty_selection_builds_empty_prompt() {
        assert_eq!(build_prompt(&[], "[ai]"), "");
    }

    #[test]
    fn test_single_comment_has_no_separator() {
        let comments = vec![comment(1, "[ai] Fix this", Some("src/a.rs"), Some(3))];
        assert_eq!(build_prompt(&comments, "[ai]"), "./src/a.rs:L3\nFix this");
    }

    #[test]
    fn test_sections_joined_with_separator() {
        let a = comment(1, "[ai] Fix this bug", None, None);
        let b = comment(2, "[ai] Add tests", Some("src/utils.ts"), Some(25));

        let prompt = build_prompt(&[a.clone(), b.clone()], "[ai]");

        assert_eq!(
            prompt,
            format!(
                "{}\n=====\n{}",
                format_comment(&a, "[ai]"),
                format_comment(&b, "[ai]")
            )
        );
        assert_eq!(prompt, "Fix this bug\n=====\n./src/utils.ts:L25\nAdd tests");
        assert!(!prompt.ends_with(SECTION_SEPARATOR));
    }

    #[test]
    fn test_sections_keep_their_comment() {
        let comments = vec![comment(7, "[ai] x", None, None), comment(9, "[ai] y", None, None)];
        let sections = prompt_sections(&comments, "[ai]");

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].comment.id, 7);
        assert_eq!(sections[1].content, "y");
    }

    #[test]
    fn test_display_blank_prompt_prints_notice() {
        assert_eq!(displayed(""), format!("{NO_COMMENTS_NOTICE}\n"));
        assert_eq!(displayed("   \n  "), format!("{NO_COMMENTS_NOTICE}\n"));
    }

    #[test]
    fn test_display_prints_prompt_verbatim() {
        assert_eq!(displayed("x"), "x\n");
        assert_eq!(displayed("  x \n"), "  x \n\n");
    }
}
