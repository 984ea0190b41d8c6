//! Reviewprompt: turns GitHub pull request review comments into AI prompts.
//!
//! Fetches the review comments on a pull request, keeps those carrying a
//! mention marker such as `[ai]`, optionally lets the user pick a subset,
//! and renders them as a single path/line-annotated prompt. The selected
//! comments can then be resolved or deleted.

pub mod auth;
pub mod cli;
pub mod clipboard;
pub mod comment;
pub mod commands;
pub mod error;
pub mod github;
pub mod graphql;
pub mod prompt;
pub mod selector;
pub mod types;

pub use auth::resolve_token;
pub use cli::{BatchOptions, Command, FollowUp, PromptOptions, parse_args};
pub use clipboard::{Clipboard, SystemClipboard};
pub use comment::{DEFAULT_MENTION, clean_body, filter_by_mention, format_comment};
pub use commands::Dispatcher;
pub use error::{ApiError, Operation};
pub use github::{GitHub, ReviewApi, parse_pr_url};
pub use prompt::{NO_COMMENTS_NOTICE, SECTION_SEPARATOR, build_prompt, display_prompt};
pub use selector::{Picker, TerminalPicker};
pub use types::{Author, FilteredComment, PrInfo, PromptSection, ReviewComment};
