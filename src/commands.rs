use std::io::Write;

use anyhow::Result;

use crate::{
    cli::{BatchOptions, Command, FollowUp, PromptOptions},
    clipboard::Clipboard,
    comment::filter_by_mention,
    github::{ReviewApi, parse_pr_url},
    prompt::{build_prompt, display_prompt},
    selector::Picker,
    types::{FilteredComment, PrInfo},
};

/// A per-comment mutation applied after selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchAction {
    Resolve,
    Delete,
}

impl BatchAction {
    fn progress_verb(&self) -> &'static str {
        match self {
            BatchAction::Resolve => "Resolving",
            BatchAction::Delete => "Deleting",
        }
    }

    fn past_tense(&self) -> &'static str {
        match self {
            BatchAction::Resolve => "Resolved",
            BatchAction::Delete => "Deleted",
        }
    }

    fn purpose(&self) -> &'static str {
        match self {
            BatchAction::Resolve => "resolve",
            BatchAction::Delete => "delete",
        }
    }
}

impl From<FollowUp> for BatchAction {
    fn from(follow_up: FollowUp) -> Self {
        match follow_up {
            FollowUp::Resolve => BatchAction::Resolve,
            FollowUp::Delete => BatchAction::Delete,
        }
    }
}

/// Runs parsed commands against the API, selector and clipboard.
///
/// Results and notices go to `out`; per-comment progress goes to `progress`.
pub struct Dispatcher<'a, A, P, C> {
    api: &'a A,
    picker: &'a P,
    clipboard: &'a C,
}

impl<'a, A, P, C> Dispatcher<'a, A, P, C>
where
    A: ReviewApi + Sync,
    P: Picker + Sync,
    C: Clipboard + Sync,
{
    pub fn new(api: &'a A, picker: &'a P, clipboard: &'a C) -> Self {
        Self {
            api,
            picker,
            clipboard,
        }
    }

    pub async fn run<W, E>(&self, command: &Command, out: &mut W, progress: &mut E) -> Result<()>
    where
        W: Write,
        E: Write,
    {
        match command {
            Command::Prompt(opts) => self.run_prompt(opts, out, progress).await,
            Command::Resolve(opts) => {
                self.run_batch(BatchAction::Resolve, opts, out, progress)
                    .await
            }
            Command::Delete(opts) => {
                self.run_batch(BatchAction::Delete, opts, out, progress)
                    .await
            }
        }
    }

    /// Fetches, filters and optionally lets the user choose comments.
    /// Returns `None` after printing a notice when there is nothing to act
    /// on.
    async fn select_comments<W: Write>(
        &self,
        pr: &PrInfo,
        mention: &str,
        interactive: bool,
        purpose: &str,
        out: &mut W,
    ) -> Result<Option<Vec<FilteredComment>>> {
        let comments = self.api.review_comments(pr).await?;
        let filtered = filter_by_mention(&comments, mention);
        tracing::debug!(
            "{} of {} comments on {pr} mention {mention:?}",
            filtered.len(),
            comments.len()
        );

        if filtered.is_empty() {
            writeln!(out, "No comments found with mention \"{mention}\"")?;
            return Ok(None);
        }

        if !interactive {
            return Ok(Some(filtered));
        }

        let title = format!("Select comments with \"{mention}\" to {purpose}:");
        let selected = self.picker.pick(&filtered, &title, mention).await?;

        if selected.is_empty() {
            writeln!(out, "No comments selected.")?;
            return Ok(None);
        }

        Ok(Some(selected))
    }

    async fn run_prompt<W: Write, E: Write>(
        &self,
        opts: &PromptOptions,
        out: &mut W,
        progress: &mut E,
    ) -> Result<()> {
        let pr = parse_pr_url(&opts.pr_url)?;

        let Some(selected) = self
            .select_comments(
                &pr,
                &opts.mention,
                opts.interactive,
                "include in prompt",
                out,
            )
            .await?
        else {
            return Ok(());
        };

        let prompt = build_prompt(&selected, &opts.mention);

        if opts.clipboard {
            self.clipboard.copy(&prompt)?;
            writeln!(out, "Copied {} comment(s) to clipboard.", selected.len())?;
        } else {
            display_prompt(&prompt, out)?;
        }

        if let Some(follow_up) = opts.follow_up {
            self.apply(follow_up.into(), &pr, &selected, out, progress)
                .await?;
        }

        Ok(())
    }

    async fn run_batch<W: Write, E: Write>(
        &self,
        action: BatchAction,
        opts: &BatchOptions,
        out: &mut W,
        progress: &mut E,
    ) -> Result<()> {
        let pr = parse_pr_url(&opts.pr_url)?;

        let Some(selected) = self
            .select_comments(&pr, &opts.mention, !opts.all, action.purpose(), out)
            .await?
        else {
            return Ok(());
        };

        self.apply(action, &pr, &selected, out, progress).await
    }

    /// Applies `action` to each comment in order, stopping at the first
    /// failure.
    async fn apply<W: Write, E: Write>(
        &self,
        action: BatchAction,
        pr: &PrInfo,
        comments: &[FilteredComment],
        out: &mut W,
        progress: &mut E,
    ) -> Result<()> {
        let total = comments.len();

        for (i, comment) in comments.iter().enumerate() {
            writeln!(
                progress,
                "{} comment {} ({}/{total})...",
                action.progress_verb(),
                comment.id,
                i + 1
            )?;
            tracing::info!("{} comment {} on {pr}", action.progress_verb(), comment.id);

            match action {
                BatchAction::Resolve => self.api.resolve_comment(pr, comment.id).await?,
                BatchAction::Delete => self.api.delete_comment(pr, comment.id).await?,
            }
        }

        writeln!(out, "{} {total} comment(s).", action.past_tense())?;
        Ok(())
    }
}
