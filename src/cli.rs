use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::comment::DEFAULT_MENTION;

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

/// What to do with the selected comments after the prompt is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    Resolve,
    Delete,
}

/// Options for building a prompt from a pull request's comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOptions {
    pub pr_url: String,
    pub mention: String,
    pub interactive: bool,
    pub clipboard: bool,
    pub follow_up: Option<FollowUp>,
}

/// Options shared by the `resolve` and `delete` subcommands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    pub pr_url: String,
    pub mention: String,
    pub all: bool,
}

/// A fully parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Prompt(PromptOptions),
    Resolve(BatchOptions),
    Delete(BatchOptions),
}

impl Command {
    pub fn pr_url(&self) -> &str {
        match self {
            Command::Prompt(opts) => &opts.pr_url,
            Command::Resolve(opts) | Command::Delete(opts) => &opts.pr_url,
        }
    }

    pub fn mention(&self) -> &str {
        match self {
            Command::Prompt(opts) => &opts.mention,
            Command::Resolve(opts) | Command::Delete(opts) => &opts.mention,
        }
    }
}

fn parse_mention(value: &str) -> Result<String, String> {
    if value.is_empty() {
        Err("mention must not be empty".to_string())
    } else {
        Ok(value.to_string())
    }
}

#[derive(Args, Debug, Clone)]
struct PromptArgs {
    /// GitHub PR URL
    #[arg(value_name = "PR_URL", required = true)]
    pub pr_url: Option<String>,

    /// Choose comments interactively
    #[arg(short, long)]
    pub interactive: bool,

    /// Resolve the selected comments after building the prompt
    #[arg(short, long)]
    pub resolve: bool,

    /// Delete the selected comments after building the prompt
    #[arg(short, long)]
    pub delete: bool,

    /// Marker that flags comments for the prompt
    #[arg(short, long, default_value = DEFAULT_MENTION, value_parser = parse_mention)]
    pub mention: String,

    /// Copy the prompt to the clipboard instead of printing it
    #[arg(short, long)]
    pub clipboard: bool,
}

#[derive(Args, Debug, Clone)]
struct BatchArgs {
    /// GitHub PR URL
    #[arg(value_name = "PR_URL")]
    pub pr_url: String,

    /// Act on every matching comment without prompting
    #[arg(short, long)]
    pub all: bool,

    /// Marker that flags comments to act on
    #[arg(short, long, default_value = DEFAULT_MENTION, value_parser = parse_mention)]
    pub mention: String,
}

#[derive(Subcommand, Debug, Clone)]
enum BatchCommand {
    /// Resolve the review threads of comments containing the mention
    Resolve(BatchArgs),

    /// Delete comments containing the mention
    Delete(BatchArgs),
}

#[derive(Parser, Debug)]
#[command(
    name = "reviewprompt",
    about = "Turn GitHub PR review comments into a prompt for an AI assistant"
)]
#[command(version, long_version = BUILD_INFO_HUMAN)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct CliArgs {
    #[command(subcommand)]
    pub command: Option<BatchCommand>,

    #[command(flatten)]
    pub prompt: PromptArgs,
}

impl From<BatchArgs> for BatchOptions {
    fn from(args: BatchArgs) -> Self {
        Self {
            pr_url: args.pr_url,
            mention: args.mention,
            all: args.all,
        }
    }
}

fn determine_follow_up(args: &PromptArgs) -> Option<FollowUp> {
    match (args.resolve, args.delete) {
        (true, _) => Some(FollowUp::Resolve),
        (_, true) => Some(FollowUp::Delete),
        _ => None,
    }
}

fn build_command(cli: CliArgs) -> Result<Command> {
    match cli.command {
        Some(BatchCommand::Resolve(args)) => Ok(Command::Resolve(args.into())),
        Some(BatchCommand::Delete(args)) => Ok(Command::Delete(args.into())),
        None => {
            let follow_up = determine_follow_up(&cli.prompt);
            let PromptArgs {
                pr_url,
                interactive,
                mention,
                clipboard,
                ..
            } = cli.prompt;

            let pr_url = pr_url.ok_or_else(|| anyhow::anyhow!("a PR URL is required"))?;

            Ok(Command::Prompt(PromptOptions {
                pr_url,
                mention,
                interactive,
                clipboard,
                follow_up,
            }))
        }
    }
}

/// Parses command-line arguments into a [`Command`].
///
/// Help, version and usage errors are returned as `clap::Error` inside the
/// `anyhow::Error` so the caller can print them with clap's formatting.
pub fn parse_args<I, T>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;
    build_command(cli)
}
