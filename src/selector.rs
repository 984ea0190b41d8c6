//! Interactive multi-select over filtered comments.
//!
//! [`Selector`] is a plain state machine driven by [`SelectorInput`]
//! events; [`TerminalPicker`] feeds it key presses from crossterm and
//! redraws an inline list on stderr after every transition.

use std::{
    io::{self, IsTerminal, Write},
    ops::Range,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::{Print, Stylize},
    terminal::{self, ClearType},
};

use crate::{comment::clean_body, types::FilteredComment};

const PREVIEW_CHARS: usize = 50;
const DONE_LABEL: &str = "Done";
const HINT: &str = "Use arrow keys to navigate, space to toggle selection, enter to submit";
/// Title, hint and the blank line under them.
const HEADER_LINES: usize = 3;

/// Chooses a subset of comments to act on.
#[async_trait]
pub trait Picker {
    /// Returns the chosen comments in their original order. An empty result
    /// means the user chose nothing.
    async fn pick(
        &self,
        comments: &[FilteredComment],
        title: &str,
        mention: &str,
    ) -> Result<Vec<FilteredComment>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorInput {
    Up,
    Down,
    Toggle,
    ToggleAll,
    Confirm,
    Cancel,
}

/// Cursor and toggle state over `len` items followed by a `Done` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    cursor: usize,
    selected: Vec<bool>,
}

impl Selector {
    pub fn new(len: usize) -> Self {
        Self {
            cursor: 0,
            selected: vec![false; len],
        }
    }

    /// Number of list entries, including `Done`.
    pub fn entries(&self) -> usize {
        self.selected.len() + 1
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn on_done(&self) -> bool {
        self.cursor == self.selected.len()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected
            .iter()
            .enumerate()
            .filter_map(|(i, &on)| on.then_some(i))
            .collect()
    }

    /// Applies one input. Returns the selected indices once the selection
    /// is submitted or cancelled; cancelling submits nothing.
    pub fn handle(&mut self, input: SelectorInput) -> Option<Vec<usize>> {
        match input {
            SelectorInput::Up => {
                self.cursor = self.cursor.checked_sub(1).unwrap_or(self.entries() - 1);
                None
            }
            SelectorInput::Down => {
                self.cursor = (self.cursor + 1) % self.entries();
                None
            }
            SelectorInput::Toggle if self.on_done() => Some(self.selected_indices()),
            SelectorInput::Toggle => {
                self.selected[self.cursor] = !self.selected[self.cursor];
                None
            }
            SelectorInput::ToggleAll => {
                let all = self.selected.iter().all(|&on| on);
                self.selected.iter_mut().for_each(|on| *on = !all);
                None
            }
            SelectorInput::Confirm => Some(self.selected_indices()),
            SelectorInput::Cancel => Some(Vec::new()),
        }
    }
}

pub fn input_for_key(key: KeyEvent) -> Option<SelectorInput> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d'))
            .then_some(SelectorInput::Cancel);
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(SelectorInput::Up),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => Some(SelectorInput::Down),
        KeyCode::Char(' ') => Some(SelectorInput::Toggle),
        KeyCode::Char('a') => Some(SelectorInput::ToggleAll),
        KeyCode::Enter => Some(SelectorInput::Confirm),
        KeyCode::Esc | KeyCode::Char('q') => Some(SelectorInput::Cancel),
        _ => None,
    }
}

/// One-line summary of a comment: `<path>[:L<line>] - <preview>`.
pub fn comment_label(comment: &FilteredComment, mention: &str) -> String {
    let path = comment.path.as_deref().unwrap_or("General");
    let line = comment
        .line
        .or(comment.start_line)
        .map(|l| format!(":L{l}"))
        .unwrap_or_default();

    let cleaned = clean_body(&comment.body, mention);
    let first_line = cleaned.lines().next().unwrap_or_default();
    let mut preview: String = first_line.chars().take(PREVIEW_CHARS).collect();
    if first_line.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }

    let resolved = if comment.is_resolved { " (resolved)" } else { "" };

    format!("{path}{line} - {preview}{resolved}")
}

fn clip(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

/// Entries that fit in `rows`, scrolled so the cursor stays visible.
pub fn visible_entries(selector: &Selector, rows: usize) -> Range<usize> {
    let rows = rows.max(1);
    let start = (selector.cursor() + 1).saturating_sub(rows);
    start..selector.entries().min(start.saturating_add(rows))
}

/// Lines of the list as currently displayed, each at most `width` chars.
/// At most `height - 1` lines are produced so redrawing never scrolls the
/// terminal.
pub fn render_lines(
    selector: &Selector,
    labels: &[String],
    title: &str,
    width: usize,
    height: usize,
) -> Vec<String> {
    let mut lines = vec![clip(title, width), clip(HINT, width), String::new()];
    let rows = height.saturating_sub(HEADER_LINES + 1);

    for index in visible_entries(selector, rows) {
        let pointer = if index == selector.cursor() { '❯' } else { ' ' };
        let entry = match labels.get(index) {
            Some(label) => {
                let mark = if selector.is_selected(index) { '◉' } else { '◯' };
                format!("{pointer} {mark} {label}")
            }
            None => format!("{pointer}   {DONE_LABEL}"),
        };
        lines.push(clip(&entry, width));
    }

    lines
}

/// Restores cooked mode when dropped, including on early return.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            tracing::warn!("failed to restore terminal mode: {err}");
        }
    }
}

fn draw<W: Write>(out: &mut W, lines: &[String], previous: usize) -> io::Result<()> {
    if previous > 0 {
        queue!(out, cursor::MoveToPreviousLine(previous as u16))?;
    } else {
        queue!(out, cursor::MoveToColumn(0))?;
    }
    queue!(out, terminal::Clear(ClearType::FromCursorDown))?;

    for (i, line) in lines.iter().enumerate() {
        match i {
            0 => queue!(out, Print(line.as_str().cyan().bold()))?,
            1 => queue!(out, Print(line.as_str().dark_grey()))?,
            _ => queue!(out, Print(line))?,
        }
        queue!(out, Print("\r\n"))?;
    }

    out.flush()
}

fn run_selector(labels: Vec<String>, title: String) -> Result<Vec<usize>> {
    let mut selector = Selector::new(labels.len());
    let mut stderr = io::stderr();
    let (width, height) = terminal_size::terminal_size_of(io::stderr())
        .map(|(w, h)| (w.0 as usize, h.0 as usize))
        .unwrap_or((usize::MAX, usize::MAX));

    let _raw = RawMode::enable().context("Failed to enable raw terminal mode")?;
    let mut drawn = 0;

    loop {
        let lines = render_lines(&selector, &labels, &title, width, height);
        draw(&mut stderr, &lines, drawn)?;
        drawn = lines.len();

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let Some(chosen) = input_for_key(key).and_then(|input| selector.handle(input)) {
            draw(&mut stderr, &[], drawn)?;
            return Ok(chosen);
        }
    }
}

/// Renders the selection list inline on stderr.
#[derive(Debug, Default)]
pub struct TerminalPicker;

#[async_trait]
impl Picker for TerminalPicker {
    async fn pick(
        &self,
        comments: &[FilteredComment],
        title: &str,
        mention: &str,
    ) -> Result<Vec<FilteredComment>> {
        if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
            anyhow::bail!("Interactive selection requires a terminal");
        }

        let labels = comments.iter().map(|c| comment_label(c, mention)).collect();
        let title = title.to_string();

        let chosen = tokio::task::spawn_blocking(move || run_selector(labels, title))
            .await
            .context("selector task panicked")??;

        tracing::debug!("selected {} of {} comments", chosen.len(), comments.len());

        Ok(chosen
            .into_iter()
            .filter_map(|i| comments.get(i).cloned())
            .collect())
    }
}
