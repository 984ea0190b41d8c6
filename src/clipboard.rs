use anyhow::{Context, Result};

/// Destination for a finished prompt.
pub trait Clipboard {
    fn copy(&self, text: &str) -> Result<()>;
}

/// The native system clipboard.
///
/// On X11 and Wayland the contents outlive the process only when a
/// clipboard manager is running.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text))
            .context("Failed to copy to clipboard")?;

        tracing::debug!("copied {} bytes to clipboard", text.len());
        Ok(())
    }
}
