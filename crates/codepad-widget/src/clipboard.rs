//! Clipboard access for the copy button.

use anyhow::{Context, Result};

/// Somewhere copied text can be written.
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// The OS clipboard, opened on first use.
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<arboard::Clipboard>,
}

impl std::fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemClipboard")
            .field("open", &self.clipboard.is_some())
            .finish()
    }
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let clipboard = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard,
            None => self
                .clipboard
                .insert(arboard::Clipboard::new().context("Failed to open clipboard")?),
        };
        clipboard
            .set_text(text.to_owned())
            .context("Failed to write to clipboard")
    }
}
