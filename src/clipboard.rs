//! Clipboard publishing — hands the uploaded URL to the system clipboard.

use arboard::Clipboard;

#[derive(Debug, thiserror::Error)]
#[error("clipboard write failed: {0}")]
pub struct ClipboardError(String);

/// Port copying plain text to the system clipboard.
pub trait ClipboardPublisher {
    fn publish(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// `arboard`-backed publisher. The clipboard handle is opened per write;
/// holding it open keeps the selection owned on X11 and blocks other apps.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardPublisher for SystemClipboard {
    fn publish(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = Clipboard::new().map_err(|e| ClipboardError(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ClipboardError(e.to_string()))?;
        log::info!("[CLIPBOARD] Copied {} chars", text.len());
        Ok(())
    }
}
