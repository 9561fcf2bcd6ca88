//! System clipboard access through `arboard`. Headless sessions have no
//! clipboard; callers log the error and carry on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Backend(#[from] arboard::Error),
}

/// Current clipboard text.
pub fn get() -> Result<String, ClipboardError> {
    let mut clipboard = arboard::Clipboard::new()?;
    Ok(clipboard.get_text()?)
}

/// Replace the clipboard contents with `text`.
pub fn set(text: &str) -> Result<(), ClipboardError> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text.to_owned())?;
    Ok(())
}
