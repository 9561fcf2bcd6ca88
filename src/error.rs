//! Error types shared across the desktop.

use thiserror::Error;

use crate::window::WindowHandle;

/// Failures reported by the window manager.
///
/// None of these are fatal: the desktop logs them and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WmError {
    #[error("window {0} does not exist")]
    InvalidHandle(WindowHandle),
    #[error("no applet registered under {0:?}")]
    UnknownApp(String),
    #[error("no drag gesture is active for window {0}")]
    NoActiveDrag(WindowHandle),
}

/// Rejections from the in-memory file store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unknown folder {0:?}")]
    UnknownFolder(String),
    #[error("file name must not be empty")]
    EmptyFilename,
    #[error("invalid path {0:?}")]
    InvalidPath(String),
}

/// Errors raised inside an applet. They never cross the window manager
/// boundary; the manager logs them and shows them in the shared dialog.
#[derive(Debug, Error)]
pub enum AppletError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Init(String),
}
