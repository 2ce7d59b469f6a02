//! Interfaces to the native windowing system
//!
//! The update pass talks to the desktop exclusively through this trait so the
//! orchestrator can be exercised against a scripted implementation in tests.
//! Every method is fallible; the orchestrator treats failures as per-window
//! or per-pass skips, never as fatal.

use thiserror::Error;

use crate::color::Colorref;

/// Native window handle.
pub type WindowId = u32;

/// One visible, non-auxiliary top-level window as reported by enumeration.
#[derive(Debug, Clone)]
pub struct WindowInfo {
    pub id: WindowId,
    pub title: String,
    pub class_name: String,
    pub pid: u32,
}

/// Failures surfaced by the native windowing layer.
#[derive(Debug, Error)]
pub enum DesktopError {
    #[error("window system connection failed: {0}")]
    Connection(String),

    #[error("property query failed: {0}")]
    Property(String),

    #[error("process {pid} could not be inspected: {reason}")]
    Process { pid: u32, reason: String },

    #[error("border write to window {0} failed")]
    Write(WindowId),
}

/// The four native primitives the update pass needs.
pub trait Desktop {
    /// Enumerate the current visible, non-auxiliary top-level windows.
    /// Re-queried fresh each pass; implementations must not cache results.
    fn list_windows(&mut self) -> Result<Vec<WindowInfo>, DesktopError>;

    /// Handle of the currently focused window, if any.
    fn foreground_window(&mut self) -> Result<Option<WindowId>, DesktopError>;

    /// Resolve a pid to its executable name. May be slow; callers go through
    /// the process-name cache.
    fn process_name(&mut self, pid: u32) -> Result<String, DesktopError>;

    /// Set a window's border color. `color` is never a sentinel here; the
    /// differential writer filters those out.
    fn set_border_color(&mut self, window: WindowId, color: Colorref) -> Result<(), DesktopError>;
}
