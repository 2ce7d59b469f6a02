//! X11 implementation of the `Desktop` interface
//!
//! Enumeration walks `_NET_CLIENT_LIST`, titles come from `_NET_WM_NAME`
//! with a `WM_NAME` fallback, process names from `_NET_WM_PID` plus
//! `/proc/<pid>/exe`, and border writes set the window's `border_pixel`.
//! All non-predefined atoms are interned once at startup.

use anyhow::{Context, Result};
use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::color::Colorref;
use crate::desktop::{Desktop, DesktopError, WindowId, WindowInfo};

/// Pre-cached X11 atoms to avoid repeated roundtrips
struct CachedAtoms {
    net_client_list: Atom,
    net_active_window: Atom,
    net_wm_name: Atom,
    utf8_string: Atom,
    net_wm_pid: Atom,
    net_wm_window_type: Atom,
    net_wm_window_type_normal: Atom,
}

impl CachedAtoms {
    fn new(conn: &RustConnection) -> Result<Self> {
        let intern = |name: &[u8]| -> Result<Atom> {
            Ok(conn
                .intern_atom(false, name)
                .context(format!(
                    "failed to intern atom {}",
                    String::from_utf8_lossy(name)
                ))?
                .reply()
                .context(format!(
                    "failed to get reply for atom {}",
                    String::from_utf8_lossy(name)
                ))?
                .atom)
        };
        Ok(Self {
            net_client_list: intern(b"_NET_CLIENT_LIST")?,
            net_active_window: intern(b"_NET_ACTIVE_WINDOW")?,
            net_wm_name: intern(b"_NET_WM_NAME")?,
            utf8_string: intern(b"UTF8_STRING")?,
            net_wm_pid: intern(b"_NET_WM_PID")?,
            net_wm_window_type: intern(b"_NET_WM_WINDOW_TYPE")?,
            net_wm_window_type_normal: intern(b"_NET_WM_WINDOW_TYPE_NORMAL")?,
        })
    }
}

/// Live X11 connection plus everything needed to answer the four native
/// primitives.
pub struct X11Desktop {
    conn: RustConnection,
    root: Window,
    atoms: CachedAtoms,
}

impl X11Desktop {
    /// Connect to the display and pre-intern atoms.
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("failed to connect to X server")?;
        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        info!(
            screen = screen_num,
            width = screen.width_in_pixels,
            height = screen.height_in_pixels,
            "connected to X11"
        );
        let atoms = CachedAtoms::new(&conn)?;
        Ok(Self { conn, root, atoms })
    }

    fn get_property(
        &self,
        window: Window,
        property: Atom,
        type_: impl Into<Atom>,
    ) -> Result<GetPropertyReply, DesktopError> {
        self.conn
            .get_property(false, window, property, type_, 0, u32::MAX)
            .map_err(|e| DesktopError::Connection(e.to_string()))?
            .reply()
            .map_err(|e| DesktopError::Property(format!("window {window}: {e}")))
    }

    fn window_title(&self, window: Window) -> Result<String, DesktopError> {
        let prop = self.get_property(window, self.atoms.net_wm_name, self.atoms.utf8_string)?;
        if !prop.value.is_empty() {
            return Ok(String::from_utf8_lossy(&prop.value).into_owned());
        }
        let prop = self.get_property(window, AtomEnum::WM_NAME.into(), AtomEnum::STRING)?;
        Ok(String::from_utf8_lossy(&prop.value).into_owned())
    }

    fn window_class(&self, window: Window) -> Result<String, DesktopError> {
        // WM_CLASS is "instance\0class\0"; the class half identifies the app
        let prop = self.get_property(window, AtomEnum::WM_CLASS.into(), AtomEnum::STRING)?;
        let mut parts = prop.value.split(|&b| b == 0).filter(|s| !s.is_empty());
        let instance = parts.next();
        let class = parts.next().or(instance).unwrap_or(b"");
        Ok(String::from_utf8_lossy(class).into_owned())
    }

    fn window_pid(&self, window: Window) -> Result<u32, DesktopError> {
        let prop = self.get_property(window, self.atoms.net_wm_pid, AtomEnum::CARDINAL)?;
        Ok(prop.value32().and_then(|mut v| v.next()).unwrap_or(0))
    }

    /// A window qualifies when it is viewable, carries a non-empty title,
    /// and is not an auxiliary surface (dock, toolbar, splash, ...).
    fn window_info(&self, window: Window) -> Result<Option<WindowInfo>, DesktopError> {
        let attrs = self
            .conn
            .get_window_attributes(window)
            .map_err(|e| DesktopError::Connection(e.to_string()))?
            .reply()
            .map_err(|e| DesktopError::Property(format!("window {window}: {e}")))?;
        if attrs.map_state != MapState::VIEWABLE {
            return Ok(None);
        }

        let type_prop =
            self.get_property(window, self.atoms.net_wm_window_type, AtomEnum::ATOM)?;
        if let Some(type_atom) = type_prop.value32().and_then(|mut v| v.next()) {
            if type_atom != self.atoms.net_wm_window_type_normal {
                return Ok(None);
            }
        }

        let title = self.window_title(window)?;
        if title.trim().is_empty() {
            return Ok(None);
        }
        let class_name = self.window_class(window)?;
        let pid = self.window_pid(window)?;
        Ok(Some(WindowInfo {
            id: window,
            title,
            class_name,
            pid,
        }))
    }
}

impl Desktop for X11Desktop {
    fn list_windows(&mut self) -> Result<Vec<WindowInfo>, DesktopError> {
        let prop = self.get_property(self.root, self.atoms.net_client_list, AtomEnum::WINDOW)?;
        let windows: Vec<Window> = prop
            .value32()
            .ok_or_else(|| {
                DesktopError::Property("_NET_CLIENT_LIST is not a window list".to_string())
            })?
            .collect();

        let mut out = Vec::with_capacity(windows.len());
        for window in windows {
            match self.window_info(window) {
                Ok(Some(info)) => out.push(info),
                Ok(None) => {}
                // Windows close mid-enumeration all the time
                Err(e) => debug!(window, error = %e, "skipping window during enumeration"),
            }
        }
        Ok(out)
    }

    fn foreground_window(&mut self) -> Result<Option<WindowId>, DesktopError> {
        let prop = self.get_property(self.root, self.atoms.net_active_window, AtomEnum::WINDOW)?;
        Ok(prop
            .value32()
            .and_then(|mut v| v.next())
            .filter(|&w| w != 0))
    }

    fn process_name(&mut self, pid: u32) -> Result<String, DesktopError> {
        if pid == 0 {
            return Err(DesktopError::Process {
                pid,
                reason: "window has no _NET_WM_PID".to_string(),
            });
        }
        if let Ok(exe) = std::fs::read_link(format!("/proc/{pid}/exe")) {
            if let Some(name) = exe.file_name() {
                return Ok(name.to_string_lossy().into_owned());
            }
        }
        // Permission failures and kernel threads: fall back to comm
        std::fs::read_to_string(format!("/proc/{pid}/comm"))
            .map(|s| s.trim().to_string())
            .map_err(|e| DesktopError::Process {
                pid,
                reason: e.to_string(),
            })
    }

    fn set_border_color(&mut self, window: WindowId, color: Colorref) -> Result<(), DesktopError> {
        let pixel = color.to_x11_pixel();
        self.conn
            .change_window_attributes(
                window,
                &ChangeWindowAttributesAux::new().border_pixel(pixel),
            )
            .map_err(|_| DesktopError::Write(window))?;
        self.conn
            .flush()
            .map_err(|e| DesktopError::Connection(e.to_string()))?;
        Ok(())
    }
}
