//! Foreground PID lookup through EWMH properties on the root window

use crate::{Error, Result};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{Atom, AtomEnum, ConnectionExt, Window};
use x11rb::rust_connection::RustConnection;

pub struct X11Foreground {
    conn: RustConnection,
    root: Window,
    active_window_atom: Atom,
    wm_pid_atom: Atom,
}

impl X11Foreground {
    /// Connect to the display named by `$DISPLAY`
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None)
            .map_err(|e| Error::Platform(format!("Failed to connect to X server: {}", e)))?;

        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| Error::Platform(format!("X screen {} not found", screen_num)))?;

        let active_window_atom = intern_atom(&conn, "_NET_ACTIVE_WINDOW")?;
        let wm_pid_atom = intern_atom(&conn, "_NET_WM_PID")?;

        Ok(Self {
            conn,
            root,
            active_window_atom,
            wm_pid_atom,
        })
    }

    /// PID owning the active window, if the window manager publishes one
    pub fn active_pid(&self) -> Option<u32> {
        let window = self.active_window()?;
        if window == x11rb::NONE {
            return None;
        }

        let reply = self
            .conn
            .get_property(false, window, self.wm_pid_atom, AtomEnum::CARDINAL, 0, 1)
            .ok()?
            .reply()
            .ok()?;

        let pid = reply.value32()?.next()?;
        (pid > 0).then_some(pid)
    }

    fn active_window(&self) -> Option<Window> {
        let reply = self
            .conn
            .get_property(
                false,
                self.root,
                self.active_window_atom,
                AtomEnum::WINDOW,
                0,
                1,
            )
            .ok()?
            .reply()
            .ok()?;

        // Bound so the borrowing iterator drops before `reply`
        #[allow(clippy::let_and_return)]
        let window = reply.value32()?.next();
        window
    }
}

fn intern_atom(conn: &RustConnection, name: &str) -> Result<Atom> {
    let reply = conn
        .intern_atom(false, name.as_bytes())
        .map_err(|e| Error::Platform(format!("Failed to intern {}: {}", name, e)))?
        .reply()
        .map_err(|e| Error::Platform(format!("Failed to intern {}: {}", name, e)))?;

    Ok(reply.atom)
}
