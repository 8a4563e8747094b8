use tracing::{debug, info, warn};

use crate::{
    ChromeSnapshot, Desktop, Error, MenuHandle, Placement, Rect, Result, ShowState, Size, StyleBits,
    WindowHandle, chrome, geometry,
    monitor::{self, FallbackPolicy},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    WindowSize(Size),
    ClientSize(Size),
    Maximize,
    Minimize,
    Fullscreen,
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WindowSize(size) => write!(f, "window-size {size}"),
            Self::ClientSize(size) => write!(f, "client-size {size}"),
            Self::Maximize => write!(f, "maximize"),
            Self::Minimize => write!(f, "minimize"),
            Self::Fullscreen => write!(f, "fullscreen"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionOptions {
    /// Keep the window centred on where it was. Otherwise only the size changes.
    pub center: bool,
    pub activate: bool,
    pub monitor_fallback: FallbackPolicy,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            center: true,
            activate: true,
            monitor_fallback: FallbackPolicy::Nearest,
        }
    }
}

/// What has to be put back to invert the last transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionRecord {
    Sized(Rect),
    Fullscreened { rect: Rect, chrome: ChromeSnapshot },
}

/// One target window plus its single-level undo slot.
///
/// Not meant to be shared: callers serialize transitions on a session.
pub struct WindowSession<D: Desktop> {
    pub(crate) desktop: D,
    pub(crate) handle: WindowHandle,
    pub(crate) record: Option<TransitionRecord>,
}

impl<D: Desktop> WindowSession<D> {
    pub fn new(desktop: D, handle: WindowHandle) -> Self {
        Self {
            desktop,
            handle,
            record: None,
        }
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    pub fn desktop(&self) -> &D {
        &self.desktop
    }

    /// Points the session at a new handle for the same window owner, keeping the undo slot.
    pub fn retarget(&mut self, handle: WindowHandle) {
        self.handle = handle;
    }

    pub fn record(&self) -> Option<&TransitionRecord> {
        self.record.as_ref()
    }

    pub fn undo_available(&self) -> bool {
        self.record.is_some()
    }

    pub fn metrics(&self) -> Result<geometry::WindowMetrics> {
        geometry::metrics(&self.desktop, self.handle)
    }

    pub fn apply(&mut self, transition: Transition, options: &TransitionOptions) -> Result<()> {
        let handle = self.handle;
        match transition {
            Transition::WindowSize(size) | Transition::ClientSize(size) if !size.is_positive() => {
                return Err(Error::InvalidSize(size));
            }
            _ => {}
        }
        geometry::ensure_alive(&self.desktop, handle)?;

        if let Some(TransitionRecord::Fullscreened { rect, chrome: snapshot }) = self.record {
            debug!(%handle, "Leaving fullscreen before {transition}");
            self.revert_fullscreen(rect, snapshot)?;
            self.record = None;
        }

        let before = geometry::window_rect(&self.desktop, handle)?;

        let record = match transition {
            Transition::WindowSize(size) => {
                self.resize(size, false, options)?;
                Some(TransitionRecord::Sized(before))
            }
            Transition::ClientSize(size) => {
                self.resize(size, true, options)?;
                Some(TransitionRecord::Sized(before))
            }
            Transition::Maximize => {
                self.show(ShowState::Maximize)?;
                None
            }
            Transition::Minimize => {
                self.show(ShowState::Minimize)?;
                None
            }
            Transition::Fullscreen => {
                let chrome = self.enter_fullscreen(options.monitor_fallback)?;
                Some(TransitionRecord::Fullscreened {
                    rect: before,
                    chrome,
                })
            }
        };

        self.record = record;

        if options.activate {
            self.activate();
        }

        let after = self.desktop.window_rect(handle).ok();
        info!(
            target: "journal",
            %handle,
            mode = %transition,
            %before,
            after = %after.map(|r| r.to_string()).unwrap_or_default(),
            "Applied transition"
        );

        Ok(())
    }

    /// Restores then sizes the window in one `SetWindowPos`. With `client` set, `size` is the
    /// wanted client area and the current border delta is added on top.
    fn resize(&self, size: Size, client: bool, options: &TransitionOptions) -> Result<()> {
        self.show(ShowState::Restore)?;

        let current = geometry::window_rect(&self.desktop, self.handle)?;
        let outer = if client {
            size.checked_add(geometry::border_delta(&self.desktop, self.handle)?)
                .ok_or(Error::InvalidSize(size))?
        } else {
            size
        };
        let rect = current
            .centered_origin(outer)
            .and_then(|origin| Rect::checked_from_origin_size(origin, outer))
            .ok_or(Error::InvalidSize(size))?;

        let placement = Placement {
            rect,
            keep_position: !options.center,
            activate: options.activate,
        };

        self.desktop.set_window_pos(self.handle, placement)
    }

    fn enter_fullscreen(&self, fallback: FallbackPolicy) -> Result<ChromeSnapshot> {
        let desktop = &self.desktop;
        let handle = self.handle;

        self.show(ShowState::Restore)?;

        let menu = chrome::set_menu(desktop, handle, None)?;
        let guard = MenuGuard {
            desktop,
            handle,
            menu,
            armed: true,
        };

        let monitor = monitor::monitor_from_window(desktop, handle, fallback)?;
        let screen = monitor::bounds(desktop, monitor)?;
        let style = chrome::set_style(desktop, handle, StyleBits::FULLSCREEN)?;
        desktop.move_window(handle, screen)?;

        guard.defuse();

        Ok(ChromeSnapshot { style, menu })
    }

    /// Style first so the move recomputes the frame, then geometry, then the menu.
    pub(crate) fn revert_fullscreen(&self, rect: Rect, snapshot: ChromeSnapshot) -> Result<()> {
        chrome::set_style(&self.desktop, self.handle, snapshot.style)?;
        geometry::ensure_alive(&self.desktop, self.handle)?;
        self.desktop.move_window(self.handle, rect)?;
        chrome::set_menu(&self.desktop, self.handle, snapshot.menu)?;
        Ok(())
    }

    pub(crate) fn show(&self, state: ShowState) -> Result<()> {
        geometry::ensure_alive(&self.desktop, self.handle)?;
        self.desktop.show_window(self.handle, state)
    }

    pub(crate) fn activate(&self) {
        if !self.desktop.set_foreground(self.handle) {
            debug!(handle = %self.handle, "Foreground request was refused");
        }
    }
}

/// Re-attaches a detached menu unless the fullscreen sequence made it to the end.
struct MenuGuard<'a, D: Desktop> {
    desktop: &'a D,
    handle: WindowHandle,
    menu: Option<MenuHandle>,
    armed: bool,
}

impl<D: Desktop> MenuGuard<'_, D> {
    fn defuse(mut self) {
        self.armed = false;
    }
}

impl<D: Desktop> Drop for MenuGuard<'_, D> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        if let Err(e) = self.desktop.set_menu(self.handle, self.menu) {
            warn!(handle = %self.handle, "Failed to re-attach menu: {e}");
        }
    }
}
