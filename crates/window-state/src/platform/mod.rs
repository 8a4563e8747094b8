#[cfg(windows)]
mod win;
#[cfg(windows)]
pub use win::{Win32Desktop, enable_per_monitor_dpi_awareness};

#[cfg(any(test, feature = "test-utils"))]
pub mod fake;

use serde::Serialize;

use crate::{Rect, Result, StyleBits, Target, monitor::FallbackPolicy};

/// Raw OS window handle. Not owned by us and may die at any moment, so it's a plain value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    pub const NULL: Self = Self(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MonitorHandle(pub isize);

/// A non-null menu handle. A window without a menu is `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MenuHandle(pub isize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowState {
    Restore,
    Maximize,
    Minimize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonitorInfo {
    pub bounds: Rect,
    pub work_area: Rect,
    pub primary: bool,
}

/// Arguments to a single `SetWindowPos` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub rect: Rect,
    /// Only change the size and let the window manager keep the position.
    pub keep_position: bool,
    pub activate: bool,
}

/// The window-manager calls the engine is built on.
///
/// Implementations map each method onto exactly one native call and report its failure
/// verbatim. Handle validation, snapshots and ordering are the engine's business.
pub trait Desktop {
    fn is_window(&self, handle: WindowHandle) -> bool;

    fn window_rect(&self, handle: WindowHandle) -> Result<Rect>;

    /// Origin-relative client area.
    fn client_rect(&self, handle: WindowHandle) -> Result<Rect>;

    fn style(&self, handle: WindowHandle) -> Result<StyleBits>;

    /// Returns the previous style.
    fn set_style(&self, handle: WindowHandle, style: StyleBits) -> Result<StyleBits>;

    fn menu(&self, handle: WindowHandle) -> Option<MenuHandle>;

    fn set_menu(&self, handle: WindowHandle, menu: Option<MenuHandle>) -> Result<()>;

    fn monitor_from_window(
        &self,
        handle: WindowHandle,
        policy: FallbackPolicy,
    ) -> Option<MonitorHandle>;

    fn monitor_info(&self, monitor: MonitorHandle) -> Result<MonitorInfo>;

    fn set_window_pos(&self, handle: WindowHandle, placement: Placement) -> Result<()>;

    fn move_window(&self, handle: WindowHandle, rect: Rect) -> Result<()>;

    fn show_window(&self, handle: WindowHandle, state: ShowState) -> Result<()>;

    /// May be refused by the OS focus-stealing rules, hence no error.
    fn set_foreground(&self, handle: WindowHandle) -> bool;

    fn dpi_for_window(&self, handle: WindowHandle) -> Option<u32>;

    fn targets(&self) -> Result<Vec<Target>>;
}
