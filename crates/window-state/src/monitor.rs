use serde::Deserialize;

use crate::{Desktop, Error, MonitorHandle, Rect, Result, WindowHandle, geometry::ensure_alive};

// ERROR_INVALID_MONITOR_HANDLE
const NO_MONITOR: u32 = 1461;

/// What to do when a window doesn't intersect any monitor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    #[default]
    Nearest,
    Primary,
    None,
}

/// The monitor sharing the largest area with the window, or whatever `policy` picks when
/// there is none.
pub fn monitor_from_window<D: Desktop + ?Sized>(
    desktop: &D,
    handle: WindowHandle,
    policy: FallbackPolicy,
) -> Result<MonitorHandle> {
    ensure_alive(desktop, handle)?;

    desktop
        .monitor_from_window(handle, policy)
        .ok_or_else(|| Error::native("MonitorFromWindow", NO_MONITOR, "Window is off-screen"))
}

/// The monitor's full rectangle, taskbar included.
pub fn bounds<D: Desktop + ?Sized>(desktop: &D, monitor: MonitorHandle) -> Result<Rect> {
    Ok(desktop.monitor_info(monitor)?.bounds)
}

pub fn work_area<D: Desktop + ?Sized>(desktop: &D, monitor: MonitorHandle) -> Result<Rect> {
    Ok(desktop.monitor_info(monitor)?.work_area)
}
