use std::{ffi::c_void, mem, path::Path};

use tracing::{debug, warn};
use windows::{
    Win32::{
        Foundation::{CloseHandle, GetLastError, HWND, LPARAM, RECT, SetLastError, TRUE, WIN32_ERROR},
        Graphics::Gdi::{
            GetMonitorInfoW, HMONITOR, MONITOR_DEFAULTTONEAREST, MONITOR_DEFAULTTONULL,
            MONITOR_DEFAULTTOPRIMARY, MONITORINFO, MonitorFromWindow,
        },
        System::{
            Diagnostics::Debug::{FORMAT_MESSAGE_FROM_SYSTEM, FORMAT_MESSAGE_IGNORE_INSERTS, FormatMessageW},
            RemoteDesktop::ProcessIdToSessionId,
            Threading::{
                GetCurrentProcessId, OpenProcess, PROCESS_NAME_FORMAT,
                PROCESS_QUERY_LIMITED_INFORMATION, QueryFullProcessImageNameW,
            },
        },
        UI::{
            HiDpi::{
                DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, GetDpiForWindow,
                SetProcessDpiAwarenessContext,
            },
            WindowsAndMessaging::{
                EnumWindows, GW_OWNER, GWL_EXSTYLE, GWL_STYLE, GetClientRect, GetMenu,
                GetWindow, GetWindowLongPtrW, GetWindowRect, GetWindowTextLengthW,
                GetWindowTextW, GetWindowThreadProcessId, HMENU, IsWindow, IsWindowVisible,
                MoveWindow, SET_WINDOW_POS_FLAGS, SW_RESTORE, SW_SHOWMAXIMIZED,
                SW_SHOWMINIMIZED, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOZORDER, SetForegroundWindow,
                SetMenu, SetWindowLongPtrW, SetWindowPos, ShowWindow, WS_EX_TOOLWINDOW,
            },
        },
    },
    core::{BOOL, PWSTR},
};

use super::{Desktop, MenuHandle, MonitorHandle, MonitorInfo, Placement, ShowState, WindowHandle};
use crate::{Error, ProcessIdentity, Rect, Result, StyleBits, Target, monitor::FallbackPolicy};

const MONITORINFOF_PRIMARY: u32 = 1;

/// The live Win32 window manager. Coordinates are physical pixels, so call
/// [`enable_per_monitor_dpi_awareness`] before using it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Win32Desktop;

/// Opts the process into per-monitor DPI awareness so rects aren't virtualised.
pub fn enable_per_monitor_dpi_awareness() {
    if let Err(e) = unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) } {
        // Already set by the manifest or a previous call.
        debug!("SetProcessDpiAwarenessContext: {e}");
    }
}

fn hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0 as *mut c_void)
}

fn rect_from_win(rect: RECT) -> Rect {
    Rect::new(rect.left, rect.top, rect.right, rect.bottom)
}

fn format_error_message(error_code: u32) -> String {
    let mut buffer = vec![0u16; 1024];
    match unsafe {
        FormatMessageW(
            FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS,
            None,
            error_code,
            0,
            PWSTR(buffer.as_mut_ptr()),
            buffer.len() as u32,
            None,
        )
    } {
        0 => format!("Unknown error: {}", error_code),
        len => String::from_utf16_lossy(&buffer[..len as usize])
            .trim()
            .to_string(),
    }
}

fn last_error(operation: &'static str) -> Error {
    let code = unsafe { GetLastError() }.0;
    Error::native(operation, code, format_error_message(code))
}

fn from_windows_error(operation: &'static str, error: windows::core::Error) -> Error {
    let hresult = error.code().0 as u32;
    // HRESULT_FROM_WIN32 wraps plain Win32 codes in facility 7.
    let code = if hresult & 0xFFFF_0000 == 0x8007_0000 {
        hresult & 0xFFFF
    } else {
        hresult
    };
    Error::native(operation, code, error.message())
}

impl Desktop for Win32Desktop {
    fn is_window(&self, handle: WindowHandle) -> bool {
        unsafe { IsWindow(Some(hwnd(handle))) }.as_bool()
    }

    fn window_rect(&self, handle: WindowHandle) -> Result<Rect> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(hwnd(handle), &mut rect) }
            .map_err(|e| from_windows_error("GetWindowRect", e))?;
        Ok(rect_from_win(rect))
    }

    fn client_rect(&self, handle: WindowHandle) -> Result<Rect> {
        let mut rect = RECT::default();
        unsafe { GetClientRect(hwnd(handle), &mut rect) }
            .map_err(|e| from_windows_error("GetClientRect", e))?;
        Ok(rect_from_win(rect))
    }

    fn style(&self, handle: WindowHandle) -> Result<StyleBits> {
        unsafe { SetLastError(WIN32_ERROR(0)) };
        let style = unsafe { GetWindowLongPtrW(hwnd(handle), GWL_STYLE) };
        if style == 0 && unsafe { GetLastError() }.0 != 0 {
            return Err(last_error("GetWindowLongPtrW"));
        }
        Ok(StyleBits(style))
    }

    fn set_style(&self, handle: WindowHandle, style: StyleBits) -> Result<StyleBits> {
        // A zero return is only a failure when the last error says so.
        unsafe { SetLastError(WIN32_ERROR(0)) };
        let previous = unsafe { SetWindowLongPtrW(hwnd(handle), GWL_STYLE, style.0) };
        if previous == 0 && unsafe { GetLastError() }.0 != 0 {
            return Err(last_error("SetWindowLongPtrW"));
        }
        Ok(StyleBits(previous))
    }

    fn menu(&self, handle: WindowHandle) -> Option<MenuHandle> {
        let menu = unsafe { GetMenu(hwnd(handle)) };
        (!menu.is_invalid()).then_some(MenuHandle(menu.0 as isize))
    }

    fn set_menu(&self, handle: WindowHandle, menu: Option<MenuHandle>) -> Result<()> {
        let menu = menu.map(|m| HMENU(m.0 as *mut c_void));
        unsafe { SetMenu(hwnd(handle), menu) }.map_err(|e| from_windows_error("SetMenu", e))
    }

    fn monitor_from_window(
        &self,
        handle: WindowHandle,
        policy: FallbackPolicy,
    ) -> Option<MonitorHandle> {
        let flags = match policy {
            FallbackPolicy::Nearest => MONITOR_DEFAULTTONEAREST,
            FallbackPolicy::Primary => MONITOR_DEFAULTTOPRIMARY,
            FallbackPolicy::None => MONITOR_DEFAULTTONULL,
        };

        let monitor = unsafe { MonitorFromWindow(hwnd(handle), flags) };
        (!monitor.is_invalid()).then_some(MonitorHandle(monitor.0 as isize))
    }

    fn monitor_info(&self, monitor: MonitorHandle) -> Result<MonitorInfo> {
        let mut info = MONITORINFO {
            cbSize: mem::size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };

        if !unsafe { GetMonitorInfoW(HMONITOR(monitor.0 as *mut c_void), &mut info) }.as_bool() {
            return Err(last_error("GetMonitorInfoW"));
        }

        Ok(MonitorInfo {
            bounds: rect_from_win(info.rcMonitor),
            work_area: rect_from_win(info.rcWork),
            primary: info.dwFlags & MONITORINFOF_PRIMARY != 0,
        })
    }

    fn set_window_pos(&self, handle: WindowHandle, placement: Placement) -> Result<()> {
        let mut flags: SET_WINDOW_POS_FLAGS = SWP_NOZORDER;
        if placement.keep_position {
            flags |= SWP_NOMOVE;
        }
        if !placement.activate {
            flags |= SWP_NOACTIVATE;
        }

        let rect = placement.rect;
        unsafe {
            SetWindowPos(
                hwnd(handle),
                None,
                rect.left(),
                rect.top(),
                rect.width(),
                rect.height(),
                flags,
            )
        }
        .map_err(|e| from_windows_error("SetWindowPos", e))
    }

    fn move_window(&self, handle: WindowHandle, rect: Rect) -> Result<()> {
        unsafe {
            MoveWindow(
                hwnd(handle),
                rect.left(),
                rect.top(),
                rect.width(),
                rect.height(),
                true,
            )
        }
        .map_err(|e| from_windows_error("MoveWindow", e))
    }

    fn show_window(&self, handle: WindowHandle, state: ShowState) -> Result<()> {
        let command = match state {
            ShowState::Restore => SW_RESTORE,
            ShowState::Maximize => SW_SHOWMAXIMIZED,
            ShowState::Minimize => SW_SHOWMINIMIZED,
        };

        // The return value is the previous visibility, not success.
        let _ = unsafe { ShowWindow(hwnd(handle), command) };
        if self.is_window(handle) {
            Ok(())
        } else {
            Err(Error::InvalidTarget(handle))
        }
    }

    fn set_foreground(&self, handle: WindowHandle) -> bool {
        unsafe { SetForegroundWindow(hwnd(handle)) }.as_bool()
    }

    fn dpi_for_window(&self, handle: WindowHandle) -> Option<u32> {
        match unsafe { GetDpiForWindow(hwnd(handle)) } {
            0 => None,
            dpi => Some(dpi),
        }
    }

    fn targets(&self) -> Result<Vec<Target>> {
        struct EnumContext {
            list: Vec<Target>,
            current_process_id: u32,
        }

        unsafe extern "system" fn enum_windows_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
            let context = unsafe { &mut *(lparam.0 as *mut EnumContext) };

            if let Some(target) = unsafe { target_for(hwnd, context.current_process_id) } {
                context.list.push(target);
            }

            TRUE
        }

        let mut context = EnumContext {
            list: vec![],
            current_process_id: unsafe { GetCurrentProcessId() },
        };

        unsafe {
            EnumWindows(
                Some(enum_windows_proc),
                LPARAM(std::ptr::addr_of_mut!(context) as isize),
            )
        }
        .map_err(|e| from_windows_error("EnumWindows", e))?;

        context
            .list
            .sort_by(|a, b| a.process.name.to_lowercase().cmp(&b.process.name.to_lowercase()));

        Ok(context.list)
    }
}

/// The entry for a visible, titled, unowned window of another process, or `None` for
/// anything that wouldn't show up as an application's main window.
unsafe fn target_for(hwnd: HWND, current_process_id: u32) -> Option<Target> {
    unsafe {
        if !IsWindowVisible(hwnd).as_bool() || GetWindow(hwnd, GW_OWNER).is_ok() {
            return None;
        }

        let ex_style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE);
        if ex_style & WS_EX_TOOLWINDOW.0 as isize != 0 {
            return None;
        }

        let mut pid = 0u32;
        GetWindowThreadProcessId(hwnd, Some(&mut pid));
        if pid == 0 || pid == current_process_id {
            return None;
        }

        let label = window_text(hwnd)?;

        let mut session_id = 0u32;
        if let Err(e) = ProcessIdToSessionId(pid, &mut session_id) {
            warn!(pid, "ProcessIdToSessionId: {e}");
            return None;
        }

        let name = process_name(pid).unwrap_or_else(|| format!("pid {pid}"));

        Some(Target {
            handle: WindowHandle(hwnd.0 as isize),
            label,
            process: ProcessIdentity::new(pid, session_id, name),
        })
    }
}

fn window_text(hwnd: HWND) -> Option<String> {
    let len = unsafe { GetWindowTextLengthW(hwnd) };
    if len <= 0 {
        return None;
    }

    let mut text = vec![0u16; len as usize + 1];
    let copied = unsafe { GetWindowTextW(hwnd, &mut text) };
    if copied <= 0 {
        return None;
    }

    Some(String::from_utf16_lossy(&text[..copied as usize]))
}

/// Executable file stem of `pid`, e.g. `notepad`.
fn process_name(pid: u32) -> Option<String> {
    unsafe {
        let process_handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid).ok()?;

        let mut buffer = [0u16; 1024];
        let mut buffer_size = buffer.len() as u32;

        let result = QueryFullProcessImageNameW(
            process_handle,
            PROCESS_NAME_FORMAT::default(),
            PWSTR(buffer.as_mut_ptr()),
            &mut buffer_size,
        );

        let _ = CloseHandle(process_handle);

        if result.is_ok() && buffer_size > 0 {
            let path = String::from_utf16_lossy(&buffer[..buffer_size as usize]);
            Path::new(&path)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        } else {
            None
        }
    }
}
