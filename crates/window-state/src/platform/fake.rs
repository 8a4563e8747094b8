//! An in-memory window manager for exercising the engine without a real desktop.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use super::{Desktop, MenuHandle, MonitorHandle, MonitorInfo, Placement, ShowState, WindowHandle};
use crate::{
    Error, ProcessIdentity, Rect, Result, Size, StyleBits, Target, monitor::FallbackPolicy,
};

const ACCESS_DENIED: u32 = 5;

/// Where Windows parks minimized windows.
const MINIMIZED_RECT: Rect = Rect {
    left: -32000,
    top: -32000,
    right: -31840,
    bottom: -31972,
};

/// A mutating call that reached the fake window manager and succeeded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    SetStyle(StyleBits),
    SetMenu(Option<MenuHandle>),
    SetWindowPos(Placement),
    MoveWindow(Rect),
    ShowWindow(ShowState),
    SetForeground,
}

#[derive(Clone, Debug)]
pub struct FakeWindow {
    rect: Rect,
    style: StyleBits,
    menu: Option<MenuHandle>,
    border: Size,
    show: ShowState,
    dpi: u32,
    label: String,
    process: ProcessIdentity,
    alive: bool,
}

impl FakeWindow {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            style: StyleBits::OVERLAPPED_WINDOW | StyleBits::VISIBLE,
            menu: None,
            border: Size::new(16, 39),
            show: ShowState::Restore,
            dpi: 96,
            label: "Untitled".to_string(),
            process: ProcessIdentity::new(1000, 1, "app.exe"),
            alive: true,
        }
    }

    /// Border delta applied while the window still has a caption or a sizing frame.
    pub fn with_border(mut self, border: Size) -> Self {
        self.border = border;
        self
    }

    pub fn with_menu(mut self, menu: MenuHandle) -> Self {
        self.menu = Some(menu);
        self
    }

    pub fn with_show_state(mut self, show: ShowState) -> Self {
        self.show = show;
        self
    }

    pub fn with_process(mut self, label: &str, process: ProcessIdentity) -> Self {
        self.label = label.to_string();
        self.process = process;
        self
    }

    fn has_chrome(&self) -> bool {
        self.style.contains(StyleBits::CAPTION) || self.style.contains(StyleBits::THICK_FRAME)
    }
}

struct State {
    windows: BTreeMap<isize, FakeWindow>,
    monitors: Vec<MonitorInfo>,
    next_handle: isize,
    calls: Vec<Call>,
    failures: Vec<&'static str>,
    foreground: Option<WindowHandle>,
    refuse_foreground: bool,
}

impl State {
    fn check(&mut self, operation: &'static str) -> Result<()> {
        if let Some(index) = self.failures.iter().position(|f| *f == operation) {
            self.failures.remove(index);
            return Err(Error::native(operation, ACCESS_DENIED, "Access is denied."));
        }

        Ok(())
    }

    fn window(&self, handle: WindowHandle) -> Result<&FakeWindow> {
        self.windows
            .get(&handle.0)
            .filter(|w| w.alive)
            .ok_or(Error::InvalidTarget(handle))
    }

    fn window_mut(&mut self, handle: WindowHandle) -> Result<&mut FakeWindow> {
        self.windows
            .get_mut(&handle.0)
            .filter(|w| w.alive)
            .ok_or(Error::InvalidTarget(handle))
    }

    fn outer_rect(&self, window: &FakeWindow) -> Rect {
        match window.show {
            ShowState::Restore => window.rect,
            ShowState::Minimize => MINIMIZED_RECT,
            ShowState::Maximize => self
                .monitor_index_for(window.rect, FallbackPolicy::Nearest)
                .map(|i| self.monitors[i].work_area)
                .unwrap_or(window.rect),
        }
    }

    fn monitor_index_for(&self, rect: Rect, policy: FallbackPolicy) -> Option<usize> {
        let best = self
            .monitors
            .iter()
            .enumerate()
            .map(|(i, m)| (i, m.bounds.intersection_area(&rect)))
            .filter(|(_, area)| *area > 0)
            .max_by_key(|(_, area)| *area)
            .map(|(i, _)| i);

        if best.is_some() {
            return best;
        }

        match policy {
            FallbackPolicy::None => None,
            FallbackPolicy::Primary => self.monitors.iter().position(|m| m.primary),
            FallbackPolicy::Nearest => self
                .monitors
                .iter()
                .enumerate()
                .min_by_key(|(_, m)| gap(&m.bounds, &rect))
                .map(|(i, _)| i),
        }
    }
}

fn gap(a: &Rect, b: &Rect) -> i64 {
    let dx = (a.left - b.right).max(b.left - a.right).max(0) as i64;
    let dy = (a.top - b.bottom).max(b.top - a.bottom).max(0) as i64;
    dx * dx + dy * dy
}

/// Cheap to clone; clones share the same desktop.
#[derive(Clone)]
pub struct FakeDesktop(Rc<RefCell<State>>);

impl Default for FakeDesktop {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDesktop {
    /// A desktop with one 1920x1080 primary monitor and a 40px taskbar.
    pub fn new() -> Self {
        let desktop = Self(Rc::new(RefCell::new(State {
            windows: BTreeMap::new(),
            monitors: vec![],
            next_handle: 0x1000,
            calls: vec![],
            failures: vec![],
            foreground: None,
            refuse_foreground: false,
        })));
        desktop.add_monitor(Rect::new(0, 0, 1920, 1080), 40);
        desktop
    }

    pub fn add_monitor(&self, bounds: Rect, taskbar_height: i32) -> MonitorHandle {
        let mut state = self.0.borrow_mut();
        let primary = state.monitors.is_empty();
        state.monitors.push(MonitorInfo {
            bounds,
            work_area: Rect::new(
                bounds.left,
                bounds.top,
                bounds.right,
                bounds.bottom - taskbar_height,
            ),
            primary,
        });
        MonitorHandle(state.monitors.len() as isize)
    }

    pub fn add_window(&self, window: FakeWindow) -> WindowHandle {
        let mut state = self.0.borrow_mut();
        let handle = WindowHandle(state.next_handle);
        state.next_handle += 0x10;
        state.windows.insert(handle.0, window);
        handle
    }

    /// Simulates the owning process closing the window.
    pub fn close(&self, handle: WindowHandle) {
        if let Some(window) = self.0.borrow_mut().windows.get_mut(&handle.0) {
            window.alive = false;
        }
    }

    /// Makes the next call to `operation` (a Win32 function name) fail.
    pub fn fail_next(&self, operation: &'static str) {
        self.0.borrow_mut().failures.push(operation);
    }

    pub fn refuse_foreground(&self, refuse: bool) {
        self.0.borrow_mut().refuse_foreground = refuse;
    }

    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut self.0.borrow_mut().calls)
    }

    pub fn foreground(&self) -> Option<WindowHandle> {
        self.0.borrow().foreground
    }

    pub fn show_state(&self, handle: WindowHandle) -> ShowState {
        self.0.borrow().windows[&handle.0].show
    }

    pub fn menu_of(&self, handle: WindowHandle) -> Option<MenuHandle> {
        self.0.borrow().windows[&handle.0].menu
    }

    pub fn style_of(&self, handle: WindowHandle) -> StyleBits {
        self.0.borrow().windows[&handle.0].style
    }

    pub fn rect_of(&self, handle: WindowHandle) -> Rect {
        let state = self.0.borrow();
        state.outer_rect(&state.windows[&handle.0])
    }
}

impl Desktop for FakeDesktop {
    fn is_window(&self, handle: WindowHandle) -> bool {
        self.0.borrow().window(handle).is_ok()
    }

    fn window_rect(&self, handle: WindowHandle) -> Result<Rect> {
        let mut state = self.0.borrow_mut();
        state.check("GetWindowRect")?;
        let window = state.window(handle)?;
        Ok(state.outer_rect(window))
    }

    fn client_rect(&self, handle: WindowHandle) -> Result<Rect> {
        let mut state = self.0.borrow_mut();
        state.check("GetClientRect")?;
        let window = state.window(handle)?;
        if window.show == ShowState::Minimize {
            return Ok(Rect::default());
        }

        let outer = state.outer_rect(window);
        let border = if window.has_chrome() {
            window.border
        } else {
            Size::default()
        };

        Ok(Rect::new(
            0,
            0,
            (outer.width() - border.width).max(0),
            (outer.height() - border.height).max(0),
        ))
    }

    fn style(&self, handle: WindowHandle) -> Result<StyleBits> {
        let mut state = self.0.borrow_mut();
        state.check("GetWindowLongPtrW")?;
        Ok(state.window(handle)?.style)
    }

    fn set_style(&self, handle: WindowHandle, style: StyleBits) -> Result<StyleBits> {
        let mut state = self.0.borrow_mut();
        state.check("SetWindowLongPtrW")?;
        let previous = std::mem::replace(&mut state.window_mut(handle)?.style, style);
        state.calls.push(Call::SetStyle(style));
        Ok(previous)
    }

    fn menu(&self, handle: WindowHandle) -> Option<MenuHandle> {
        self.0.borrow().window(handle).ok()?.menu
    }

    fn set_menu(&self, handle: WindowHandle, menu: Option<MenuHandle>) -> Result<()> {
        let mut state = self.0.borrow_mut();
        state.check("SetMenu")?;
        state.window_mut(handle)?.menu = menu;
        state.calls.push(Call::SetMenu(menu));
        Ok(())
    }

    fn monitor_from_window(
        &self,
        handle: WindowHandle,
        policy: FallbackPolicy,
    ) -> Option<MonitorHandle> {
        let state = self.0.borrow();
        let window = state.window(handle).ok()?;
        let rect = state.outer_rect(window);
        state
            .monitor_index_for(rect, policy)
            .map(|i| MonitorHandle(i as isize + 1))
    }

    fn monitor_info(&self, monitor: MonitorHandle) -> Result<MonitorInfo> {
        let mut state = self.0.borrow_mut();
        state.check("GetMonitorInfoW")?;
        usize::try_from(monitor.0 - 1)
            .ok()
            .and_then(|i| state.monitors.get(i).copied())
            .ok_or_else(|| Error::native("GetMonitorInfoW", 1461, "Invalid monitor handle."))
    }

    fn set_window_pos(&self, handle: WindowHandle, placement: Placement) -> Result<()> {
        let mut state = self.0.borrow_mut();
        state.check("SetWindowPos")?;
        let window = state.window_mut(handle)?;
        let origin = if placement.keep_position {
            window.rect.origin()
        } else {
            placement.rect.origin()
        };
        window.rect = Rect::from_origin_size(origin, placement.rect.size());
        if placement.activate {
            state.foreground = Some(handle);
        }
        state.calls.push(Call::SetWindowPos(placement));
        Ok(())
    }

    fn move_window(&self, handle: WindowHandle, rect: Rect) -> Result<()> {
        let mut state = self.0.borrow_mut();
        state.check("MoveWindow")?;
        state.window_mut(handle)?.rect = rect;
        state.calls.push(Call::MoveWindow(rect));
        Ok(())
    }

    fn show_window(&self, handle: WindowHandle, show: ShowState) -> Result<()> {
        let mut state = self.0.borrow_mut();
        state.check("ShowWindow")?;
        state.window_mut(handle)?.show = show;
        state.calls.push(Call::ShowWindow(show));
        Ok(())
    }

    fn set_foreground(&self, handle: WindowHandle) -> bool {
        let mut state = self.0.borrow_mut();
        if state.refuse_foreground || state.window(handle).is_err() {
            return false;
        }
        state.foreground = Some(handle);
        state.calls.push(Call::SetForeground);
        true
    }

    fn dpi_for_window(&self, handle: WindowHandle) -> Option<u32> {
        self.0.borrow().window(handle).ok().map(|w| w.dpi)
    }

    fn targets(&self) -> Result<Vec<Target>> {
        let mut state = self.0.borrow_mut();
        state.check("EnumWindows")?;
        Ok(state
            .windows
            .iter()
            .filter(|(_, w)| w.alive)
            .map(|(handle, w)| Target {
                handle: WindowHandle(*handle),
                label: w.label.clone(),
                process: w.process.clone(),
            })
            .collect())
    }
}
