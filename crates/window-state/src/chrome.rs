use crate::{Desktop, MenuHandle, Result, WindowHandle, geometry::ensure_alive};

/// A window's `GWL_STYLE` bits, kept opaque apart from the few flags fullscreen needs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StyleBits(pub isize);

impl StyleBits {
    pub const CAPTION: Self = Self(0x00C0_0000);
    pub const THICK_FRAME: Self = Self(0x0004_0000);
    pub const SYS_MENU: Self = Self(0x0008_0000);
    pub const MINIMIZE_BOX: Self = Self(0x0002_0000);
    pub const MAXIMIZE_BOX: Self = Self(0x0001_0000);
    pub const VISIBLE: Self = Self(0x1000_0000);
    pub const POPUP: Self = Self(0x8000_0000_u32 as i32 as isize);

    pub const OVERLAPPED_WINDOW: Self = Self(
        Self::CAPTION.0
            | Self::SYS_MENU.0
            | Self::THICK_FRAME.0
            | Self::MINIMIZE_BOX.0
            | Self::MAXIMIZE_BOX.0,
    );

    /// Replaces caption, border and sizing bits when a window goes fullscreen.
    pub const FULLSCREEN: Self = Self(Self::VISIBLE.0 | Self::POPUP.0);

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for StyleBits {
    type Output = StyleBits;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::fmt::Display for StyleBits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08X}", self.0 as u32)
    }
}

/// Style and menu captured on the way into fullscreen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChromeSnapshot {
    pub style: StyleBits,
    pub menu: Option<MenuHandle>,
}

pub fn style<D: Desktop + ?Sized>(desktop: &D, handle: WindowHandle) -> Result<StyleBits> {
    ensure_alive(desktop, handle)?;
    desktop.style(handle)
}

/// Writes the style and returns the old one. The OS only recomputes the non-client area
/// after the window is moved or resized, which is left to the caller.
pub fn set_style<D: Desktop + ?Sized>(
    desktop: &D,
    handle: WindowHandle,
    style: StyleBits,
) -> Result<StyleBits> {
    ensure_alive(desktop, handle)?;
    desktop.set_style(handle, style)
}

pub fn menu<D: Desktop + ?Sized>(desktop: &D, handle: WindowHandle) -> Result<Option<MenuHandle>> {
    ensure_alive(desktop, handle)?;
    Ok(desktop.menu(handle))
}

/// Attaches `menu` (or detaches the current one) and returns what was attached before.
pub fn set_menu<D: Desktop + ?Sized>(
    desktop: &D,
    handle: WindowHandle,
    menu: Option<MenuHandle>,
) -> Result<Option<MenuHandle>> {
    ensure_alive(desktop, handle)?;
    let previous = desktop.menu(handle);
    desktop.set_menu(handle, menu)?;
    Ok(previous)
}
