use serde::Serialize;

use crate::{Desktop, Error, Rect, Result, Size, WindowHandle};

/// Outer and client sizes, as shown next to the size inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct WindowMetrics {
    pub outer: Size,
    pub client: Size,
}

/// Fails with [`Error::InvalidTarget`] for the null handle and for windows that have gone away.
pub fn ensure_alive<D: Desktop + ?Sized>(desktop: &D, handle: WindowHandle) -> Result<()> {
    if handle.is_null() || !desktop.is_window(handle) {
        return Err(Error::InvalidTarget(handle));
    }

    Ok(())
}

pub fn window_rect<D: Desktop + ?Sized>(desktop: &D, handle: WindowHandle) -> Result<Rect> {
    ensure_alive(desktop, handle)?;
    desktop.window_rect(handle)
}

pub fn client_rect<D: Desktop + ?Sized>(desktop: &D, handle: WindowHandle) -> Result<Rect> {
    ensure_alive(desktop, handle)?;
    desktop.client_rect(handle)
}

/// Outer-minus-client size. Changes with the window's chrome, so never cache it.
pub fn border_delta<D: Desktop + ?Sized>(desktop: &D, handle: WindowHandle) -> Result<Size> {
    let outer = window_rect(desktop, handle)?;
    let client = client_rect(desktop, handle)?;

    Ok(Size::new(
        outer.width() - client.right(),
        outer.height() - client.bottom(),
    ))
}

pub fn metrics<D: Desktop + ?Sized>(desktop: &D, handle: WindowHandle) -> Result<WindowMetrics> {
    let outer = window_rect(desktop, handle)?;
    let client = client_rect(desktop, handle)?;

    Ok(WindowMetrics {
        outer: outer.size(),
        client: Size::new(client.right(), client.bottom()),
    })
}
