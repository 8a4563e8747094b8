//! Native window state transitions with a single-step undo.
//!
//! A [`WindowSession`] wraps one top-level window and applies [`Transition`]s to it, keeping
//! just enough of the previous state to invert the last one. All native calls go through
//! the [`Desktop`] trait; [`platform::Win32Desktop`] is the real implementation.

pub mod bounds;
pub mod chrome;
mod error;
pub mod geometry;
pub mod monitor;
pub mod platform;
mod target;
mod transition;
mod undo;

pub use bounds::{Point, Rect, Size};
pub use chrome::{ChromeSnapshot, StyleBits};
pub use error::{Error, Result};
pub use geometry::WindowMetrics;
pub use monitor::FallbackPolicy;
pub use platform::{
    Desktop, MenuHandle, MonitorHandle, MonitorInfo, Placement, ShowState, WindowHandle,
};
pub use target::{ProcessIdentity, Selection, Target};
pub use transition::{Transition, TransitionOptions, TransitionRecord, WindowSession};
pub use undo::UndoOutcome;
