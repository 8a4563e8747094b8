use crate::{Size, WindowHandle};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Window {0} is no longer valid")]
    InvalidTarget(WindowHandle),
    #[error("{operation} failed; [0x{code:08X}] {message}")]
    NativeQuery {
        operation: &'static str,
        code: u32,
        message: String,
    },
    #[error("Can't size a window to {0}")]
    InvalidSize(Size),
    #[error("Nothing to undo")]
    NoUndoAvailable,
}

impl Error {
    pub fn native(operation: &'static str, code: u32, message: impl Into<String>) -> Self {
        Self::NativeQuery {
            operation,
            code,
            message: message.into(),
        }
    }

    pub fn is_invalid_target(&self) -> bool {
        matches!(self, Self::InvalidTarget(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
