use crate::device::{BufferKind, DeviceError};

/// Errors surfaced by the renderer.
///
/// Everything here aborts the current call. Shader compile/link problems are
/// not errors: they are logged and rendering continues.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A draw command carried a user callback. The draw data violates this
    /// backend's contract; the frame stops at the offending command.
    #[error("draw command {command} of draw list {list} has a user callback, which is not supported")]
    UnsupportedCallback { list: usize, command: usize },

    /// An upload was larger than the buffer it targets.
    #[error("upload of {len} bytes exceeds the {kind:?} buffer capacity of {capacity} bytes")]
    BufferOverflow {
        kind: BufferKind,
        len: u64,
        capacity: u64,
    },

    /// Font pixels do not describe a non-empty RGBA32 image of the given size.
    #[error("font bitmap of {len} bytes is not a {width}x{height} RGBA32 image")]
    InvalidFontBitmap { width: u32, height: u32, len: usize },

    /// The renderer's device resources were already released.
    #[error("renderer has been shut down")]
    NotReady,

    #[error(transparent)]
    Device(#[from] DeviceError),
}
