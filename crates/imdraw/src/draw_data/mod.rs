//! Per-frame draw data handed over by the UI library.
//!
//! Responsibilities:
//! - describe geometry (vertices + 16-bit indices) per draw list
//! - describe draw commands (index range, texture, clip rect) in paint order
//!
//! The renderer only reads these types; nothing here is retained across frames.

mod cmd;
mod list;
mod vertex;

pub use cmd::{DrawCmd, TextureId, UserCallback};
pub use list::{DrawData, DrawList};
pub use vertex::{DrawIdx, Vertex};
