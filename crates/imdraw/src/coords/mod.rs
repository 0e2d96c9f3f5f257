//! Coordinate types shared by the draw data and the renderer.
//!
//! Canonical UI space:
//! - logical pixels
//! - origin top-left
//! - +X right, +Y down
//!
//! Device pixels are logical pixels multiplied by the framebuffer scale.

mod clip_rect;
mod display;
mod vec2;

pub use clip_rect::ClipRect;
pub use display::{DisplaySize, FramebufferScale};
pub use vec2::Vec2;
