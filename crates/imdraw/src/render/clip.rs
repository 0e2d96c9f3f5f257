use crate::coords::{ClipRect, DisplaySize, FramebufferScale};
use crate::device::ScissorRect;

/// Column-major 4x4 matrix, as uploaded to the projection uniform.
pub type Mat4 = [[f32; 4]; 4];

/// Orthographic projection mapping `(0,0)..(w,h)` (top-left origin, +Y down)
/// onto clip space, with near -1 and far 1.
pub fn projection_matrix(display: DisplaySize) -> Mat4 {
    let (w, h) = (display.width, display.height);
    [
        [2.0 / w, 0.0, 0.0, 0.0],
        [0.0, -2.0 / h, 0.0, 0.0],
        [0.0, 0.0, -1.0, 0.0],
        [-1.0, 1.0, 0.0, 1.0],
    ]
}

/// Device scissor (bottom-left origin) for a command's clip rect.
///
/// The clip is scaled to device pixels first, then flipped against
/// `display_height`, which the caller passes in device pixels. Components
/// truncate toward zero. An inverted clip yields a negative extent and is
/// passed through as is.
pub fn scissor_rect(clip: ClipRect, display_height: f32, scale: FramebufferScale) -> ScissorRect {
    let c = clip.scaled(scale);
    ScissorRect::new(
        c.x0 as i32,
        display_height as i32 - c.y1 as i32,
        (c.x1 - c.x0) as i32,
        (c.y1 - c.y0) as i32,
    )
}
