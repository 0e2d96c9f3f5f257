use super::FramebufferScale;

/// Axis-aligned clip rectangle as emitted by the UI library.
///
/// Stored as corners `(x0, y0)`–`(x1, y1)` in the same space as the display
/// size (top-left origin). No normalization is applied: an inverted rect stays
/// inverted so the renderer reproduces exactly what the UI library asked for.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ClipRect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl ClipRect {
    #[inline]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.y1 - self.y0
    }

    /// Converts logical coordinates to device coordinates.
    #[inline]
    pub fn scaled(self, scale: FramebufferScale) -> Self {
        Self::new(
            self.x0 * scale.x,
            self.y0 * scale.y,
            self.x1 * scale.x,
            self.y1 * scale.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_and_height_follow_corners() {
        let c = ClipRect::new(10.0, 20.0, 110.0, 70.0);
        assert_eq!(c.width(), 100.0);
        assert_eq!(c.height(), 50.0);
    }

    #[test]
    fn inverted_rect_keeps_negative_width() {
        let c = ClipRect::new(50.0, 0.0, 10.0, 10.0);
        assert_eq!(c.width(), -40.0);
    }

    #[test]
    fn scaled_multiplies_each_axis() {
        let c = ClipRect::new(1.0, 2.0, 3.0, 4.0).scaled(FramebufferScale::new(2.0, 3.0));
        assert_eq!(c, ClipRect::new(2.0, 6.0, 6.0, 12.0));
    }
}
