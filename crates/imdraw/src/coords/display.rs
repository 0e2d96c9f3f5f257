/// Display size in logical pixels, supplied by the host once per render call.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct DisplaySize {
    pub width: f32,
    pub height: f32,
}

impl DisplaySize {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Size in device pixels.
    #[inline]
    pub fn scaled(self, scale: FramebufferScale) -> Self {
        Self::new(self.width * scale.x, self.height * scale.y)
    }
}

/// Device pixels per logical pixel, per axis (HiDPI).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FramebufferScale {
    pub x: f32,
    pub y: f32,
}

impl FramebufferScale {
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn uniform(s: f32) -> Self {
        Self { x: s, y: s }
    }
}

impl Default for FramebufferScale {
    fn default() -> Self {
        Self::ONE
    }
}
