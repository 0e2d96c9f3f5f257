//! Explicit UI context handle.
//!
//! The UI library keeps IO state and font-atlas metadata that the backend
//! reads and writes. Instead of reaching for an ambient global, the host
//! creates one [`UiContext`], passes it to every renderer call, and drops it
//! after the renderer is shut down.

use crate::coords::{DisplaySize, FramebufferScale};
use crate::draw_data::TextureId;

/// Per-frame IO shared between the host, the UI library and the renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Io {
    /// Display size in logical pixels. The renderer overwrites it on every
    /// render call.
    pub display_size: DisplaySize,

    pub framebuffer_scale: FramebufferScale,

    /// Set by the renderer when it honors `DrawCmd::vtx_offset`, so the UI
    /// library may emit lists with more than 65536 vertices.
    pub renderer_has_vtx_offset: bool,
}

/// RGBA32 pixels of a rasterized font atlas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontBitmap {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl FontBitmap {
    pub const BYTES_PER_PIXEL: usize = 4;

    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self { pixels, width, height }
    }

    /// Single opaque white texel. Sampling it leaves vertex colors untouched.
    pub fn white_pixel() -> Self {
        Self::new(vec![255; Self::BYTES_PER_PIXEL], 1, 1)
    }

    /// `true` when `pixels` is a non-empty RGBA32 image of `width` x `height`.
    pub fn fits(pixels: &[u8], width: u32, height: u32) -> bool {
        width > 0
            && height > 0
            && pixels.len() == width as usize * height as usize * Self::BYTES_PER_PIXEL
    }
}

/// Font-atlas metadata owned by the UI library.
///
/// The UI library deposits a freshly rasterized bitmap here; the renderer takes
/// it, uploads it and publishes the resulting texture id back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontAtlas {
    tex_data: Option<FontBitmap>,
    tex_id: Option<TextureId>,
}

impl FontAtlas {
    /// Queues a bitmap for upload on the next font texture (re)creation.
    pub fn set_tex_data(&mut self, bitmap: FontBitmap) {
        self.tex_data = Some(bitmap);
    }

    pub fn tex_data(&self) -> Option<&FontBitmap> {
        self.tex_data.as_ref()
    }

    pub fn take_tex_data(&mut self) -> Option<FontBitmap> {
        self.tex_data.take()
    }

    /// Texture id draw commands should use to sample the atlas.
    pub fn tex_id(&self) -> Option<TextureId> {
        self.tex_id
    }

    pub fn set_tex_id(&mut self, id: TextureId) {
        self.tex_id = Some(id);
    }

    pub fn clear_tex_id(&mut self) {
        self.tex_id = None;
    }
}

/// The UI context handle: create once, pass everywhere, drop once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiContext {
    pub io: Io,
    pub fonts: FontAtlas,
}

impl UiContext {
    pub fn new() -> Self {
        Self::default()
    }
}
