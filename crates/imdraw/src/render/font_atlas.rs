use crate::context::{FontAtlas, FontBitmap};
use crate::device::{RenderDevice, TextureDesc};
use crate::draw_data::TextureId;
use crate::error::RenderError;

/// Device texture holding the rasterized font atlas.
///
/// At most one texture is alive at a time. Replacing the font releases the
/// previous texture before the new one is created.
#[derive(Debug, Default)]
pub struct FontAtlasTexture {
    texture: Option<TextureId>,
    size: (u32, u32),
}

impl FontAtlasTexture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    /// Dimensions of the current texture, `(0, 0)` when there is none.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Uploads an RGBA32 bitmap as the new font texture and publishes its id
    /// into `fonts`.
    ///
    /// A malformed bitmap is rejected before anything is released.
    pub fn set_font(
        &mut self,
        device: &mut dyn RenderDevice,
        fonts: &mut FontAtlas,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureId, RenderError> {
        if !FontBitmap::fits(pixels, width, height) {
            return Err(RenderError::InvalidFontBitmap {
                width,
                height,
                len: pixels.len(),
            });
        }

        if let Some(old) = self.texture.take() {
            device.destroy_texture(old);
            fonts.clear_tex_id();
            self.size = (0, 0);
            log::debug!("font texture {old:?} released");
        }

        let id = device.create_texture(&TextureDesc::font_atlas(width, height), pixels)?;
        self.texture = Some(id);
        self.size = (width, height);
        fonts.set_tex_id(id);
        log::debug!("font texture {id:?} uploaded ({width}x{height})");
        Ok(id)
    }

    /// Uploads the bitmap pending in `fonts`, then drops the CPU copy.
    ///
    /// With nothing pending the current texture is republished; with no
    /// current texture either, a 1x1 white texel stands in so untextured
    /// geometry still renders. On failure the pending bitmap stays queued.
    pub fn recreate_from_atlas(
        &mut self,
        device: &mut dyn RenderDevice,
        fonts: &mut FontAtlas,
    ) -> Result<TextureId, RenderError> {
        match fonts.take_tex_data() {
            Some(bitmap) => {
                match self.set_font(device, fonts, &bitmap.pixels, bitmap.width, bitmap.height) {
                    Ok(id) => Ok(id),
                    Err(e) => {
                        fonts.set_tex_data(bitmap);
                        Err(e)
                    }
                }
            }
            None => match self.texture {
                Some(id) => {
                    fonts.set_tex_id(id);
                    Ok(id)
                }
                None => {
                    let white = FontBitmap::white_pixel();
                    self.set_font(device, fonts, &white.pixels, white.width, white.height)
                }
            },
        }
    }

    pub fn release(&mut self, device: &mut dyn RenderDevice) {
        if let Some(id) = self.texture.take() {
            device.destroy_texture(id);
            self.size = (0, 0);
        }
    }
}
