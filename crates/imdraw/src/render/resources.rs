use crate::config::RendererConfig;
use crate::context::FontAtlas;
use crate::device::RenderDevice;
use crate::error::RenderError;

use super::buffers::GeometryBuffers;
use super::font_atlas::FontAtlasTexture;
use super::shader::ShaderProgram;

/// Everything the renderer owns on the device.
///
/// Created all at once or not at all: when a step fails, the steps that
/// already succeeded are released before the error is returned.
#[derive(Debug)]
pub struct DeviceResources {
    pub(crate) shader: ShaderProgram,
    pub(crate) buffers: GeometryBuffers,
    pub(crate) font: FontAtlasTexture,
}

impl DeviceResources {
    pub fn create(
        device: &mut dyn RenderDevice,
        fonts: &mut FontAtlas,
        config: &RendererConfig,
    ) -> Result<Self, RenderError> {
        let shader = ShaderProgram::compile_and_link(device);

        let buffers = match GeometryBuffers::create(device, config) {
            Ok(b) => b,
            Err(e) => {
                shader.release(device);
                return Err(e);
            }
        };

        let mut font = FontAtlasTexture::new();
        if let Err(e) = font.recreate_from_atlas(device, fonts) {
            buffers.release(device);
            shader.release(device);
            return Err(e);
        }

        Ok(Self { shader, buffers, font })
    }

    pub fn shader(&self) -> &ShaderProgram {
        &self.shader
    }

    pub fn buffers(&self) -> &GeometryBuffers {
        &self.buffers
    }

    pub fn font(&self) -> &FontAtlasTexture {
        &self.font
    }

    pub fn release(mut self, device: &mut dyn RenderDevice) {
        self.font.release(device);
        self.buffers.release(device);
        self.shader.release(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FontBitmap;
    use crate::device::RecordingDevice;

    #[test]
    fn create_allocates_program_buffers_and_font() {
        let mut dev = RecordingDevice::new();
        let mut fonts = FontAtlas::default();
        let res = DeviceResources::create(&mut dev, &mut fonts, &RendererConfig::default()).unwrap();

        assert_eq!(dev.live_programs(), 1);
        assert_eq!(dev.live_buffers(), 2);
        assert_eq!(dev.live_textures(), 1);
        assert_eq!(fonts.tex_id(), res.font().texture());
    }

    #[test]
    fn buffer_failure_releases_program() {
        let mut dev = RecordingDevice::new().with_allocation_limit(1_000);
        let mut fonts = FontAtlas::default();

        assert!(DeviceResources::create(&mut dev, &mut fonts, &RendererConfig::default()).is_err());
        assert_eq!(dev.live_programs(), 0);
        assert_eq!(dev.live_buffers(), 0);
    }

    #[test]
    fn font_failure_releases_everything_else() {
        let mut dev = RecordingDevice::new();
        let mut fonts = FontAtlas::default();
        fonts.set_tex_data(FontBitmap::new(vec![0; 3], 1, 1));

        assert!(DeviceResources::create(&mut dev, &mut fonts, &RendererConfig::default()).is_err());
        assert_eq!(dev.live_programs(), 0);
        assert_eq!(dev.live_buffers(), 0);
        assert_eq!(dev.live_textures(), 0);
    }

    #[test]
    fn release_leaves_nothing_alive() {
        let mut dev = RecordingDevice::new();
        let mut fonts = FontAtlas::default();
        DeviceResources::create(&mut dev, &mut fonts, &RendererConfig::default())
            .unwrap()
            .release(&mut dev);

        assert_eq!(dev.live_programs(), 0);
        assert_eq!(dev.live_buffers(), 0);
        assert_eq!(dev.live_textures(), 0);
    }
}
