use crate::config::RendererConfig;
use crate::context::UiContext;
use crate::coords::DisplaySize;
use crate::device::{BufferKind, RenderDevice};
use crate::draw_data::{DrawData, TextureId};
use crate::error::RenderError;

use super::resources::DeviceResources;
use super::translator::{DrawDataTranslator, FrameStats};

/// Rendering backend for one UI context.
///
/// Lifecycle:
/// - [`Renderer::new`] creates every device resource or fails without leaking
/// - ready: `render`, `set_font`, `recreate_font_texture`
/// - [`Renderer::shutdown`] (or drop) releases everything; later calls return
///   [`RenderError::NotReady`]
pub struct Renderer<D: RenderDevice> {
    device: D,
    config: RendererConfig,
    resources: Option<DeviceResources>,
    translator: DrawDataTranslator,
}

impl<D: RenderDevice> Renderer<D> {
    /// Creates the program, geometry buffers and font texture on `device`.
    ///
    /// Advertises vertex-offset support in `ctx.io` and publishes the font
    /// texture id into `ctx.fonts`. A bitmap pending in the atlas is uploaded;
    /// otherwise a 1x1 white texture is used until [`Renderer::set_font`].
    pub fn new(mut device: D, ctx: &mut UiContext, config: RendererConfig) -> Result<Self, RenderError> {
        ctx.io.renderer_has_vtx_offset = config.use_vertex_offset;

        let resources = DeviceResources::create(&mut device, &mut ctx.fonts, &config)?;
        log::info!(
            "renderer ready: vertex buffer {} bytes, index buffer {} bytes, program {}",
            resources.buffers().capacity(BufferKind::Vertex),
            resources.buffers().capacity(BufferKind::Index),
            if resources.shader().is_linked() { "linked" } else { "NOT linked" },
        );

        Ok(Self {
            device,
            translator: DrawDataTranslator::new(config.font_texture_unit),
            config,
            resources: Some(resources),
        })
    }

    /// Renders one frame of draw data at `display_size` (logical pixels).
    ///
    /// A zero or non-finite framebuffer size renders nothing.
    pub fn render(
        &mut self,
        ctx: &mut UiContext,
        draw_data: &DrawData,
        display_size: DisplaySize,
    ) -> Result<FrameStats, RenderError> {
        let resources = self.resources.as_mut().ok_or(RenderError::NotReady)?;

        ctx.io.display_size = display_size;
        if !display_size.scaled(ctx.io.framebuffer_scale).is_valid() {
            log::debug!("render skipped: framebuffer size {display_size:?} is empty");
            return Ok(FrameStats::default());
        }

        self.translator
            .render(&mut self.device, resources, &ctx.io, draw_data)
    }

    /// Replaces the font atlas texture with an RGBA32 bitmap.
    pub fn set_font(
        &mut self,
        ctx: &mut UiContext,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureId, RenderError> {
        let resources = self.resources.as_mut().ok_or(RenderError::NotReady)?;
        resources
            .font
            .set_font(&mut self.device, &mut ctx.fonts, pixels, width, height)
    }

    /// Uploads the bitmap pending in `ctx.fonts` (after the UI library
    /// rebuilt its atlas) and drops the CPU copy.
    pub fn recreate_font_texture(&mut self, ctx: &mut UiContext) -> Result<TextureId, RenderError> {
        let resources = self.resources.as_mut().ok_or(RenderError::NotReady)?;
        resources
            .font
            .recreate_from_atlas(&mut self.device, &mut ctx.fonts)
    }

    /// Releases every device resource. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(resources) = self.resources.take() {
            resources.release(&mut self.device);
            log::debug!("renderer shut down");
        }
    }

    pub fn is_ready(&self) -> bool {
        self.resources.is_some()
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn resources(&self) -> Option<&DeviceResources> {
        self.resources.as_ref()
    }

    pub fn buffer_capacity(&self, kind: BufferKind) -> Option<u64> {
        self.resources.as_ref().map(|r| r.buffers().capacity(kind))
    }

    pub fn font_texture(&self) -> Option<TextureId> {
        self.resources.as_ref().and_then(|r| r.font().texture())
    }
}

impl<D: RenderDevice> Drop for Renderer<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::FramebufferScale;
    use crate::device::RecordingDevice;

    fn renderer() -> (Renderer<RecordingDevice>, UiContext) {
        let mut ctx = UiContext::new();
        let r = Renderer::new(RecordingDevice::new(), &mut ctx, RendererConfig::default()).unwrap();
        (r, ctx)
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn new_publishes_backend_flags_and_font() {
        let (r, ctx) = renderer();
        assert!(r.is_ready());
        assert!(ctx.io.renderer_has_vtx_offset);
        assert_eq!(ctx.fonts.tex_id(), r.font_texture());
    }

    #[test]
    fn vertex_offset_flag_follows_config() {
        let mut ctx = UiContext::new();
        let config = RendererConfig { use_vertex_offset: false, ..RendererConfig::default() };
        let _r = Renderer::new(RecordingDevice::new(), &mut ctx, config).unwrap();
        assert!(!ctx.io.renderer_has_vtx_offset);
    }

    #[test]
    fn failed_creation_returns_error() {
        let mut ctx = UiContext::new();
        let dev = RecordingDevice::new().with_allocation_limit(10);
        assert!(Renderer::new(dev, &mut ctx, RendererConfig::default()).is_err());
    }

    #[test]
    fn shutdown_releases_and_blocks_further_calls() {
        let (mut r, mut ctx) = renderer();
        r.shutdown();

        assert!(!r.is_ready());
        assert_eq!(r.device().live_buffers(), 0);
        assert_eq!(r.device().live_textures(), 0);
        assert_eq!(r.device().live_programs(), 0);
        assert!(matches!(
            r.render(&mut ctx, &DrawData::default(), DisplaySize::new(1.0, 1.0)),
            Err(RenderError::NotReady)
        ));
        assert!(matches!(r.set_font(&mut ctx, &[255; 4], 1, 1), Err(RenderError::NotReady)));
        assert!(matches!(r.recreate_font_texture(&mut ctx), Err(RenderError::NotReady)));

        r.shutdown();
    }

    // ── render ────────────────────────────────────────────────────────────

    #[test]
    fn render_records_display_size() {
        let (mut r, mut ctx) = renderer();
        r.render(&mut ctx, &DrawData::default(), DisplaySize::new(320.0, 200.0)).unwrap();
        assert_eq!(ctx.io.display_size, DisplaySize::new(320.0, 200.0));
    }

    #[test]
    fn zero_framebuffer_skips_frame() {
        let (mut r, mut ctx) = renderer();
        ctx.io.framebuffer_scale = FramebufferScale::uniform(0.0);
        r.device_mut().take_calls();

        let mut list = crate::DrawList::new();
        list.cmd_buffer.push(crate::DrawCmd::default());
        let stats = r
            .render(&mut ctx, &DrawData::new(vec![list]), DisplaySize::new(100.0, 100.0))
            .unwrap();

        assert_eq!(stats, FrameStats::default());
        assert!(r.device().calls().is_empty());
    }
}
