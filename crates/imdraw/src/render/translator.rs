use crate::context::Io;
use crate::device::{BlendState, BufferKind, Capability, DrawIndexed, RenderDevice};
use crate::draw_data::{DrawData, DrawList};
use crate::error::RenderError;

use super::clip::{projection_matrix, scissor_rect};
use super::resources::DeviceResources;

/// Counters for one rendered frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_lists: usize,
    pub commands: usize,
    pub draw_calls: usize,
    pub vertices: usize,
    pub indices: usize,
    pub buffer_growths: usize,
}

/// Turns one frame of draw data into device calls.
///
/// Frame shape:
/// 1. grow buffers for the largest list, before any upload
/// 2. bind the program, projection and sampler unit
/// 3. blend on, scissor on, cull and depth off
/// 4. per list: upload geometry, then one indexed draw per command
/// 5. unbind and switch blend and scissor off
///
/// Device state from before the frame is not restored.
#[derive(Debug, Clone)]
pub struct DrawDataTranslator {
    texture_unit: u32,
}

impl DrawDataTranslator {
    pub fn new(texture_unit: u32) -> Self {
        Self { texture_unit }
    }

    pub fn texture_unit(&self) -> u32 {
        self.texture_unit
    }

    pub fn render(
        &self,
        device: &mut dyn RenderDevice,
        resources: &mut DeviceResources,
        io: &Io,
        draw_data: &DrawData,
    ) -> Result<FrameStats, RenderError> {
        if draw_data.is_empty() {
            return Ok(FrameStats::default());
        }

        let mut stats = FrameStats {
            draw_lists: draw_data.draw_lists.len(),
            vertices: draw_data.total_vtx_count(),
            indices: draw_data.total_idx_count(),
            ..FrameStats::default()
        };

        // ── 1. capacity ───────────────────────────────────────────────────
        for list in &draw_data.draw_lists {
            for (kind, bytes) in [
                (BufferKind::Vertex, list.vertex_bytes()),
                (BufferKind::Index, list.index_bytes()),
            ] {
                if resources.buffers.ensure_capacity(device, kind, bytes)? {
                    stats.buffer_growths += 1;
                }
            }
        }

        // ── 2. program ────────────────────────────────────────────────────
        let shader = &resources.shader;
        let program = shader.program();
        device.use_program(Some(program));
        if let Some(loc) = shader.projection_location() {
            device.set_uniform_mat4(program, loc, &projection_matrix(io.display_size));
        }
        if let Some(loc) = shader.font_texture_location() {
            device.set_uniform_sampler(program, loc, self.texture_unit);
        }

        // ── 3. fixed-function state ───────────────────────────────────────
        device.set_capability(Capability::Blend, true);
        device.set_blend_state(BlendState::ALPHA_OVER);
        device.set_capability(Capability::ScissorTest, true);
        device.set_capability(Capability::CullFace, false);
        device.set_capability(Capability::DepthTest, false);

        device.bind_vertex_buffer(Some(resources.buffers.buffer(BufferKind::Vertex).id()));
        device.bind_index_buffer(Some(resources.buffers.buffer(BufferKind::Index).id()));

        // ── 4. lists ──────────────────────────────────────────────────────
        let mut result = Ok(());
        for (list_idx, list) in draw_data.draw_lists.iter().enumerate() {
            result = self.draw_list(device, resources, io, list_idx, list, &mut stats);
            if result.is_err() {
                break;
            }
        }

        // ── 5. cleanup ────────────────────────────────────────────────────
        device.bind_vertex_buffer(None);
        device.bind_index_buffer(None);
        device.bind_texture(self.texture_unit, None);
        device.use_program(None);
        device.set_capability(Capability::Blend, false);
        device.set_capability(Capability::ScissorTest, false);

        result?;
        log::trace!(
            "frame: {} lists, {} cmds, {} draws, {} vtx, {} idx, {} growths",
            stats.draw_lists,
            stats.commands,
            stats.draw_calls,
            stats.vertices,
            stats.indices,
            stats.buffer_growths
        );
        Ok(stats)
    }

    fn draw_list(
        &self,
        device: &mut dyn RenderDevice,
        resources: &mut DeviceResources,
        io: &Io,
        list_idx: usize,
        list: &DrawList,
        stats: &mut FrameStats,
    ) -> Result<(), RenderError> {
        resources
            .buffers
            .upload(device, BufferKind::Vertex, bytemuck::cast_slice(&list.vtx_buffer))?;
        resources
            .buffers
            .upload(device, BufferKind::Index, bytemuck::cast_slice(&list.idx_buffer))?;

        let fb_height = io.display_size.scaled(io.framebuffer_scale).height;
        for (cmd_idx, cmd) in list.cmd_buffer.iter().enumerate() {
            stats.commands += 1;
            if cmd.user_callback.is_some() {
                return Err(RenderError::UnsupportedCallback {
                    list: list_idx,
                    command: cmd_idx,
                });
            }

            device.bind_texture(self.texture_unit, Some(cmd.texture_id));
            device.set_scissor(scissor_rect(cmd.clip_rect, fb_height, io.framebuffer_scale));

            let base_vertex = if io.renderer_has_vtx_offset {
                cmd.vtx_offset as i32
            } else {
                0
            };
            device.draw_indexed(DrawIndexed {
                element_count: cmd.elem_count,
                first_index: cmd.idx_offset,
                base_vertex,
            });
            stats.draw_calls += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RendererConfig;
    use crate::context::FontAtlas;
    use crate::coords::{ClipRect, DisplaySize, FramebufferScale, Vec2};
    use crate::device::{DeviceCall, RecordingDevice, ScissorRect};
    use crate::draw_data::{DrawCmd, TextureId, UserCallback};

    fn setup() -> (RecordingDevice, DeviceResources, Io) {
        let mut dev = RecordingDevice::new();
        let mut fonts = FontAtlas::default();
        let res = DeviceResources::create(&mut dev, &mut fonts, &RendererConfig::default()).unwrap();
        dev.take_calls();
        let io = Io {
            display_size: DisplaySize::new(800.0, 600.0),
            renderer_has_vtx_offset: true,
            ..Io::default()
        };
        (dev, res, io)
    }

    fn quad_list(offset: f32) -> DrawList {
        let mut list = DrawList::new();
        list.push_quad(
            Vec2::new(offset, offset),
            Vec2::new(offset + 10.0, offset + 10.0),
            Vec2::zero(),
            Vec2::new(1.0, 1.0),
            [255; 4],
            TextureId(1),
            ClipRect::new(0.0, 0.0, 100.0, 50.0),
        );
        list
    }

    // ── frame shape ───────────────────────────────────────────────────────

    #[test]
    fn empty_draw_data_touches_nothing() {
        let (mut dev, mut res, io) = setup();
        let stats = DrawDataTranslator::new(0)
            .render(&mut dev, &mut res, &io, &DrawData::default())
            .unwrap();

        assert_eq!(stats, FrameStats::default());
        assert!(dev.calls().is_empty());
    }

    #[test]
    fn uploads_precede_draws_of_each_list() {
        let (mut dev, mut res, io) = setup();
        let data = DrawData::new(vec![quad_list(0.0), quad_list(20.0)]);
        DrawDataTranslator::new(0).render(&mut dev, &mut res, &io, &data).unwrap();

        let shape: Vec<&str> = dev
            .calls()
            .iter()
            .filter_map(|c| match c {
                DeviceCall::WriteBuffer { .. } => Some("write"),
                DeviceCall::DrawIndexed(_) => Some("draw"),
                _ => None,
            })
            .collect();
        assert_eq!(shape, vec!["write", "write", "draw", "write", "write", "draw"]);
    }

    #[test]
    fn state_is_set_before_and_cleared_after() {
        let (mut dev, mut res, io) = setup();
        let data = DrawData::new(vec![quad_list(0.0)]);
        DrawDataTranslator::new(3).render(&mut dev, &mut res, &io, &data).unwrap();

        let calls = dev.calls();
        let program = res.shader().program();
        assert_eq!(calls.first(), Some(&DeviceCall::UseProgram(Some(program))));
        assert!(calls.contains(&DeviceCall::SetBlendState(BlendState::ALPHA_OVER)));
        assert!(calls.iter().any(|c| matches!(
            c,
            DeviceCall::SetUniformSampler { unit: 3, .. }
        )));
        assert!(calls.contains(&DeviceCall::BindTexture { unit: 3, texture: Some(TextureId(1)) }));
        assert!(calls.ends_with(&[
            DeviceCall::BindVertexBuffer(None),
            DeviceCall::BindIndexBuffer(None),
            DeviceCall::BindTexture { unit: 3, texture: None },
            DeviceCall::UseProgram(None),
            DeviceCall::SetCapability { capability: Capability::Blend, enabled: false },
            DeviceCall::SetCapability { capability: Capability::ScissorTest, enabled: false },
        ]));
        assert_eq!(dev.capability(Capability::CullFace), Some(false));
        assert_eq!(dev.capability(Capability::DepthTest), Some(false));
    }

    #[test]
    fn stats_count_the_frame() {
        let (mut dev, mut res, io) = setup();
        let data = DrawData::new(vec![quad_list(0.0), quad_list(20.0)]);
        let stats = DrawDataTranslator::new(0).render(&mut dev, &mut res, &io, &data).unwrap();

        assert_eq!(stats.draw_lists, 2);
        assert_eq!(stats.commands, 2);
        assert_eq!(stats.draw_calls, 2);
        assert_eq!(stats.vertices, 8);
        assert_eq!(stats.indices, 12);
        assert_eq!(stats.buffer_growths, 0);
    }

    // ── commands ──────────────────────────────────────────────────────────

    #[test]
    fn scissor_flips_against_device_height_on_hidpi() {
        let (mut dev, mut res, mut io) = setup();
        io.framebuffer_scale = FramebufferScale::uniform(2.0);
        DrawDataTranslator::new(0)
            .render(&mut dev, &mut res, &io, &DrawData::new(vec![quad_list(0.0)]))
            .unwrap();

        // clip (0,0)-(100,50) at 2x on a 600-high display: 1200 - 100
        assert_eq!(dev.scissors(), vec![ScissorRect::new(0, 1100, 200, 100)]);
    }

    #[test]
    fn offsets_are_forwarded_in_indices() {
        let (mut dev, mut res, io) = setup();
        let mut list = quad_list(0.0);
        list.push_quad(
            Vec2::new(50.0, 50.0),
            Vec2::new(60.0, 60.0),
            Vec2::zero(),
            Vec2::new(1.0, 1.0),
            [255; 4],
            TextureId(1),
            ClipRect::new(0.0, 0.0, 800.0, 600.0),
        );
        DrawDataTranslator::new(0)
            .render(&mut dev, &mut res, &io, &DrawData::new(vec![list]))
            .unwrap();

        let draws = dev.draws();
        assert_eq!(draws[1], DrawIndexed { element_count: 6, first_index: 6, base_vertex: 4 });
    }

    #[test]
    fn vertex_offset_is_dropped_without_backend_support() {
        let (mut dev, mut res, mut io) = setup();
        io.renderer_has_vtx_offset = false;
        let mut list = DrawList::new();
        list.cmd_buffer.push(
            DrawCmd::new(ClipRect::new(0.0, 0.0, 10.0, 10.0), TextureId(1), 0).with_offsets(0, 7),
        );
        DrawDataTranslator::new(0)
            .render(&mut dev, &mut res, &io, &DrawData::new(vec![list]))
            .unwrap();

        assert_eq!(dev.draws()[0].base_vertex, 0);
    }

    #[test]
    fn inverted_clip_still_draws() {
        let (mut dev, mut res, io) = setup();
        let mut list = DrawList::new();
        list.cmd_buffer
            .push(DrawCmd::new(ClipRect::new(50.0, 0.0, 10.0, 10.0), TextureId(1), 0));
        DrawDataTranslator::new(0)
            .render(&mut dev, &mut res, &io, &DrawData::new(vec![list]))
            .unwrap();

        assert_eq!(dev.scissors(), vec![ScissorRect::new(50, 590, -40, 10)]);
        assert_eq!(dev.draws().len(), 1);
    }

    #[test]
    fn callback_stops_the_frame_but_cleans_up() {
        let (mut dev, mut res, io) = setup();
        let mut list = quad_list(0.0);
        list.cmd_buffer.push(
            DrawCmd::new(ClipRect::new(0.0, 0.0, 1.0, 1.0), TextureId(1), 0)
                .with_callback(UserCallback(9)),
        );
        let data = DrawData::new(vec![list, quad_list(20.0)]);

        let err = DrawDataTranslator::new(0).render(&mut dev, &mut res, &io, &data).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedCallback { list: 0, command: 1 }));
        assert_eq!(dev.draws().len(), 1);
        assert_eq!(dev.calls().last(), Some(&DeviceCall::SetCapability {
            capability: Capability::ScissorTest,
            enabled: false,
        }));
    }

    // ── growth ────────────────────────────────────────────────────────────

    #[test]
    fn large_list_grows_buffers_before_upload() {
        let (mut dev, mut res, io) = setup();
        let mut list = DrawList::new();
        for i in 0..600 {
            let o = i as f32;
            list.push_quad(
                Vec2::new(o, o),
                Vec2::new(o + 1.0, o + 1.0),
                Vec2::zero(),
                Vec2::zero(),
                [255; 4],
                TextureId(1),
                ClipRect::new(0.0, 0.0, 800.0, 600.0),
            );
        }
        // 3600 indices * 2 bytes > 4000 byte default
        let stats = DrawDataTranslator::new(0)
            .render(&mut dev, &mut res, &io, &DrawData::new(vec![list]))
            .unwrap();

        assert_eq!(stats.buffer_growths, 1);
        assert_eq!(res.buffers().capacity(BufferKind::Index), 7200);

        let first_realloc = dev
            .calls()
            .iter()
            .position(|c| matches!(c, DeviceCall::ReallocateBuffer { .. }));
        let first_write = dev
            .calls()
            .iter()
            .position(|c| matches!(c, DeviceCall::WriteBuffer { .. }));
        assert!(first_realloc < first_write);
    }
}
