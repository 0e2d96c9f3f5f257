use std::borrow::Cow;
use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::draw_data::{TextureId, Vertex};

use super::{
    BlendFactor, BlendOp, BlendState, BufferId, BufferKind, Capability, Compiled, DeviceError,
    DrawIndexed, FilterMode, ProgramId, RenderDevice, ScissorRect, ShaderId, ShaderStage,
    TextureDesc, UniformLocation, WrapMode,
};

// ── binding model ─────────────────────────────────────────────────────────
//
// Every program shares one pipeline layout:
//   group 0  binding 0  uniform mat4x4<f32>          (vertex)
//   group 1  binding 0  texture_2d<f32>              (fragment)
//   group 1  binding 1  sampler                      (fragment)

const MATRIX_SLOT: UniformLocation = UniformLocation { group: 0, binding: 0 };
const TEXTURE_SLOT: UniformLocation = UniformLocation { group: 1, binding: 0 };
const SAMPLER_SLOT: UniformLocation = UniformLocation { group: 1, binding: 1 };

const MATRIX_BYTES: u64 = 64;

const VERTEX_ENTRY: &str = "vs_main";
const FRAGMENT_ENTRY: &str = "fs_main";

/// Highest vertex input location fed by [`Vertex::layout`].
const MAX_VERTEX_LOCATION: u32 = 2;

// ── resources ─────────────────────────────────────────────────────────────

struct BufferEntry {
    kind: BufferKind,
    size: u64,
    buffer: wgpu::Buffer,
}

struct TextureEntry {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// Reflected resource binding of a shader stage.
#[derive(Debug, Clone)]
struct Binding {
    name: String,
    location: UniformLocation,
}

struct ShaderEntry {
    stage: ShaderStage,
    /// `None` when the stage failed validation.
    module: Option<wgpu::ShaderModule>,
    bindings: Vec<Binding>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    blend: Option<BlendState>,
    cull: bool,
}

struct LinkedProgram {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    bindings: Vec<Binding>,
    matrix_buffer: wgpu::Buffer,
    matrix_bind_group: wgpu::BindGroup,
    sampler_unit: u32,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

struct ProgramEntry {
    label: String,
    /// `None` when linking failed.
    linked: Option<LinkedProgram>,
    warned: bool,
}

// ── frame state ───────────────────────────────────────────────────────────

struct Frame {
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    encoder: wgpu::CommandEncoder,
}

/// Draw captured with all state resolved, replayed on the next flush.
struct PendingDraw {
    pipeline: wgpu::RenderPipeline,
    matrix_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    scissor: (u32, u32, u32, u32),
    draw: DrawIndexed,
}

#[derive(Debug, Default)]
struct PipelineState {
    program: Option<ProgramId>,
    blend: bool,
    scissor_test: bool,
    cull: bool,
    blend_state: Option<BlendState>,
    vertex_buffer: Option<BufferId>,
    index_buffer: Option<BufferId>,
    texture_units: HashMap<u32, TextureId>,
    scissor: ScissorRect,
}

/// [`RenderDevice`] on top of wgpu.
///
/// wgpu has no immediate mode, so the device keeps the bound state itself and
/// turns each `draw_indexed` into a recorded draw. Recorded draws are replayed
/// into a render pass (`LoadOp::Load`) whenever a buffer or uniform is about to
/// change and at the end of the frame. Uploads made while a frame is open are
/// staged through the frame encoder so they land between the draws that
/// precede and follow them.
///
/// Shader sources are WGSL. Each stage is validated and reflected with naga
/// before wgpu sees it; a stage that fails yields a nonfunctional handle and
/// an info log instead of a device error. Draws issued with a nonfunctional
/// program are skipped.
///
/// Scissors arrive with a bottom-left origin and are flipped against the frame
/// height. A scissor that clips everything skips the draw. The depth test
/// toggle is accepted and ignored (no depth attachment).
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,

    matrix_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,

    next_id: u64,
    buffers: HashMap<BufferId, BufferEntry>,
    textures: HashMap<TextureId, TextureEntry>,
    shaders: HashMap<ShaderId, ShaderEntry>,
    programs: HashMap<ProgramId, ProgramEntry>,

    state: PipelineState,
    frame: Option<Frame>,
    pending: Vec<PendingDraw>,
    warned_no_frame: bool,
}

impl WgpuDevice {
    /// Creates a device rendering into targets of `format`.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let matrix_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("imdraw matrix bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: MATRIX_SLOT.binding,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(MATRIX_BYTES),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("imdraw texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: TEXTURE_SLOT.binding,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: SAMPLER_SLOT.binding,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("imdraw pipeline layout"),
            bind_group_layouts: &[&matrix_layout, &texture_layout],
            immediate_size: 0,
        });

        Self {
            device,
            queue,
            format,
            matrix_layout,
            texture_layout,
            pipeline_layout,
            next_id: 0,
            buffers: HashMap::new(),
            textures: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            state: PipelineState::default(),
            frame: None,
            pending: Vec::new(),
            warned_no_frame: false,
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Opens a frame targeting `view` (`width` x `height` device pixels).
    ///
    /// A frame left open from before is discarded.
    pub fn begin_frame(&mut self, view: &wgpu::TextureView, width: u32, height: u32) {
        if self.frame.is_some() {
            log::warn!("WgpuDevice: begin_frame while a frame is open; discarding it");
            self.pending.clear();
        }

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("imdraw frame encoder"),
            });

        self.frame = Some(Frame {
            view: view.clone(),
            width,
            height,
            encoder,
        });
    }

    /// Closes the frame and returns its commands, ready to submit.
    ///
    /// Returns `None` when no frame is open.
    pub fn end_frame(&mut self) -> Option<wgpu::CommandBuffer> {
        self.flush();
        let frame = self.frame.take()?;
        Some(frame.encoder.finish())
    }

    pub fn is_frame_open(&self) -> bool {
        self.frame.is_some()
    }

    /// Replays recorded draws into a load/store render pass.
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let draws = std::mem::take(&mut self.pending);
        let Some(frame) = self.frame.as_mut() else { return; };

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("imdraw ui pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for d in &draws {
            let (x, y, w, h) = d.scissor;
            let first = d.draw.first_index;
            rpass.set_pipeline(&d.pipeline);
            rpass.set_bind_group(0, &d.matrix_bind_group, &[]);
            rpass.set_bind_group(1, &d.texture_bind_group, &[]);
            rpass.set_vertex_buffer(0, d.vertex_buffer.slice(..));
            rpass.set_index_buffer(d.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            rpass.set_scissor_rect(x, y, w, h);
            rpass.draw_indexed(first..first + d.draw.element_count, d.draw.base_vertex, 0..1);
        }
    }

    // ── helpers ───────────────────────────────────────────────────────────

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn allocate(&self, kind: BufferKind, size: u64) -> Result<wgpu::Buffer, DeviceError> {
        let padded = align_to_copy(size).max(wgpu::COPY_BUFFER_ALIGNMENT);
        if padded > self.device.limits().max_buffer_size {
            return Err(DeviceError::OutOfMemory { requested: size });
        }
        let (label, usage) = match kind {
            BufferKind::Vertex => ("imdraw vertex buffer", wgpu::BufferUsages::VERTEX),
            BufferKind::Index => ("imdraw index buffer", wgpu::BufferUsages::INDEX),
        };
        Ok(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: padded,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }))
    }

    /// Writes `data` at offset 0 of `dst`, ordered after every draw recorded so far.
    fn upload(&mut self, dst: &wgpu::Buffer, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.flush();
        let data = pad_to_copy(data);

        match self.frame.as_mut() {
            Some(frame) => {
                let staging = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("imdraw staging"),
                    contents: &data,
                    usage: wgpu::BufferUsages::COPY_SRC,
                });
                frame
                    .encoder
                    .copy_buffer_to_buffer(&staging, 0, dst, 0, data.len() as u64);
            }
            None => self.queue.write_buffer(dst, 0, &data),
        }
    }

    fn create_pipeline(
        &self,
        label: &str,
        program: &LinkedProgram,
        key: PipelineKey,
    ) -> wgpu::RenderPipeline {
        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &program.vertex,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &program.fragment,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: key.blend.map(to_wgpu_blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: key.cull.then_some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    /// Resolves the current state into a replayable draw, or explains why not.
    fn resolve_draw(&mut self, draw: DrawIndexed) -> Result<Option<PendingDraw>, &'static str> {
        let Some(frame) = self.frame.as_ref() else {
            return Err("draw outside begin_frame/end_frame");
        };

        let scissor = if self.state.scissor_test {
            scissor_to_target(self.state.scissor, frame.width, frame.height)
        } else {
            full_target(frame.width, frame.height)
        };
        let Some(scissor) = scissor else {
            return Ok(None);
        };

        let program_id = self.state.program.ok_or("no program in use")?;
        let vertex_buffer = self
            .state
            .vertex_buffer
            .and_then(|id| self.buffers.get(&id))
            .ok_or("no vertex buffer bound")?
            .buffer
            .clone();
        let index_buffer = self
            .state
            .index_buffer
            .and_then(|id| self.buffers.get(&id))
            .ok_or("no index buffer bound")?
            .buffer
            .clone();

        let key = PipelineKey {
            blend: if self.state.blend {
                Some(self.state.blend_state.unwrap_or(BlendState::ALPHA_OVER))
            } else {
                None
            },
            cull: self.state.cull,
        };

        let entry = self.programs.get(&program_id).ok_or("unknown program")?;
        let linked = entry.linked.as_ref().ok_or("program did not link")?;
        let texture_bind_group = self
            .state
            .texture_units
            .get(&linked.sampler_unit)
            .and_then(|id| self.textures.get(id))
            .ok_or("no texture bound to the program's sampler unit")?
            .bind_group
            .clone();
        let matrix_bind_group = linked.matrix_bind_group.clone();

        let pipeline = match linked.pipelines.get(&key).cloned() {
            Some(p) => p,
            None => {
                let p = self.create_pipeline(&format!("{} pipeline", entry.label), linked, key);
                log::debug!("WgpuDevice: built pipeline {key:?} for '{}'", entry.label);
                if let Some(linked) = self
                    .programs
                    .get_mut(&program_id)
                    .and_then(|e| e.linked.as_mut())
                {
                    linked.pipelines.insert(key, p.clone());
                }
                p
            }
        };

        Ok(Some(PendingDraw {
            pipeline,
            matrix_bind_group,
            texture_bind_group,
            vertex_buffer,
            index_buffer,
            scissor,
            draw,
        }))
    }
}

impl RenderDevice for WgpuDevice {
    fn create_buffer(&mut self, kind: BufferKind, size: u64) -> Result<BufferId, DeviceError> {
        let buffer = self.allocate(kind, size)?;
        let id = BufferId(self.next_id());
        self.buffers.insert(id, BufferEntry { kind, size, buffer });
        Ok(id)
    }

    fn reallocate_buffer(&mut self, buffer: BufferId, size: u64) -> Result<(), DeviceError> {
        let kind = self
            .buffers
            .get(&buffer)
            .ok_or(DeviceError::UnknownResource("buffer"))?
            .kind;
        self.flush();
        let fresh = self.allocate(kind, size)?;
        if let Some(entry) = self.buffers.get_mut(&buffer) {
            entry.size = size;
            entry.buffer = fresh;
        }
        Ok(())
    }

    fn write_buffer(&mut self, buffer: BufferId, data: &[u8]) -> Result<(), DeviceError> {
        let entry = self
            .buffers
            .get(&buffer)
            .ok_or(DeviceError::UnknownResource("buffer"))?;
        if data.len() as u64 > entry.size {
            return Err(DeviceError::WriteOverflow { len: data.len() as u64, size: entry.size });
        }
        let dst = entry.buffer.clone();
        self.upload(&dst, data);
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        // Recorded draws hold their own references; dropping ours is enough.
        self.buffers.remove(&buffer);
    }

    fn compile_shader(&mut self, stage: ShaderStage, label: &str, source: &str) -> Compiled<ShaderId> {
        let id = ShaderId(self.next_id());

        match reflect_wgsl(stage, source) {
            Ok(bindings) => {
                let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(label),
                    source: wgpu::ShaderSource::Wgsl(Cow::Owned(source.to_owned())),
                });
                self.shaders.insert(id, ShaderEntry { stage, module: Some(module), bindings });
                Compiled::ok(id)
            }
            Err(info) => {
                self.shaders.insert(id, ShaderEntry { stage, module: None, bindings: Vec::new() });
                Compiled::failed(id, info)
            }
        }
    }

    fn link_program(&mut self, label: &str, vertex: ShaderId, fragment: ShaderId) -> Compiled<ProgramId> {
        let id = ProgramId(self.next_id());

        let stage_module = |shader: ShaderId, expected: ShaderStage| -> Result<(wgpu::ShaderModule, Vec<Binding>), String> {
            let entry = self
                .shaders
                .get(&shader)
                .ok_or_else(|| format!("unknown shader {shader:?}"))?;
            if entry.stage != expected {
                return Err(format!("{shader:?} is a {:?} stage, expected {expected:?}", entry.stage));
            }
            let module = entry
                .module
                .clone()
                .ok_or_else(|| format!("{expected:?} stage did not compile"))?;
            Ok((module, entry.bindings.clone()))
        };

        let linked = stage_module(vertex, ShaderStage::Vertex).and_then(|(vs, mut bindings)| {
            let (fs, fs_bindings) = stage_module(fragment, ShaderStage::Fragment)?;
            for b in fs_bindings {
                match bindings.iter().find(|o| o.location == b.location) {
                    Some(o) if o.name != b.name => {
                        return Err(format!(
                            "'{}' and '{}' share group {} binding {}",
                            o.name, b.name, b.location.group, b.location.binding
                        ));
                    }
                    Some(_) => {}
                    None => bindings.push(b),
                }
            }
            Ok((vs, fs, bindings))
        });

        match linked {
            Ok((vertex, fragment, bindings)) => {
                let matrix_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("imdraw matrix ubo"),
                    size: MATRIX_BYTES,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let matrix_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("imdraw matrix bind group"),
                    layout: &self.matrix_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: MATRIX_SLOT.binding,
                        resource: matrix_buffer.as_entire_binding(),
                    }],
                });

                self.programs.insert(
                    id,
                    ProgramEntry {
                        label: label.to_owned(),
                        linked: Some(LinkedProgram {
                            vertex,
                            fragment,
                            bindings,
                            matrix_buffer,
                            matrix_bind_group,
                            sampler_unit: 0,
                            pipelines: HashMap::new(),
                        }),
                        warned: false,
                    },
                );
                Compiled::ok(id)
            }
            Err(info) => {
                self.programs.insert(
                    id,
                    ProgramEntry { label: label.to_owned(), linked: None, warned: false },
                );
                Compiled::failed(id, format!("{label}: {info}"))
            }
        }
    }

    fn destroy_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader);
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.programs
            .get(&program)?
            .linked
            .as_ref()?
            .bindings
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.location)
    }

    fn destroy_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        if self.state.program == Some(program) {
            self.state.program = None;
        }
    }

    fn create_texture(&mut self, desc: &TextureDesc, pixels: &[u8]) -> Result<TextureId, DeviceError> {
        if pixels.len() != desc.byte_len() {
            return Err(DeviceError::InvalidTextureData {
                expected: desc.byte_len(),
                actual: pixels.len(),
            });
        }
        let limit = self.device.limits().max_texture_dimension_2d;
        if desc.width == 0 || desc.height == 0 || desc.width > limit || desc.height > limit {
            return Err(DeviceError::TextureTooLarge {
                width: desc.width,
                height: desc.height,
                limit,
            });
        }

        let size = wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("imdraw texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(desc.width * 4),
                rows_per_image: Some(desc.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let address_mode = to_wgpu_wrap(desc.wrap);
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("imdraw sampler"),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: to_wgpu_filter(desc.mag_filter),
            min_filter: to_wgpu_filter(desc.min_filter),
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("imdraw texture bind group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: TEXTURE_SLOT.binding,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: SAMPLER_SLOT.binding,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let id = TextureId(self.next_id());
        self.textures.insert(id, TextureEntry { _texture: texture, bind_group });
        Ok(id)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        self.state.texture_units.retain(|_, bound| *bound != texture);
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.state.program = program;
    }

    fn set_uniform_mat4(&mut self, program: ProgramId, location: UniformLocation, value: &[[f32; 4]; 4]) {
        if location != MATRIX_SLOT {
            log::debug!("WgpuDevice: no mat4 uniform at {location:?}; ignored");
            return;
        }
        let Some(buffer) = self
            .programs
            .get(&program)
            .and_then(|e| e.linked.as_ref())
            .map(|l| l.matrix_buffer.clone())
        else {
            return;
        };
        self.upload(&buffer, bytemuck::cast_slice(value));
    }

    fn set_uniform_sampler(&mut self, program: ProgramId, location: UniformLocation, unit: u32) {
        if location != TEXTURE_SLOT && location != SAMPLER_SLOT {
            log::debug!("WgpuDevice: no sampler uniform at {location:?}; ignored");
            return;
        }
        if let Some(linked) = self.programs.get_mut(&program).and_then(|e| e.linked.as_mut()) {
            linked.sampler_unit = unit;
        }
    }

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        match capability {
            Capability::Blend => self.state.blend = enabled,
            Capability::ScissorTest => self.state.scissor_test = enabled,
            Capability::CullFace => self.state.cull = enabled,
            Capability::DepthTest => {}
        }
    }

    fn set_blend_state(&mut self, state: BlendState) {
        self.state.blend_state = Some(state);
    }

    fn bind_vertex_buffer(&mut self, buffer: Option<BufferId>) {
        self.state.vertex_buffer = buffer;
    }

    fn bind_index_buffer(&mut self, buffer: Option<BufferId>) {
        self.state.index_buffer = buffer;
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        match texture {
            Some(t) => self.state.texture_units.insert(unit, t),
            None => self.state.texture_units.remove(&unit),
        };
    }

    fn set_scissor(&mut self, rect: ScissorRect) {
        self.state.scissor = rect;
    }

    fn draw_indexed(&mut self, draw: DrawIndexed) {
        if draw.element_count == 0 {
            return;
        }
        match self.resolve_draw(draw) {
            Ok(Some(pending)) => self.pending.push(pending),
            Ok(None) => {}
            Err(reason) => {
                if self.frame.is_none() {
                    if !self.warned_no_frame {
                        log::warn!("WgpuDevice: {reason}; skipped");
                        self.warned_no_frame = true;
                    }
                    return;
                }
                let program = self.state.program.and_then(|p| self.programs.get_mut(&p));
                match program {
                    Some(entry) if !entry.warned => {
                        log::warn!("WgpuDevice: '{}': {reason}; draws skipped", entry.label);
                        entry.warned = true;
                    }
                    Some(_) => {}
                    None => log::debug!("WgpuDevice: {reason}; skipped"),
                }
            }
        }
    }
}

// ── shader reflection ─────────────────────────────────────────────────────

/// Validates a WGSL stage and lists its resource bindings.
///
/// Besides naga validation, the stage must expose the expected entry point,
/// read no vertex inputs past [`MAX_VERTEX_LOCATION`], and declare only
/// bindings that fit the shared pipeline layout.
fn reflect_wgsl(stage: ShaderStage, source: &str) -> Result<Vec<Binding>, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| format!("WGSL parse error: {e}"))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("validation error: {e}"))?;

    let (entry_name, naga_stage) = match stage {
        ShaderStage::Vertex => (VERTEX_ENTRY, naga::ShaderStage::Vertex),
        ShaderStage::Fragment => (FRAGMENT_ENTRY, naga::ShaderStage::Fragment),
    };
    let entry = module
        .entry_points
        .iter()
        .find(|ep| ep.name == entry_name && ep.stage == naga_stage)
        .ok_or_else(|| format!("missing {stage:?} entry point '{entry_name}'"))?;

    if stage == ShaderStage::Vertex {
        for arg in &entry.function.arguments {
            let locations: Vec<Option<&naga::Binding>> = match (&arg.binding, &module.types[arg.ty].inner) {
                (Some(b), _) => vec![Some(b)],
                (None, naga::TypeInner::Struct { members, .. }) => {
                    members.iter().map(|m| m.binding.as_ref()).collect()
                }
                (None, _) => vec![None],
            };
            for b in locations.into_iter().flatten() {
                if let naga::Binding::Location { location, .. } = b {
                    if *location > MAX_VERTEX_LOCATION {
                        return Err(format!("vertex input @location({location}) is not provided"));
                    }
                }
            }
        }
    }

    let mut bindings = Vec::new();
    for (_, var) in module.global_variables.iter() {
        let Some(rb) = var.binding.as_ref() else { continue; };
        let location = UniformLocation { group: rb.group, binding: rb.binding };
        let name = var.name.clone().unwrap_or_default();
        let inner = &module.types[var.ty].inner;

        let fits = match location {
            MATRIX_SLOT => {
                matches!(var.space, naga::AddressSpace::Uniform)
                    && matches!(
                        inner,
                        naga::TypeInner::Matrix {
                            columns: naga::VectorSize::Quad,
                            rows: naga::VectorSize::Quad,
                            ..
                        }
                    )
            }
            TEXTURE_SLOT => matches!(inner, naga::TypeInner::Image { .. }),
            SAMPLER_SLOT => matches!(inner, naga::TypeInner::Sampler { comparison: false }),
            _ => false,
        };
        if !fits {
            return Err(format!(
                "'{name}' at group {} binding {} does not match the renderer's binding layout",
                rb.group, rb.binding
            ));
        }
        bindings.push(Binding { name, location });
    }

    Ok(bindings)
}

// ── conversions ───────────────────────────────────────────────────────────

/// Flips a bottom-left scissor into wgpu's top-left space and clamps it to the
/// target. `None` when nothing remains.
fn scissor_to_target(rect: ScissorRect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let (w, h) = (width as i64, height as i64);
    let x0 = (rect.x as i64).clamp(0, w);
    let x1 = (rect.x as i64 + rect.width as i64).clamp(0, w);
    let y0 = (h - (rect.y as i64 + rect.height as i64)).clamp(0, h);
    let y1 = (h - rect.y as i64).clamp(0, h);

    if x1 <= x0 || y1 <= y0 {
        None
    } else {
        Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
    }
}

fn full_target(width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    if width == 0 || height == 0 { None } else { Some((0, 0, width, height)) }
}

fn align_to_copy(size: u64) -> u64 {
    size.div_ceil(wgpu::COPY_BUFFER_ALIGNMENT) * wgpu::COPY_BUFFER_ALIGNMENT
}

/// Zero-pads `data` to a multiple of the copy alignment.
fn pad_to_copy(data: &[u8]) -> Cow<'_, [u8]> {
    let len = align_to_copy(data.len() as u64) as usize;
    if len == data.len() {
        Cow::Borrowed(data)
    } else {
        let mut padded = Vec::with_capacity(len);
        padded.extend_from_slice(data);
        padded.resize(len, 0);
        Cow::Owned(padded)
    }
}

fn to_wgpu_blend(state: BlendState) -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: to_wgpu_factor(state.src),
        dst_factor: to_wgpu_factor(state.dst),
        operation: match state.op {
            BlendOp::Add => wgpu::BlendOperation::Add,
        },
    };
    wgpu::BlendState { color: component, alpha: component }
}

fn to_wgpu_factor(factor: BlendFactor) -> wgpu::BlendFactor {
    match factor {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
    }
}

fn to_wgpu_wrap(mode: WrapMode) -> wgpu::AddressMode {
    match mode {
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
        WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    }
}

fn to_wgpu_filter(mode: FilterMode) -> wgpu::FilterMode {
    match mode {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── scissor ───────────────────────────────────────────────────────────

    #[test]
    fn scissor_flips_to_top_left() {
        // 100x50 at bottom-left (10, 20) on a 200x100 target
        let r = scissor_to_target(ScissorRect::new(10, 20, 100, 50), 200, 100);
        assert_eq!(r, Some((10, 30, 100, 50)));
    }

    #[test]
    fn scissor_clamps_to_target() {
        let r = scissor_to_target(ScissorRect::new(-10, -10, 50, 50), 30, 30);
        assert_eq!(r, Some((0, 0, 30, 30)));
    }

    #[test]
    fn empty_scissor_is_none() {
        assert_eq!(scissor_to_target(ScissorRect::new(5, 5, 0, 10), 100, 100), None);
        assert_eq!(scissor_to_target(ScissorRect::new(5, 5, 10, -3), 100, 100), None);
        assert_eq!(scissor_to_target(ScissorRect::new(200, 0, 10, 10), 100, 100), None);
    }

    #[test]
    fn full_target_rejects_zero_size() {
        assert_eq!(full_target(0, 10), None);
        assert_eq!(full_target(4, 3), Some((0, 0, 4, 3)));
    }

    // ── padding ───────────────────────────────────────────────────────────

    #[test]
    fn odd_index_data_is_padded() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let padded = pad_to_copy(&data);
        assert_eq!(&*padded, &[1, 2, 3, 4, 5, 6, 0, 0]);
        assert!(matches!(pad_to_copy(&[0u8; 8]), Cow::Borrowed(_)));
    }

    #[test]
    fn sizes_align_up_to_four() {
        assert_eq!(align_to_copy(0), 0);
        assert_eq!(align_to_copy(1), 4);
        assert_eq!(align_to_copy(4000), 4000);
        assert_eq!(align_to_copy(4002), 4004);
    }

    // ── blend ─────────────────────────────────────────────────────────────

    #[test]
    fn alpha_over_applies_to_color_and_alpha() {
        let b = to_wgpu_blend(BlendState::ALPHA_OVER);
        assert_eq!(b.color, b.alpha);
        assert_eq!(b.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(b.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        assert_eq!(b.color.operation, wgpu::BlendOperation::Add);
    }

    // ── reflection ────────────────────────────────────────────────────────

    const VS: &str = include_str!("../render/shaders/ui.vert.wgsl");
    const FS: &str = include_str!("../render/shaders/ui.frag.wgsl");

    #[test]
    fn builtin_stages_reflect_their_bindings() {
        let vs = reflect_wgsl(ShaderStage::Vertex, VS).unwrap();
        assert_eq!(vs.len(), 1);
        assert_eq!(vs[0].name, "projection_matrix");
        assert_eq!(vs[0].location, MATRIX_SLOT);

        let fs = reflect_wgsl(ShaderStage::Fragment, FS).unwrap();
        let names: Vec<&str> = fs.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["font_texture", "font_sampler"]);
    }

    #[test]
    fn syntax_errors_produce_a_log() {
        let err = reflect_wgsl(ShaderStage::Vertex, "fn vs_main( {").unwrap_err();
        assert!(err.contains("parse error"));
    }

    #[test]
    fn wrong_stage_misses_entry_point() {
        let err = reflect_wgsl(ShaderStage::Fragment, VS).unwrap_err();
        assert!(err.contains("fs_main"));
    }

    #[test]
    fn foreign_bindings_are_rejected() {
        let src = r#"
            @group(2) @binding(0) var<uniform> extra: vec4<f32>;
            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return extra;
            }
        "#;
        let err = reflect_wgsl(ShaderStage::Fragment, src).unwrap_err();
        assert!(err.contains("extra"));
    }
}
