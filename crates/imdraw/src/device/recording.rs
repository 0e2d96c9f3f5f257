use std::collections::HashMap;

use crate::draw_data::TextureId;

use super::{
    BlendState, BufferId, BufferKind, Capability, Compiled, DeviceError, DrawIndexed, ProgramId,
    RenderDevice, ScissorRect, ShaderId, ShaderStage, TextureDesc, UniformLocation,
};

/// One call observed by a [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    CreateBuffer { buffer: BufferId, kind: BufferKind, size: u64 },
    ReallocateBuffer { buffer: BufferId, size: u64 },
    WriteBuffer { buffer: BufferId, len: u64 },
    DestroyBuffer(BufferId),
    CompileShader { shader: ShaderId, stage: ShaderStage, ok: bool },
    LinkProgram { program: ProgramId, ok: bool },
    DestroyShader(ShaderId),
    DestroyProgram(ProgramId),
    CreateTexture { texture: TextureId, desc: TextureDesc },
    DestroyTexture(TextureId),
    UseProgram(Option<ProgramId>),
    SetUniformMat4 { program: ProgramId, location: UniformLocation, value: [[f32; 4]; 4] },
    SetUniformSampler { program: ProgramId, location: UniformLocation, unit: u32 },
    SetCapability { capability: Capability, enabled: bool },
    SetBlendState(BlendState),
    BindVertexBuffer(Option<BufferId>),
    BindIndexBuffer(Option<BufferId>),
    BindTexture { unit: u32, texture: Option<TextureId> },
    SetScissor(ScissorRect),
    DrawIndexed(DrawIndexed),
}

/// Live buffer as seen by a [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedBuffer {
    pub kind: BufferKind,
    pub size: u64,
    pub contents: Vec<u8>,
}

/// Live texture as seen by a [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTexture {
    pub desc: TextureDesc,
    pub pixels: Vec<u8>,
}

#[derive(Debug)]
struct RecordedShader {
    stage: ShaderStage,
    source: String,
    ok: bool,
}

#[derive(Debug)]
struct RecordedProgram {
    linked: bool,
    sources: [String; 2],
}

/// In-memory [`RenderDevice`] that records every call.
///
/// Tracks live resources so leaks are observable, and supports failure
/// injection for shader compilation, linking and allocation.
///
/// Uniform lookup is textual: a name resolves when it occurs in one of the
/// program's stage sources. The location's `group` is the stage index
/// (0 = vertex, 1 = fragment) and `binding` is always 0.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    calls: Vec<DeviceCall>,
    next_id: u64,

    buffers: HashMap<BufferId, RecordedBuffer>,
    textures: HashMap<TextureId, RecordedTexture>,
    shaders: HashMap<ShaderId, RecordedShader>,
    programs: HashMap<ProgramId, RecordedProgram>,

    capabilities: HashMap<Capability, bool>,

    failing_stage: Option<ShaderStage>,
    failing_link: bool,
    allocation_limit: Option<u64>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every compile of `stage` fails with a synthetic info log.
    pub fn with_failing_shader(mut self, stage: ShaderStage) -> Self {
        self.failing_stage = Some(stage);
        self
    }

    /// Every link fails, even with valid stages.
    pub fn with_failing_link(mut self) -> Self {
        self.failing_link = true;
        self
    }

    /// Any single buffer or texture allocation above `bytes` fails with
    /// [`DeviceError::OutOfMemory`].
    pub fn with_allocation_limit(mut self, bytes: u64) -> Self {
        self.allocation_limit = Some(bytes);
        self
    }

    // ── inspection ────────────────────────────────────────────────────────

    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    /// Returns and forgets the calls recorded so far.
    pub fn take_calls(&mut self) -> Vec<DeviceCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn draws(&self) -> Vec<DrawIndexed> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DeviceCall::DrawIndexed(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    pub fn scissors(&self) -> Vec<ScissorRect> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DeviceCall::SetScissor(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    pub fn buffer(&self, id: BufferId) -> Option<&RecordedBuffer> {
        self.buffers.get(&id)
    }

    pub fn texture(&self, id: TextureId) -> Option<&RecordedTexture> {
        self.textures.get(&id)
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    /// Last value set for `capability`, if it was ever touched.
    pub fn capability(&self, capability: Capability) -> Option<bool> {
        self.capabilities.get(&capability).copied()
    }

    // ── helpers ───────────────────────────────────────────────────────────

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_allocation(&self, requested: u64) -> Result<(), DeviceError> {
        match self.allocation_limit {
            Some(limit) if requested > limit => Err(DeviceError::OutOfMemory { requested }),
            _ => Ok(()),
        }
    }
}

impl RenderDevice for RecordingDevice {
    fn create_buffer(&mut self, kind: BufferKind, size: u64) -> Result<BufferId, DeviceError> {
        self.check_allocation(size)?;
        let buffer = BufferId(self.next_id());
        self.buffers.insert(buffer, RecordedBuffer { kind, size, contents: Vec::new() });
        self.calls.push(DeviceCall::CreateBuffer { buffer, kind, size });
        Ok(buffer)
    }

    fn reallocate_buffer(&mut self, buffer: BufferId, size: u64) -> Result<(), DeviceError> {
        self.check_allocation(size)?;
        let entry = self
            .buffers
            .get_mut(&buffer)
            .ok_or(DeviceError::UnknownResource("buffer"))?;
        entry.size = size;
        entry.contents.clear();
        self.calls.push(DeviceCall::ReallocateBuffer { buffer, size });
        Ok(())
    }

    fn write_buffer(&mut self, buffer: BufferId, data: &[u8]) -> Result<(), DeviceError> {
        let entry = self
            .buffers
            .get_mut(&buffer)
            .ok_or(DeviceError::UnknownResource("buffer"))?;
        if data.len() as u64 > entry.size {
            return Err(DeviceError::WriteOverflow { len: data.len() as u64, size: entry.size });
        }
        if entry.contents.len() < data.len() {
            entry.contents.resize(data.len(), 0);
        }
        entry.contents[..data.len()].copy_from_slice(data);
        self.calls.push(DeviceCall::WriteBuffer { buffer, len: data.len() as u64 });
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
        self.calls.push(DeviceCall::DestroyBuffer(buffer));
    }

    fn compile_shader(&mut self, stage: ShaderStage, label: &str, source: &str) -> Compiled<ShaderId> {
        let shader = ShaderId(self.next_id());
        let ok = self.failing_stage != Some(stage);
        self.shaders.insert(shader, RecordedShader { stage, source: source.to_owned(), ok });
        self.calls.push(DeviceCall::CompileShader { shader, stage, ok });

        if ok {
            Compiled::ok(shader)
        } else {
            Compiled::failed(shader, format!("{label}: injected {stage:?} compile failure"))
        }
    }

    fn link_program(&mut self, label: &str, vertex: ShaderId, fragment: ShaderId) -> Compiled<ProgramId> {
        let program = ProgramId(self.next_id());

        let mut problems = Vec::new();
        let mut sources = [String::new(), String::new()];
        for (slot, (id, expected)) in [(vertex, ShaderStage::Vertex), (fragment, ShaderStage::Fragment)]
            .into_iter()
            .enumerate()
        {
            match self.shaders.get(&id) {
                Some(s) if s.stage == expected && s.ok => sources[slot] = s.source.clone(),
                Some(s) if s.stage != expected => problems.push(format!("{id:?} is not a {expected:?} stage")),
                Some(_) => problems.push(format!("{expected:?} stage did not compile")),
                None => problems.push(format!("unknown shader {id:?}")),
            }
        }
        if self.failing_link {
            problems.push("injected link failure".to_owned());
        }

        let linked = problems.is_empty();
        self.programs.insert(program, RecordedProgram { linked, sources });
        self.calls.push(DeviceCall::LinkProgram { program, ok: linked });

        if linked {
            Compiled::ok(program)
        } else {
            Compiled::failed(program, format!("{label}: {}", problems.join("; ")))
        }
    }

    fn destroy_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader);
        self.calls.push(DeviceCall::DestroyShader(shader));
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let p = self.programs.get(&program)?;
        if !p.linked {
            return None;
        }
        let group = p.sources.iter().position(|src| src.contains(name))? as u32;
        Some(UniformLocation { group, binding: 0 })
    }

    fn destroy_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        self.calls.push(DeviceCall::DestroyProgram(program));
    }

    fn create_texture(&mut self, desc: &TextureDesc, pixels: &[u8]) -> Result<TextureId, DeviceError> {
        if pixels.len() != desc.byte_len() {
            return Err(DeviceError::InvalidTextureData {
                expected: desc.byte_len(),
                actual: pixels.len(),
            });
        }
        self.check_allocation(pixels.len() as u64)?;

        let texture = TextureId(self.next_id());
        self.textures.insert(texture, RecordedTexture { desc: *desc, pixels: pixels.to_vec() });
        self.calls.push(DeviceCall::CreateTexture { texture, desc: *desc });
        Ok(texture)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        self.calls.push(DeviceCall::DestroyTexture(texture));
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.calls.push(DeviceCall::UseProgram(program));
    }

    fn set_uniform_mat4(&mut self, program: ProgramId, location: UniformLocation, value: &[[f32; 4]; 4]) {
        self.calls.push(DeviceCall::SetUniformMat4 { program, location, value: *value });
    }

    fn set_uniform_sampler(&mut self, program: ProgramId, location: UniformLocation, unit: u32) {
        self.calls.push(DeviceCall::SetUniformSampler { program, location, unit });
    }

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        self.capabilities.insert(capability, enabled);
        self.calls.push(DeviceCall::SetCapability { capability, enabled });
    }

    fn set_blend_state(&mut self, state: BlendState) {
        self.calls.push(DeviceCall::SetBlendState(state));
    }

    fn bind_vertex_buffer(&mut self, buffer: Option<BufferId>) {
        self.calls.push(DeviceCall::BindVertexBuffer(buffer));
    }

    fn bind_index_buffer(&mut self, buffer: Option<BufferId>) {
        self.calls.push(DeviceCall::BindIndexBuffer(buffer));
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        self.calls.push(DeviceCall::BindTexture { unit, texture });
    }

    fn set_scissor(&mut self, rect: ScissorRect) {
        self.calls.push(DeviceCall::SetScissor(rect));
    }

    fn draw_indexed(&mut self, draw: DrawIndexed) {
        self.calls.push(DeviceCall::DrawIndexed(draw));
    }
}
