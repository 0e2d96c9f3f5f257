//! Device seam between the renderer and a graphics API.
//!
//! The renderer components never talk to a graphics API directly. They drive a
//! [`RenderDevice`], whose vocabulary is small: buffers, shader
//! stages and programs, textures, a handful of pipeline toggles, scissor and
//! indexed draws. Conventions follow the classic immediate GL model:
//!
//! - state set on the device (program, buffers, textures, toggles, scissor)
//!   stays in effect until changed
//! - scissor rectangles use a bottom-left origin, in device pixels
//! - index offsets and counts are in indices, not bytes
//!
//! Implementations:
//! - [`WgpuDevice`]: production device on top of wgpu
//! - [`RecordingDevice`]: in-memory device that records every call (tests,
//!   headless verification)

mod error;
mod gpu;
mod recording;
mod wgpu_device;

pub use error::DeviceError;
pub use gpu::{Gpu, GpuInit, OffscreenTarget};
pub use recording::{DeviceCall, RecordedBuffer, RecordedTexture, RecordingDevice};
pub use wgpu_device::WgpuDevice;

use crate::draw_data::TextureId;

/// Handle to a device buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BufferId(pub u64);

/// Handle to a compiled shader stage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u64);

/// Handle to a linked program.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u64);

/// Resolved uniform slot inside a program.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Fixed-function toggles the renderer flips around its draws.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    Blend,
    ScissorTest,
    CullFace,
    DepthTest,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendOp {
    Add,
}

/// Blend equation applied to color and alpha alike.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BlendState {
    pub src: BlendFactor,
    pub dst: BlendFactor,
    pub op: BlendOp,
}

impl BlendState {
    /// Straight-alpha "over": `src * a + dst * (1 - a)`.
    pub const ALPHA_OVER: Self = Self {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::OneMinusSrcAlpha,
        op: BlendOp::Add,
    };
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Description of an RGBA8 2D texture and its sampler state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub wrap: WrapMode,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
}

impl TextureDesc {
    /// Repeat wrap, linear filtering on both axes.
    pub const fn font_atlas(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            wrap: WrapMode::Repeat,
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
        }
    }

    /// Byte length of a tightly packed RGBA8 image of this size.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Scissor rectangle in device pixels, bottom-left origin.
///
/// Width/height may be zero or negative; such a scissor rejects every fragment.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScissorRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScissorRect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

/// Indexed triangle-list draw over the bound vertex/index buffers.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct DrawIndexed {
    pub element_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
}

/// Result of a shader compile or program link.
///
/// A handle is always produced. `info_log` is `Some` when the step failed; the
/// handle is then nonfunctional but still valid to pass around and destroy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled<T> {
    pub handle: T,
    pub info_log: Option<String>,
}

impl<T> Compiled<T> {
    #[inline]
    pub fn ok(handle: T) -> Self {
        Self { handle, info_log: None }
    }

    #[inline]
    pub fn failed(handle: T, info_log: impl Into<String>) -> Self {
        Self { handle, info_log: Some(info_log.into()) }
    }

    #[inline]
    pub fn succeeded(&self) -> bool {
        self.info_log.is_none()
    }
}

/// Operations the renderer needs from a graphics device.
///
/// Calls are issued from a single thread in the order they must take effect.
pub trait RenderDevice {
    // ── buffers ───────────────────────────────────────────────────────────

    /// Allocates a buffer of `size` bytes with undefined contents.
    fn create_buffer(&mut self, kind: BufferKind, size: u64) -> Result<BufferId, DeviceError>;

    /// Replaces the buffer's storage with `size` bytes. Old contents are lost.
    fn reallocate_buffer(&mut self, buffer: BufferId, size: u64) -> Result<(), DeviceError>;

    /// Copies `data` to the start of the buffer.
    fn write_buffer(&mut self, buffer: BufferId, data: &[u8]) -> Result<(), DeviceError>;

    fn destroy_buffer(&mut self, buffer: BufferId);

    // ── shaders ───────────────────────────────────────────────────────────

    fn compile_shader(&mut self, stage: ShaderStage, label: &str, source: &str) -> Compiled<ShaderId>;

    fn link_program(&mut self, label: &str, vertex: ShaderId, fragment: ShaderId) -> Compiled<ProgramId>;

    /// Releases a stage object. Programs linked from it stay usable.
    fn destroy_shader(&mut self, shader: ShaderId);

    /// Looks up a uniform by name. `None` when absent or the program did not link.
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    fn destroy_program(&mut self, program: ProgramId);

    // ── textures ──────────────────────────────────────────────────────────

    /// Creates an RGBA8 texture and uploads `pixels` (tightly packed rows).
    fn create_texture(&mut self, desc: &TextureDesc, pixels: &[u8]) -> Result<TextureId, DeviceError>;

    fn destroy_texture(&mut self, texture: TextureId);

    // ── state ─────────────────────────────────────────────────────────────

    fn use_program(&mut self, program: Option<ProgramId>);

    fn set_uniform_mat4(&mut self, program: ProgramId, location: UniformLocation, value: &[[f32; 4]; 4]);

    fn set_uniform_sampler(&mut self, program: ProgramId, location: UniformLocation, unit: u32);

    fn set_capability(&mut self, capability: Capability, enabled: bool);

    fn set_blend_state(&mut self, state: BlendState);

    fn bind_vertex_buffer(&mut self, buffer: Option<BufferId>);

    fn bind_index_buffer(&mut self, buffer: Option<BufferId>);

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>);

    fn set_scissor(&mut self, rect: ScissorRect);

    // ── draws ─────────────────────────────────────────────────────────────

    /// Draws `u16` indices from the bound index buffer as a triangle list.
    fn draw_indexed(&mut self, draw: DrawIndexed);
}
