use bytemuck::{Pod, Zeroable};

/// Index type used by every draw list.
pub type DrawIdx = u16;

/// UI vertex, 20 bytes:
///
///  offset  0  pos  [f32; 2]   loc 0
///  offset  8  uv   [f32; 2]   loc 1
///  offset 16  col  [u8; 4]    loc 2 (normalized RGBA)
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub col: [u8; 4],
}

impl Vertex {
    /// Byte stride of one vertex. Never changes.
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();

    const ATTRS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Unorm8x4];

    #[inline]
    pub const fn new(pos: [f32; 2], uv: [f32; 2], col: [u8; 4]) -> Self {
        Self { pos, uv, col }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::STRIDE as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}
