use crate::draw_data::{DrawIdx, Vertex};

/// Renderer construction parameters.
///
/// Defaults match a small steady-state UI: no buffer reallocation until a
/// frame needs more than 10000 vertices or 2000 indices in a single list.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Initial vertex buffer size in bytes.
    pub initial_vertex_capacity: u64,

    /// Initial index buffer size in bytes.
    pub initial_index_capacity: u64,

    /// Multiplier applied to the current capacity when a buffer must grow.
    ///
    /// Values below 1.0 are treated as 1.0.
    pub growth_factor: f32,

    /// Texture unit the font sampler uniform points at.
    pub font_texture_unit: u32,

    /// Pass each command's vertex offset to the device as a base vertex.
    ///
    /// Disable for devices that cannot draw with a base vertex; the UI library
    /// must then emit absolute indices.
    pub use_vertex_offset: bool,
}

impl RendererConfig {
    pub const DEFAULT_VERTEX_COUNT: u64 = 10_000;
    pub const DEFAULT_INDEX_COUNT: u64 = 2_000;
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            initial_vertex_capacity: Self::DEFAULT_VERTEX_COUNT * Vertex::STRIDE as u64,
            initial_index_capacity: Self::DEFAULT_INDEX_COUNT
                * std::mem::size_of::<DrawIdx>() as u64,
            growth_factor: 1.5,
            font_texture_unit: 0,
            use_vertex_offset: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacities_are_sized_in_elements() {
        let c = RendererConfig::default();
        assert_eq!(c.initial_vertex_capacity, 200_000);
        assert_eq!(c.initial_index_capacity, 4_000);
        assert_eq!(c.growth_factor, 1.5);
    }
}
