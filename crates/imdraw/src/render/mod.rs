//! Draw-data rendering backend.
//!
//! Components, leaf first:
//! - [`ShaderProgram`]: compiles and links the UI program, resolves uniforms
//! - [`FontAtlasTexture`]: uploads the font bitmap, publishes its texture id
//! - [`GeometryBuffers`]: growable vertex/index buffers
//! - [`projection_matrix`] / [`scissor_rect`]: display-space transforms
//! - [`DrawDataTranslator`]: turns a frame of draw data into device calls
//! - [`Renderer`]: owns the device and the resources above
//!
//! Convention:
//! - geometry is in logical pixels (top-left origin, +Y down)
//! - the vertex stage converts to clip space with the projection uniform
//! - scissors are in device pixels with a bottom-left origin

mod buffers;
mod clip;
mod font_atlas;
mod renderer;
mod resources;
mod shader;
mod translator;

pub use buffers::{GeometryBuffers, GpuBuffer, grown_capacity};
pub use clip::{Mat4, projection_matrix, scissor_rect};
pub use font_atlas::FontAtlasTexture;
pub use renderer::Renderer;
pub use resources::DeviceResources;
pub use shader::{
    FONT_TEXTURE_UNIFORM, FRAGMENT_SOURCE, PROJECTION_UNIFORM, ShaderProgram, VERTEX_SOURCE,
};
pub use translator::{DrawDataTranslator, FrameStats};
