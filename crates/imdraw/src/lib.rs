//! imdraw: GPU rendering backend for immediate-mode UI draw data.
//!
//! The UI library produces a [`DrawData`] every frame; a [`Renderer`] turns it
//! into device draw calls through a [`RenderDevice`] implementation.
//!
//! ```rust,ignore
//! let gpu = Gpu::headless_blocking(GpuInit::default())?;
//! let device = WgpuDevice::new(gpu.device().clone(), gpu.queue().clone(), format);
//! let mut ui = UiContext::new();
//! let mut renderer = Renderer::new(device, &mut ui, RendererConfig::default())?;
//!
//! // per frame
//! renderer.device_mut().begin_frame(&target.view, width, height);
//! renderer.render(&mut ui, &draw_data, DisplaySize::new(width as f32, height as f32))?;
//! if let Some(commands) = renderer.device_mut().end_frame() {
//!     gpu.submit(commands);
//! }
//! ```

pub mod config;
pub mod context;
pub mod coords;
pub mod device;
pub mod draw_data;
pub mod error;
pub mod logging;
pub mod render;

pub use config::RendererConfig;
pub use context::{FontAtlas, FontBitmap, Io, UiContext};
pub use coords::{ClipRect, DisplaySize, FramebufferScale, Vec2};
pub use device::{Gpu, GpuInit, RecordingDevice, RenderDevice, WgpuDevice};
pub use draw_data::{DrawCmd, DrawData, DrawList, TextureId, UserCallback, Vertex};
pub use error::RenderError;
pub use render::{FrameStats, Renderer};
