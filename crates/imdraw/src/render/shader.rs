use crate::device::{ProgramId, RenderDevice, ShaderStage, UniformLocation};

/// Vertex stage: `position = projection_matrix * vec4(pos, 0, 1)`.
pub const VERTEX_SOURCE: &str = include_str!("shaders/ui.vert.wgsl");

/// Fragment stage: `color = vertex_color * sample(font_texture, uv)`.
pub const FRAGMENT_SOURCE: &str = include_str!("shaders/ui.frag.wgsl");

pub const PROJECTION_UNIFORM: &str = "projection_matrix";
pub const FONT_TEXTURE_UNIFORM: &str = "font_texture";

/// The linked UI program and its two resolved uniforms.
///
/// Compile and link problems never fail construction. They are logged, and
/// the program is kept even when it cannot draw.
#[derive(Debug)]
pub struct ShaderProgram {
    program: ProgramId,
    linked: bool,
    projection: Option<UniformLocation>,
    font_texture: Option<UniformLocation>,
}

impl ShaderProgram {
    /// Builds the program from the built-in sources.
    pub fn compile_and_link(device: &mut dyn RenderDevice) -> Self {
        Self::compile_and_link_from(device, VERTEX_SOURCE, FRAGMENT_SOURCE)
    }

    /// Builds the program from caller-provided stage sources.
    pub fn compile_and_link_from(device: &mut dyn RenderDevice, vertex_src: &str, fragment_src: &str) -> Self {
        let vs = device.compile_shader(ShaderStage::Vertex, "imdraw ui vertex shader", vertex_src);
        if let Some(info) = &vs.info_log {
            log::error!("vertex shader failed to compile:\n{info}");
        }

        let fs = device.compile_shader(ShaderStage::Fragment, "imdraw ui fragment shader", fragment_src);
        if let Some(info) = &fs.info_log {
            log::error!("fragment shader failed to compile:\n{info}");
        }

        let program = device.link_program("imdraw ui program", vs.handle, fs.handle);
        if let Some(info) = &program.info_log {
            log::error!("shader program failed to link:\n{info}");
        }

        // Stage objects are no longer needed once the program is linked.
        device.destroy_shader(vs.handle);
        device.destroy_shader(fs.handle);

        let projection = resolve_uniform(device, program.handle, PROJECTION_UNIFORM);
        let font_texture = resolve_uniform(device, program.handle, FONT_TEXTURE_UNIFORM);

        Self {
            program: program.handle,
            linked: program.succeeded(),
            projection,
            font_texture,
        }
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn projection_location(&self) -> Option<UniformLocation> {
        self.projection
    }

    pub fn font_texture_location(&self) -> Option<UniformLocation> {
        self.font_texture
    }

    pub fn release(self, device: &mut dyn RenderDevice) {
        device.destroy_program(self.program);
    }
}

fn resolve_uniform(device: &dyn RenderDevice, program: ProgramId, name: &str) -> Option<UniformLocation> {
    let location = device.uniform_location(program, name);
    if location.is_none() {
        log::warn!("uniform '{name}' not found in {program:?}; it will have no effect");
    }
    location
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCall, RecordingDevice};

    #[test]
    fn builtin_program_links_and_resolves_uniforms() {
        let mut dev = RecordingDevice::new();
        let shader = ShaderProgram::compile_and_link(&mut dev);

        assert!(shader.is_linked());
        assert_eq!(shader.projection_location().map(|l| l.group), Some(0));
        assert_eq!(shader.font_texture_location().map(|l| l.group), Some(1));
    }

    #[test]
    fn stages_are_released_after_link() {
        let mut dev = RecordingDevice::new();
        let _shader = ShaderProgram::compile_and_link(&mut dev);

        assert_eq!(dev.live_shaders(), 0);
        assert_eq!(dev.live_programs(), 1);
        let destroyed = dev
            .calls()
            .iter()
            .filter(|c| matches!(c, DeviceCall::DestroyShader(_)))
            .count();
        assert_eq!(destroyed, 2);
    }

    #[test]
    fn compile_failure_is_not_fatal() {
        let mut dev = RecordingDevice::new().with_failing_shader(ShaderStage::Vertex);
        let shader = ShaderProgram::compile_and_link(&mut dev);

        assert!(!shader.is_linked());
        assert_eq!(shader.projection_location(), None);
        assert_eq!(shader.font_texture_location(), None);
        assert_eq!(dev.live_programs(), 1);
    }

    #[test]
    fn link_failure_is_not_fatal() {
        let mut dev = RecordingDevice::new().with_failing_link();
        let shader = ShaderProgram::compile_and_link(&mut dev);

        assert!(!shader.is_linked());
        assert_eq!(shader.projection_location(), None);
        assert_eq!(shader.font_texture_location(), None);
        assert_eq!(dev.live_programs(), 1);
        assert_eq!(dev.live_shaders(), 0);
    }

    #[test]
    fn missing_uniform_is_tolerated() {
        let mut dev = RecordingDevice::new();
        let shader = ShaderProgram::compile_and_link_from(&mut dev, "uses projection_matrix", "plain color");

        assert!(shader.is_linked());
        assert!(shader.projection_location().is_some());
        assert_eq!(shader.font_texture_location(), None);
    }

    #[test]
    fn release_destroys_program() {
        let mut dev = RecordingDevice::new();
        ShaderProgram::compile_and_link(&mut dev).release(&mut dev);
        assert_eq!(dev.live_programs(), 0);
    }
}
