use crate::config::RendererConfig;
use crate::device::{BufferId, BufferKind, RenderDevice};
use crate::error::RenderError;

/// Capacity after growing `capacity` to hold at least `required` bytes.
///
/// `factor` below 1.0 (or NaN) is treated as 1.0. The scaled capacity rounds
/// up, so it is never below `capacity * factor`.
pub fn grown_capacity(capacity: u64, required: u64, factor: f32) -> u64 {
    let factor = f64::from(factor.max(1.0));
    let scaled = (capacity as f64 * factor).ceil() as u64;
    scaled.max(required)
}

/// One growable device buffer. Capacity never shrinks.
#[derive(Debug)]
pub struct GpuBuffer {
    id: BufferId,
    kind: BufferKind,
    capacity: u64,
}

impl GpuBuffer {
    pub fn create(device: &mut dyn RenderDevice, kind: BufferKind, capacity: u64) -> Result<Self, RenderError> {
        let id = device.create_buffer(kind, capacity)?;
        Ok(Self { id, kind, capacity })
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    /// Bytes reserved on the device.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Grows the buffer when it cannot hold `required` bytes.
    ///
    /// Returns `true` when a reallocation happened; the old contents are gone.
    pub fn ensure_capacity(
        &mut self,
        device: &mut dyn RenderDevice,
        required: u64,
        growth_factor: f32,
    ) -> Result<bool, RenderError> {
        if required <= self.capacity {
            return Ok(false);
        }

        let new_capacity = grown_capacity(self.capacity, required, growth_factor);
        device.reallocate_buffer(self.id, new_capacity)?;
        log::debug!(
            "{:?} buffer grown: {} -> {} bytes (required {})",
            self.kind,
            self.capacity,
            new_capacity,
            required
        );
        self.capacity = new_capacity;
        Ok(true)
    }

    /// Overwrites the start of the buffer with `bytes`.
    pub fn upload(&mut self, device: &mut dyn RenderDevice, bytes: &[u8]) -> Result<(), RenderError> {
        let len = bytes.len() as u64;
        if len > self.capacity {
            return Err(RenderError::BufferOverflow {
                kind: self.kind,
                len,
                capacity: self.capacity,
            });
        }
        device.write_buffer(self.id, bytes)?;
        Ok(())
    }

    pub fn release(self, device: &mut dyn RenderDevice) {
        device.destroy_buffer(self.id);
    }
}

/// The vertex and index buffers shared by every draw list.
#[derive(Debug)]
pub struct GeometryBuffers {
    vertex: GpuBuffer,
    index: GpuBuffer,
    growth_factor: f32,
}

impl GeometryBuffers {
    /// Allocates both buffers at their configured initial capacities.
    pub fn create(device: &mut dyn RenderDevice, config: &RendererConfig) -> Result<Self, RenderError> {
        let vertex = GpuBuffer::create(device, BufferKind::Vertex, config.initial_vertex_capacity)?;
        let index = match GpuBuffer::create(device, BufferKind::Index, config.initial_index_capacity) {
            Ok(b) => b,
            Err(e) => {
                vertex.release(device);
                return Err(e);
            }
        };

        Ok(Self {
            vertex,
            index,
            growth_factor: config.growth_factor,
        })
    }

    pub fn buffer(&self, kind: BufferKind) -> &GpuBuffer {
        match kind {
            BufferKind::Vertex => &self.vertex,
            BufferKind::Index => &self.index,
        }
    }

    fn buffer_mut(&mut self, kind: BufferKind) -> &mut GpuBuffer {
        match kind {
            BufferKind::Vertex => &mut self.vertex,
            BufferKind::Index => &mut self.index,
        }
    }

    pub fn capacity(&self, kind: BufferKind) -> u64 {
        self.buffer(kind).capacity()
    }

    pub fn ensure_capacity(
        &mut self,
        device: &mut dyn RenderDevice,
        kind: BufferKind,
        required: u64,
    ) -> Result<bool, RenderError> {
        let factor = self.growth_factor;
        self.buffer_mut(kind).ensure_capacity(device, required, factor)
    }

    pub fn upload(&mut self, device: &mut dyn RenderDevice, kind: BufferKind, bytes: &[u8]) -> Result<(), RenderError> {
        self.buffer_mut(kind).upload(device, bytes)
    }

    pub fn release(self, device: &mut dyn RenderDevice) {
        self.vertex.release(device);
        self.index.release(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCall, DeviceError, RecordingDevice};

    // ── growth policy ─────────────────────────────────────────────────────

    #[test]
    fn growth_uses_factor_when_it_suffices() {
        assert_eq!(grown_capacity(1000, 1200, 1.5), 1500);
    }

    #[test]
    fn growth_rounds_odd_capacity_up() {
        assert_eq!(grown_capacity(30_375, 30_376, 1.5), 45_563);
        assert_eq!(grown_capacity(7, 8, 1.5), 11);
    }

    #[test]
    fn growth_jumps_to_required_when_factor_falls_short() {
        assert_eq!(grown_capacity(1000, 4000, 1.5), 4000);
    }

    #[test]
    fn growth_factor_below_one_is_clamped() {
        assert_eq!(grown_capacity(1000, 1001, 0.5), 1001);
        assert_eq!(grown_capacity(1000, 10, f32::NAN), 1000);
    }

    #[test]
    fn growth_from_zero_capacity_reaches_required() {
        assert_eq!(grown_capacity(0, 64, 1.5), 64);
    }

    // ── GpuBuffer ─────────────────────────────────────────────────────────

    #[test]
    fn ensure_capacity_is_noop_when_large_enough() {
        let mut dev = RecordingDevice::new();
        let mut buf = GpuBuffer::create(&mut dev, BufferKind::Vertex, 100).unwrap();
        dev.take_calls();

        assert!(!buf.ensure_capacity(&mut dev, 100, 1.5).unwrap());
        assert!(dev.calls().is_empty());
        assert_eq!(buf.capacity(), 100);
    }

    #[test]
    fn ensure_capacity_reallocates_on_device() {
        let mut dev = RecordingDevice::new();
        let mut buf = GpuBuffer::create(&mut dev, BufferKind::Index, 100).unwrap();

        assert!(buf.ensure_capacity(&mut dev, 120, 1.5).unwrap());
        assert_eq!(buf.capacity(), 150);
        assert_eq!(dev.buffer(buf.id()).unwrap().size, 150);
        assert!(dev
            .calls()
            .contains(&DeviceCall::ReallocateBuffer { buffer: buf.id(), size: 150 }));
    }

    #[test]
    fn failed_growth_keeps_old_capacity() {
        let mut dev = RecordingDevice::new().with_allocation_limit(128);
        let mut buf = GpuBuffer::create(&mut dev, BufferKind::Vertex, 100).unwrap();

        let err = buf.ensure_capacity(&mut dev, 200, 1.5).unwrap_err();
        assert!(matches!(err, RenderError::Device(DeviceError::OutOfMemory { requested: 200 })));
        assert_eq!(buf.capacity(), 100);
    }

    #[test]
    fn upload_past_capacity_is_rejected() {
        let mut dev = RecordingDevice::new();
        let mut buf = GpuBuffer::create(&mut dev, BufferKind::Index, 4).unwrap();

        let err = buf.upload(&mut dev, &[0; 6]).unwrap_err();
        assert!(matches!(
            err,
            RenderError::BufferOverflow { kind: BufferKind::Index, len: 6, capacity: 4 }
        ));
    }

    // ── GeometryBuffers ───────────────────────────────────────────────────

    #[test]
    fn create_uses_configured_capacities() {
        let mut dev = RecordingDevice::new();
        let bufs = GeometryBuffers::create(&mut dev, &RendererConfig::default()).unwrap();

        assert_eq!(bufs.capacity(BufferKind::Vertex), 200_000);
        assert_eq!(bufs.capacity(BufferKind::Index), 4_000);
        assert_eq!(dev.live_buffers(), 2);
    }

    #[test]
    fn partial_create_failure_releases_vertex_buffer() {
        let mut dev = RecordingDevice::new().with_allocation_limit(50);
        let config = RendererConfig {
            initial_vertex_capacity: 40,
            initial_index_capacity: 60,
            ..RendererConfig::default()
        };

        assert!(GeometryBuffers::create(&mut dev, &config).is_err());
        assert_eq!(dev.live_buffers(), 0);
    }

    #[test]
    fn release_destroys_both_buffers() {
        let mut dev = RecordingDevice::new();
        let bufs = GeometryBuffers::create(&mut dev, &RendererConfig::default()).unwrap();
        bufs.release(&mut dev);
        assert_eq!(dev.live_buffers(), 0);
    }
}
