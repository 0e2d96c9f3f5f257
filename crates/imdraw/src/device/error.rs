/// Failures reported by a [`super::RenderDevice`].
///
/// All of these are fatal for the call that triggered them; the renderer never
/// retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("out of device memory while allocating {requested} bytes")]
    OutOfMemory { requested: u64 },

    #[error("write of {len} bytes overflows a {size}-byte buffer")]
    WriteOverflow { len: u64, size: u64 },

    #[error("unknown {0} handle")]
    UnknownResource(&'static str),

    #[error("texture data is {actual} bytes, expected {expected}")]
    InvalidTextureData { expected: usize, actual: usize },

    #[error("{width}x{height} texture exceeds the device limit of {limit} texels per side")]
    TextureTooLarge { width: u32, height: u32, limit: u32 },
}
