use crate::coords::ClipRect;

/// Opaque texture reference carried by draw commands.
///
/// The renderer publishes the font atlas under one of these ids; the UI library
/// copies it into every command that samples the atlas.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Non-null user callback attached to a draw command.
///
/// Carried through as an opaque token. This backend has no callback mechanism;
/// see [`crate::RenderError::UnsupportedCallback`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UserCallback(pub u64);

/// One indexed draw inside a [`crate::DrawList`].
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct DrawCmd {
    /// Clip rectangle in display coordinates (logical pixels).
    pub clip_rect: ClipRect,
    /// Number of indices to draw (a multiple of 3).
    pub elem_count: u32,
    /// First index in the list's index buffer.
    pub idx_offset: u32,
    /// Added to every index before vertex fetch.
    pub vtx_offset: u32,
    pub texture_id: TextureId,
    pub user_callback: Option<UserCallback>,
}

impl DrawCmd {
    #[inline]
    pub fn new(clip_rect: ClipRect, texture_id: TextureId, elem_count: u32) -> Self {
        Self {
            clip_rect,
            elem_count,
            idx_offset: 0,
            vtx_offset: 0,
            texture_id,
            user_callback: None,
        }
    }

    #[inline]
    pub fn with_offsets(mut self, idx_offset: u32, vtx_offset: u32) -> Self {
        self.idx_offset = idx_offset;
        self.vtx_offset = vtx_offset;
        self
    }

    #[inline]
    pub fn with_callback(mut self, callback: UserCallback) -> Self {
        self.user_callback = Some(callback);
        self
    }
}
