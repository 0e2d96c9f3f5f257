use crate::coords::{ClipRect, Vec2};

use super::{DrawCmd, DrawIdx, TextureId, Vertex};

/// Geometry plus ordered draw commands for one UI layer/window.
///
/// Invariants expected from the producer:
/// - every index (plus the command's `vtx_offset`) addresses a vertex of this list
/// - commands are stored in paint order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub vtx_buffer: Vec<Vertex>,
    pub idx_buffer: Vec<DrawIdx>,
    pub cmd_buffer: Vec<DrawCmd>,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes needed in the device vertex buffer for this list.
    #[inline]
    pub fn vertex_bytes(&self) -> u64 {
        (self.vtx_buffer.len() * Vertex::STRIDE) as u64
    }

    /// Bytes needed in the device index buffer for this list.
    #[inline]
    pub fn index_bytes(&self) -> u64 {
        (self.idx_buffer.len() * std::mem::size_of::<DrawIdx>()) as u64
    }

    /// Appends a textured quad and a command drawing it.
    ///
    /// Indices are relative to the quad (`vtx_offset` points at its first vertex),
    /// mirroring how UI libraries emit geometry for large lists.
    #[allow(clippy::too_many_arguments)]
    pub fn push_quad(
        &mut self,
        min: Vec2,
        max: Vec2,
        uv_min: Vec2,
        uv_max: Vec2,
        col: [u8; 4],
        texture_id: TextureId,
        clip_rect: ClipRect,
    ) {
        let vtx_offset = self.vtx_buffer.len() as u32;
        let idx_offset = self.idx_buffer.len() as u32;

        self.vtx_buffer.extend_from_slice(&[
            Vertex::new(min.to_array(), uv_min.to_array(), col),
            Vertex::new([max.x, min.y], [uv_max.x, uv_min.y], col),
            Vertex::new(max.to_array(), uv_max.to_array(), col),
            Vertex::new([min.x, max.y], [uv_min.x, uv_max.y], col),
        ]);
        self.idx_buffer.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
        self.cmd_buffer.push(
            DrawCmd::new(clip_rect, texture_id, 6).with_offsets(idx_offset, vtx_offset),
        );
    }

    /// Returns `true` when every command's index range and every referenced
    /// vertex lies inside this list's buffers.
    pub fn is_well_formed(&self) -> bool {
        self.cmd_buffer.iter().all(|cmd| {
            let start = cmd.idx_offset as usize;
            let end = start + cmd.elem_count as usize;
            let Some(indices) = self.idx_buffer.get(start..end) else { return false };
            indices
                .iter()
                .all(|&i| (i as usize + cmd.vtx_offset as usize) < self.vtx_buffer.len())
        })
    }
}

/// Everything the UI library produced for one frame, in paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawData {
    pub draw_lists: Vec<DrawList>,
}

impl DrawData {
    #[inline]
    pub fn new(draw_lists: Vec<DrawList>) -> Self {
        Self { draw_lists }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.draw_lists.is_empty()
    }

    pub fn total_vtx_count(&self) -> usize {
        self.draw_lists.iter().map(|l| l.vtx_buffer.len()).sum()
    }

    pub fn total_idx_count(&self) -> usize {
        self.draw_lists.iter().map(|l| l.idx_buffer.len()).sum()
    }

    pub fn total_cmd_count(&self) -> usize {
        self.draw_lists.iter().map(|l| l.cmd_buffer.len()).sum()
    }
}
