//! Per-frame statistics counters

/// Counters reset by `Renderer::clear_buffers` and read by collaborators between
/// a clear and the next one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub triangles_drawn: u32,
    pub triangles_culled: u32,
    pub triangles_clipped: u32,
    pub pixels_drawn: u32,
}

impl FrameStats {
    pub(crate) fn reset(&mut self) {
        *self = FrameStats::default();
    }
}
