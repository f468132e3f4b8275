//! Programmer-misuse error type
//!
//! Numeric-degenerate outcomes (culled, clipped, zero-area triangles) are not
//! represented here -- they are ordinary control flow, counted in
//! [`FrameStats`](crate::stats::FrameStats) and logged at `trace`. This type only
//! covers conditions that indicate a collaborator used the renderer incorrectly.

use thiserror::Error;

/// Distinguishable programmer-misuse failures surfaced by [`Renderer`](crate::renderer::Renderer).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    /// `draw_triangle_3d`/`draw_triangle` was called before `set_matrices`.
    #[error("draw_triangle called before set_matrices")]
    MissingMatrices,
    /// The texture passed to a draw call was null or had zero width/height.
    #[error("draw called with a null or zero-sized texture")]
    NoTexture,
    /// `init` was called a second time with dimensions that differ from the first call.
    #[error("init called twice with different dimensions ({old_w}x{old_h} vs {new_w}x{new_h})")]
    DimensionMismatch {
        old_w: u32,
        old_h: u32,
        new_w: u32,
        new_h: u32,
    },
}

pub type RenderResult<T> = Result<T, RenderError>;
