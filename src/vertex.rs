//! Mesh-side vertex data
//!
//! The core never owns a mesh -- collaborators hand triples of `Vertex` values
//! to `Renderer::draw_triangle_3d` directly.

use nalgebra::{Vector2, Vector3};

/// Position, texture coordinate, and optional lighting intensity for one mesh vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vector3<f32>,
    pub uv: Vector2<f32>,
    /// Per-vertex lighting intensity in `[0, 1]`, interpolated non-perspective-correct
    /// by the rasterizer, not perspective-corrected. `None` disables lighting.
    pub intensity: Option<f32>,
}

impl Vertex {
    pub fn new(position: Vector3<f32>, uv: Vector2<f32>) -> Vertex {
        Vertex { position, uv, intensity: None }
    }

    pub fn with_intensity(position: Vector3<f32>, uv: Vector2<f32>, intensity: f32) -> Vertex {
        Vertex { position, uv, intensity: Some(intensity) }
    }
}
