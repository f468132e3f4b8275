//! Construction-time configuration for a [`Renderer`](crate::renderer::Renderer).

/// Tunables fixed at `Renderer` construction.
///
/// None of these are reachable from environment variables or config files --
/// the core has no I/O, so this struct is the entire configuration surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererConfig {
    /// Clip-space `w` at or below which a vertex is considered behind the camera.
    pub near_plane: f32,
    /// Worker thread count for the optional parallel row dispatch.
    ///
    /// `None` disables parallel dispatch. `Some(0)` resolves to `num_cpus::get()`
    /// at `Renderer` construction time.
    pub worker_threads: Option<usize>,
    /// Minimum per-vertex lighting multiplier applied during shading.
    pub ambient_floor: f32,
}

impl Default for RendererConfig {
    fn default() -> RendererConfig {
        RendererConfig {
            near_plane: 0.01,
            worker_threads: None,
            ambient_floor: 0.0,
        }
    }
}
