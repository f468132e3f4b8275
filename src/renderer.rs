//! Top-level renderer: owns the framebuffer, depth buffer, and current
//! matrices, and exposes the draw entry points collaborators call per frame.

use log::{debug, trace, warn};

use crate::config::RendererConfig;
use crate::error::{RenderError, RenderResult};
use crate::framebuffer::{DepthBuffer, Framebuffer};
use crate::geometry::{clip_near_plane, project_to_screen, signed_screen_area, ClipVertex, RasterVertex};
use crate::math::{Matrix4, Vector3, Vector4};
use crate::parallel::rasterize_parallel;
use crate::rasterizer::{rasterize, PreparedTriangle};
use crate::shading::ShadingState;
use crate::stats::FrameStats;
use crate::texture::TextureView;
use crate::vertex::Vertex;

/// Owns a fixed-resolution color/depth buffer pair and the matrices/shading
/// state needed to turn mesh triangles into pixels.
pub struct Renderer {
    width: u32,
    height: u32,
    framebuffer: Framebuffer,
    depth: DepthBuffer,
    config: RendererConfig,
    shading: ShadingState,
    stats: FrameStats,
    mvp: Option<Matrix4<f32>>,
    camera_pos: Option<Vector3<f32>>,
}

impl Renderer {
    /// Allocates a renderer at `width`x`height` with default configuration.
    pub fn new(width: u32, height: u32) -> Renderer {
        Renderer::with_config(width, height, RendererConfig::default())
    }

    /// Allocates a renderer at `width`x`height` with explicit configuration.
    ///
    /// `config.worker_threads == Some(0)` is resolved here to `num_cpus::get()`
    /// and the resolved count is what's stored and reported by `worker_threads`;
    /// later parallel dispatch never needs to re-query the core count.
    pub fn with_config(width: u32, height: u32, mut config: RendererConfig) -> Renderer {
        if config.worker_threads == Some(0) {
            config.worker_threads = Some(num_cpus::get());
        }
        debug!(
            "renderer init {}x{}, worker_threads={:?}, near_plane={}",
            width, height, config.worker_threads, config.near_plane
        );
        Renderer {
            width,
            height,
            framebuffer: Framebuffer::new(width, height),
            depth: DepthBuffer::new(width, height),
            config,
            shading: ShadingState::default(),
            stats: FrameStats::default(),
            mvp: None,
            camera_pos: None,
        }
    }

    /// The resolved configuration this renderer was constructed with
    /// (`worker_threads == Some(0)` has already been resolved to a core count).
    pub fn config(&self) -> RendererConfig {
        self.config
    }

    /// Re-initializes an existing renderer at `width`x`height`. Identical
    /// dimensions are a no-op clear; different dimensions are a misuse error,
    /// since this renderer never reallocates its buffers implicitly.
    pub fn init(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width != self.width || height != self.height {
            warn!(
                "init called with {}x{} but renderer already sized {}x{}",
                width, height, self.width, self.height
            );
            return Err(RenderError::DimensionMismatch {
                old_w: self.width,
                old_h: self.height,
                new_w: width,
                new_h: height,
            });
        }
        self.clear_buffers();
        Ok(())
    }

    /// Bulk-clears the framebuffer and depth buffer and resets per-frame stats.
    pub fn clear_buffers(&mut self) {
        trace!("clear_buffers {}x{}", self.width, self.height);
        self.framebuffer.clear();
        self.depth.clear();
        self.stats.reset();
    }

    /// Stores the model-view-projection matrix and camera position used by
    /// subsequent `draw_triangle_3d` calls, until the next `set_matrices`.
    pub fn set_matrices(&mut self, mvp: Matrix4<f32>, camera_pos: Vector3<f32>) {
        self.mvp = Some(mvp);
        self.camera_pos = Some(camera_pos);
    }

    pub fn set_fog(&mut self, enabled: bool, near: f32, far: f32, color: (u8, u8, u8)) {
        self.shading.set_fog(enabled, near, far, color);
    }

    pub fn set_ambient_floor(&mut self, floor: f32) {
        self.shading.set_ambient_floor(floor);
    }

    /// Transforms, clips, projects, culls, and rasterizes a mesh-space triangle.
    pub fn draw_triangle_3d(&mut self, v1: Vertex, v2: Vertex, v3: Vertex, tex: &TextureView) -> RenderResult<()> {
        let mvp = self.mvp.ok_or_else(|| {
            warn!("draw_triangle_3d called before set_matrices");
            RenderError::MissingMatrices
        })?;
        if tex.is_empty() {
            warn!("draw_triangle_3d called with an empty texture");
            return Err(RenderError::NoTexture);
        }

        let clip_verts = [to_clip_vertex(&mvp, &v1), to_clip_vertex(&mvp, &v2), to_clip_vertex(&mvp, &v3)];
        let clip_result = clip_near_plane(self.config.near_plane, clip_verts);

        if clip_result.triangles.is_empty() {
            self.stats.triangles_culled += 1;
            trace!("triangle culled (entirely behind near plane)");
            return Ok(());
        }
        if clip_result.was_clipped {
            self.stats.triangles_clipped += 1;
            trace!("triangle clipped into {} piece(s) at the near plane", clip_result.triangles.len());
        }

        for tri in clip_result.triangles.iter() {
            self.draw_clipped_triangle(*tri, tex);
        }
        Ok(())
    }

    /// Rasterizes three already-projected vertices directly, skipping the
    /// clip/project/cull steps `draw_triangle_3d` performs.
    pub fn draw_triangle(&mut self, vertices: [RasterVertex; 3], tex: &TextureView) -> RenderResult<()> {
        if tex.is_empty() {
            warn!("draw_triangle called with an empty texture");
            return Err(RenderError::NoTexture);
        }
        self.stats.triangles_drawn += 1;
        self.stats.pixels_drawn += self.rasterize_dispatch(vertices, tex);
        Ok(())
    }

    fn draw_clipped_triangle(&mut self, tri: [ClipVertex; 3], tex: &TextureView) {
        let raster = [
            project_to_screen(&tri[0], self.width, self.height, tex),
            project_to_screen(&tri[1], self.width, self.height, tex),
            project_to_screen(&tri[2], self.width, self.height, tex),
        ];

        let cross = signed_screen_area(&raster[0], &raster[1], &raster[2]);
        if cross <= 0.0 {
            self.stats.triangles_culled += 1;
            trace!("triangle culled (backface or degenerate), cross={}", cross);
            return;
        }

        self.stats.triangles_drawn += 1;
        self.stats.pixels_drawn += self.rasterize_dispatch(raster, tex);
    }

    fn rasterize_dispatch(&mut self, raster: [RasterVertex; 3], tex: &TextureView) -> u32 {
        let prepared = match PreparedTriangle::new(raster, self.height) {
            Some(p) => p,
            None => {
                trace!("triangle degenerate after projection, skipping rasterization");
                return 0;
            }
        };

        match self.config.worker_threads {
            Some(workers) if workers > 1 => {
                rasterize_parallel(&prepared, tex, &self.shading, &mut self.framebuffer, &mut self.depth, workers)
            }
            _ => rasterize(&prepared, tex, &self.shading, &mut self.framebuffer, &mut self.depth),
        }
    }

    /// Read-only view of the raw RGBA8 pixel bytes, suitable for upload or presentation.
    pub fn framebuffer_bytes(&self) -> &[u8] {
        self.framebuffer.bytes()
    }

    pub fn width(&self) -> u32 { self.width }

    pub fn height(&self) -> u32 { self.height }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}

fn to_clip_vertex(mvp: &Matrix4<f32>, v: &Vertex) -> ClipVertex {
    let position = Vector4::new(v.position.x, v.position.y, v.position.z, 1.0);
    ClipVertex {
        position: mvp * position,
        uv: v.uv,
        intensity: v.intensity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{multiply, perspective, translation};

    fn identity_mvp(renderer: &mut Renderer) {
        let proj = perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let view = translation(0.0, 0.0, 0.0);
        renderer.set_matrices(multiply(&proj, &view), Vector3::new(0.0, 0.0, 0.0));
    }

    fn solid_texture() -> Vec<u8> {
        vec![255u8, 0, 0, 255]
    }

    #[test]
    fn draw_before_set_matrices_is_missing_matrices_error() {
        let mut renderer = Renderer::new(16, 16);
        let pixels = solid_texture();
        let tex = TextureView::new(1, 1, &pixels);
        let v = Vertex::new(Vector3::new(0.0, 0.0, 5.0), nalgebra::Vector2::new(0.0, 0.0));
        let result = renderer.draw_triangle_3d(v, v, v, &tex);
        assert_eq!(result, Err(RenderError::MissingMatrices));
    }

    #[test]
    fn centered_triangle_draws_and_counts_stats() {
        use nalgebra::Vector2;
        let mut renderer = Renderer::new(16, 16);
        identity_mvp(&mut renderer);
        let pixels = solid_texture();
        let tex = TextureView::new(1, 1, &pixels);

        let v1 = Vertex::new(Vector3::new(-1.0, -1.0, 5.0), Vector2::new(0.0, 0.0));
        let v2 = Vertex::new(Vector3::new(1.0, -1.0, 5.0), Vector2::new(1.0, 0.0));
        let v3 = Vertex::new(Vector3::new(0.0, 1.0, 5.0), Vector2::new(0.5, 1.0));

        renderer.draw_triangle_3d(v1, v2, v3, &tex).unwrap();
        let stats = renderer.stats();
        assert_eq!(stats.triangles_drawn, 1);
        assert_eq!(stats.triangles_culled, 0);
        assert!(stats.pixels_drawn > 0);
    }

    #[test]
    fn backface_triangle_is_culled() {
        use nalgebra::Vector2;
        let mut renderer = Renderer::new(16, 16);
        identity_mvp(&mut renderer);
        let pixels = solid_texture();
        let tex = TextureView::new(1, 1, &pixels);

        let v1 = Vertex::new(Vector3::new(-1.0, -1.0, 5.0), Vector2::new(0.0, 0.0));
        let v2 = Vertex::new(Vector3::new(1.0, -1.0, 5.0), Vector2::new(1.0, 0.0));
        let v3 = Vertex::new(Vector3::new(0.0, 1.0, 5.0), Vector2::new(0.5, 1.0));

        // Reversed winding relative to the counter-clockwise front face.
        renderer.draw_triangle_3d(v3, v2, v1, &tex).unwrap();
        let stats = renderer.stats();
        assert_eq!(stats.triangles_culled, 1);
        assert_eq!(stats.pixels_drawn, 0);
    }

    #[test]
    fn fully_behind_camera_is_culled_without_pixels() {
        use nalgebra::Vector2;
        let mut renderer = Renderer::new(16, 16);
        identity_mvp(&mut renderer);
        let pixels = solid_texture();
        let tex = TextureView::new(1, 1, &pixels);

        let v1 = Vertex::new(Vector3::new(-1.0, -1.0, -1.0), Vector2::new(0.0, 0.0));
        let v2 = Vertex::new(Vector3::new(1.0, -1.0, -1.0), Vector2::new(1.0, 0.0));
        let v3 = Vertex::new(Vector3::new(0.0, 1.0, -1.0), Vector2::new(0.5, 1.0));

        renderer.draw_triangle_3d(v1, v2, v3, &tex).unwrap();
        let stats = renderer.stats();
        assert_eq!(stats.triangles_culled, 1);
        assert_eq!(stats.pixels_drawn, 0);
    }

    #[test]
    fn empty_texture_is_no_texture_error() {
        let mut renderer = Renderer::new(16, 16);
        identity_mvp(&mut renderer);
        let pixels: [u8; 0] = [];
        let tex = TextureView::new(0, 0, &pixels);
        let v = Vertex::new(Vector3::new(0.0, 0.0, 5.0), nalgebra::Vector2::new(0.0, 0.0));
        let result = renderer.draw_triangle_3d(v, v, v, &tex);
        assert_eq!(result, Err(RenderError::NoTexture));
    }

    #[test]
    fn init_with_same_dimensions_clears_instead_of_erroring() {
        let mut renderer = Renderer::new(8, 8);
        assert!(renderer.init(8, 8).is_ok());
    }

    #[test]
    fn init_with_different_dimensions_is_dimension_mismatch() {
        let mut renderer = Renderer::new(8, 8);
        let result = renderer.init(16, 16);
        assert_eq!(
            result,
            Err(RenderError::DimensionMismatch { old_w: 8, old_h: 8, new_w: 16, new_h: 16 })
        );
    }
}
