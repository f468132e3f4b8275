//! Clip-space vertices, near-plane clipping, and the screen-space projection
//! that turns a clipped triangle into rasterizer-ready vertices.

use nalgebra::{Vector2, Vector4};
use smallvec::SmallVec;

use crate::texture::TextureView;

/// A vertex in clip space, with its texture coordinate and optional lighting
/// intensity carried along for interpolation during clipping.
#[derive(Debug, Clone, Copy)]
pub struct ClipVertex {
    pub position: Vector4<f32>,
    pub uv: Vector2<f32>,
    pub intensity: Option<f32>,
}

impl ClipVertex {
    #[inline]
    fn lerp(a: &ClipVertex, b: &ClipVertex, t: f32) -> ClipVertex {
        ClipVertex {
            position: a.position + (b.position - a.position) * t,
            uv: a.uv + (b.uv - a.uv) * t,
            intensity: match (a.intensity, b.intensity) {
                (Some(ia), Some(ib)) => Some(ia + (ib - ia) * t),
                (Some(ia), None) => Some(ia),
                (None, Some(ib)) => Some(ib),
                (None, None) => None,
            },
        }
    }
}

/// Outcome of near-plane clipping a single input triangle.
pub struct ClipResult {
    /// Zero triangles means the input was entirely behind the near plane (cull).
    /// One triangle means it was entirely in front (no clipping). Two triangles
    /// means a one-vertex-behind split produced a quad fan.
    pub triangles: SmallVec<[[ClipVertex; 3]; 2]>,
    /// True when `behind_count` was 1 or 2 -- the input needed clipping at all.
    pub was_clipped: bool,
}

/// Clips a clip-space triangle against the near plane (`w <= near_plane` is behind).
///
/// A bounded, iterative fan-out of at most two output triangles; never
/// unbounded recursion.
pub fn clip_near_plane(near_plane: f32, tri: [ClipVertex; 3]) -> ClipResult {
    let behind: [bool; 3] = [
        tri[0].position.w <= near_plane,
        tri[1].position.w <= near_plane,
        tri[2].position.w <= near_plane,
    ];
    let behind_count = behind.iter().filter(|b| **b).count();

    match behind_count {
        0 => {
            let mut triangles = SmallVec::new();
            triangles.push(tri);
            ClipResult { triangles, was_clipped: false }
        }
        3 => ClipResult {
            triangles: SmallVec::new(),
            was_clipped: true,
        },
        1 => {
            // Rotate so index 0 is the behind vertex, 1/2 are the front vertices,
            // preserving winding order.
            let vi = behind.iter().position(|b| *b).unwrap();
            let v = tri[vi];
            let f1 = tri[(vi + 1) % 3];
            let f2 = tri[(vi + 2) % 3];

            let t1 = (near_plane - f1.position.w) / (v.position.w - f1.position.w);
            let t2 = (near_plane - f2.position.w) / (v.position.w - f2.position.w);
            let a = ClipVertex::lerp(&f1, &v, t1);
            let b = ClipVertex::lerp(&f2, &v, t2);

            let mut triangles = SmallVec::new();
            triangles.push([f1, f2, a]);
            triangles.push([f2, b, a]);
            ClipResult { triangles, was_clipped: true }
        }
        2 => {
            let fi = behind.iter().position(|b| !*b).unwrap();
            let f = tri[fi];
            let b1 = tri[(fi + 1) % 3];
            let b2 = tri[(fi + 2) % 3];

            let t1 = (near_plane - f.position.w) / (b1.position.w - f.position.w);
            let t2 = (near_plane - f.position.w) / (b2.position.w - f.position.w);
            let p1 = ClipVertex::lerp(&f, &b1, t1);
            let p2 = ClipVertex::lerp(&f, &b2, t2);

            let mut triangles = SmallVec::new();
            triangles.push([f, p1, p2]);
            ClipResult { triangles, was_clipped: true }
        }
        _ => unreachable!("behind_count is in 0..=3"),
    }
}

/// A vertex after perspective divide and viewport mapping, ready for the rasterizer.
#[derive(Debug, Clone, Copy)]
pub struct RasterVertex {
    pub x: f32,
    pub y: f32,
    pub inv_w: f32,
    pub u_over_w: f32,
    pub v_over_w: f32,
    pub ndc_z: f32,
    /// Raw (non-perspective-divided) lighting intensity; 1.0 when lighting is unused.
    pub intensity: f32,
}

/// Perspective divide plus viewport mapping.
pub fn project_to_screen(v: &ClipVertex, width: u32, height: u32, tex: &TextureView) -> RasterVertex {
    let inv_w = 1.0 / v.position.w;
    RasterVertex {
        x: (v.position.x * inv_w + 1.0) * (width as f32 / 2.0),
        y: (1.0 - v.position.y * inv_w) * (height as f32 / 2.0),
        inv_w,
        u_over_w: v.uv.x * tex.width() as f32 * inv_w,
        v_over_w: v.uv.y * tex.height() as f32 * inv_w,
        ndc_z: v.position.z * inv_w,
        intensity: v.intensity.unwrap_or(1.0),
    }
}

/// Signed double area of the screen-space triangle (shoelace formula).
///
/// Positive for counter-clockwise winding under the Y-flipped screen mapping
/// used by `project_to_screen`; non-positive triangles are back-facing or
/// degenerate and are culled by the geometry stage.
#[inline]
pub fn signed_screen_area(a: &RasterVertex, b: &RasterVertex, c: &RasterVertex) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cv(w: f32) -> ClipVertex {
        ClipVertex {
            position: Vector4::new(0.0, 0.0, 0.0, w),
            uv: Vector2::new(0.0, 0.0),
            intensity: None,
        }
    }

    #[test]
    fn all_in_front_is_not_clipped() {
        let tri = [cv(10.0), cv(10.0), cv(10.0)];
        let result = clip_near_plane(0.01, tri);
        assert!(!result.was_clipped);
        assert_eq!(result.triangles.len(), 1);
    }

    #[test]
    fn all_behind_is_fully_culled() {
        let tri = [cv(-1.0), cv(-1.0), cv(-1.0)];
        let result = clip_near_plane(0.01, tri);
        assert!(result.was_clipped);
        assert_eq!(result.triangles.len(), 0);
    }

    #[test]
    fn one_behind_produces_two_triangles() {
        let tri = [cv(-1.0), cv(10.0), cv(10.0)];
        let result = clip_near_plane(0.01, tri);
        assert!(result.was_clipped);
        assert_eq!(result.triangles.len(), 2);
        for t in result.triangles.iter() {
            for v in t {
                assert!(v.position.w >= 0.01 - 1e-5);
            }
        }
    }

    #[test]
    fn two_behind_produces_one_triangle() {
        let tri = [cv(10.0), cv(-1.0), cv(-1.0)];
        let result = clip_near_plane(0.01, tri);
        assert!(result.was_clipped);
        assert_eq!(result.triangles.len(), 1);
        for v in &result.triangles[0] {
            assert!(v.position.w >= 0.01 - 1e-5);
        }
    }
}
