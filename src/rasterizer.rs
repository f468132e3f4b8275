//! DDA scanline rasterization with perspective-correct texturing.
//!
//! A two-phase digital-differential-analyzer scanline walk: sort by Y, step
//! a major edge (top-to-bottom) and a minor edge (split at the middle vertex)
//! per row, then step texture/depth attributes per column across each span.

use crate::framebuffer::{DepthBuffer, Framebuffer};
use crate::geometry::RasterVertex;
use crate::shading::ShadingState;
use crate::texture::TextureView;

/// Degeneracy threshold for an edge's vertical span (`2^-8`).
const EDGE_EPSILON: f32 = 1.0 / 256.0;
/// Degeneracy threshold for a span's horizontal width (`2^-11`).
const SPAN_EPSILON: f32 = 1.0 / 2048.0;

#[derive(Debug, Clone, Copy)]
struct Attribs {
    x: f32,
    inv_w: f32,
    u_over_w: f32,
    v_over_w: f32,
    ndc_z: f32,
    intensity: f32,
}

impl Attribs {
    #[inline]
    fn of(v: &RasterVertex) -> Attribs {
        Attribs {
            x: v.x,
            inv_w: v.inv_w,
            u_over_w: v.u_over_w,
            v_over_w: v.v_over_w,
            ndc_z: v.ndc_z,
            intensity: v.intensity,
        }
    }

    #[inline]
    fn step_between(from: &Attribs, to: &Attribs, dy: f32) -> Attribs {
        Attribs {
            x: (to.x - from.x) / dy,
            inv_w: (to.inv_w - from.inv_w) / dy,
            u_over_w: (to.u_over_w - from.u_over_w) / dy,
            v_over_w: (to.v_over_w - from.v_over_w) / dy,
            ndc_z: (to.ndc_z - from.ndc_z) / dy,
            intensity: (to.intensity - from.intensity) / dy,
        }
    }

    #[inline]
    fn at_offset(base: &Attribs, step: &Attribs, offset: f32) -> Attribs {
        Attribs {
            x: base.x + step.x * offset,
            inv_w: base.inv_w + step.inv_w * offset,
            u_over_w: base.u_over_w + step.u_over_w * offset,
            v_over_w: base.v_over_w + step.v_over_w * offset,
            ndc_z: base.ndc_z + step.ndc_z * offset,
            intensity: base.intensity + step.intensity * offset,
        }
    }
}

/// A triangle sorted by Y with its major-edge step precomputed; ready to be
/// rasterized in whole or split by row range across worker threads.
pub struct PreparedTriangle {
    a: RasterVertex,
    b: RasterVertex,
    c: RasterVertex,
    major_step: Attribs,
    pub draw_min_y: i64,
    pub draw_max_y: i64,
}

impl PreparedTriangle {
    /// Sorts the three vertices by Y and precomputes the major edge's per-row
    /// step. Returns `None` when the triangle is vertically degenerate or
    /// entirely outside the framebuffer's rows.
    pub fn new(mut verts: [RasterVertex; 3], height: u32) -> Option<PreparedTriangle> {
        if verts[0].y > verts[1].y { verts.swap(0, 1); }
        if verts[1].y > verts[2].y { verts.swap(1, 2); }
        if verts[0].y > verts[1].y { verts.swap(0, 1); }
        let [a, b, c] = verts;

        let draw_min_y = (a.y.ceil() as i64).max(0);
        let draw_max_y = ((c.y.ceil() as i64) - 1).min(height as i64 - 1);
        if draw_max_y < draw_min_y {
            return None;
        }

        let ac_dy = c.y - a.y;
        if ac_dy < EDGE_EPSILON {
            return None;
        }
        let major_step = Attribs::step_between(&Attribs::of(&a), &Attribs::of(&c), ac_dy);

        Some(PreparedTriangle { a, b, c, major_step, draw_min_y, draw_max_y })
    }

    #[inline]
    fn major_attribs_at(&self, row: f32) -> Attribs {
        Attribs::at_offset(&Attribs::of(&self.a), &self.major_step, row - self.a.y)
    }

    /// The minor edge's attributes at `row`, switching from the A-to-B segment
    /// to the B-to-C segment at `ceil(b.y)`.
    fn minor_attribs_at(&self, row: f32) -> Option<Attribs> {
        let b_row = self.b.y.ceil();
        if row < b_row {
            let dy = self.b.y - self.a.y;
            if dy.abs() < EDGE_EPSILON {
                return None;
            }
            let step = Attribs::step_between(&Attribs::of(&self.a), &Attribs::of(&self.b), dy);
            Some(Attribs::at_offset(&Attribs::of(&self.a), &step, row - self.a.y))
        } else {
            let dy = self.c.y - self.b.y;
            if dy.abs() < EDGE_EPSILON {
                return None;
            }
            let step = Attribs::step_between(&Attribs::of(&self.b), &Attribs::of(&self.c), dy);
            Some(Attribs::at_offset(&Attribs::of(&self.b), &step, row - self.b.y))
        }
    }
}

/// Rasterizes every row of `prepared`, writing into the full-frame buffers.
pub fn rasterize(
    prepared: &PreparedTriangle,
    tex: &TextureView,
    shading: &ShadingState,
    framebuffer: &mut Framebuffer,
    depth: &mut DepthBuffer,
) -> u32 {
    let width = framebuffer.width();
    rasterize_row_range(
        prepared,
        tex,
        shading,
        prepared.draw_min_y,
        prepared.draw_max_y,
        width,
        0,
        framebuffer.pixels_mut(),
        depth.cells_mut(),
    )
}

/// Rasterizes only rows in `[row_start, row_end]` (inclusive), clamped to the
/// triangle's own draw range, against caller-supplied pixel/depth slices.
///
/// `slice_row_offset` is the absolute frame row that `pixels`/`depth_cells`
/// begin at -- 0 for the full frame, or a chunk's first row when called from
/// the parallel row-dispatch path against a disjoint row-range sub-slice.
/// Every row is computed from its own absolute offset off the major/minor
/// edges, so chunks never share mutable state and can run independently.
pub fn rasterize_row_range(
    prepared: &PreparedTriangle,
    tex: &TextureView,
    shading: &ShadingState,
    row_start: i64,
    row_end: i64,
    width: u32,
    slice_row_offset: i64,
    pixels: &mut [u8],
    depth_cells: &mut [f32],
) -> u32 {
    let row_start = row_start.max(prepared.draw_min_y);
    let row_end = row_end.min(prepared.draw_max_y);
    let mut pixels_drawn = 0u32;

    let mut row = row_start;
    while row <= row_end {
        let row_f = row as f32;
        let major = prepared.major_attribs_at(row_f);
        let minor = match prepared.minor_attribs_at(row_f) {
            Some(m) => m,
            None => { row += 1; continue; }
        };

        let (left, right) = if minor.x <= major.x { (minor, major) } else { (major, minor) };
        let span_width = right.x - left.x;
        if span_width < SPAN_EPSILON {
            row += 1;
            continue;
        }

        let col_step = Attribs {
            x: 1.0,
            inv_w: (right.inv_w - left.inv_w) / span_width,
            u_over_w: (right.u_over_w - left.u_over_w) / span_width,
            v_over_w: (right.v_over_w - left.v_over_w) / span_width,
            ndc_z: (right.ndc_z - left.ndc_z) / span_width,
            intensity: (right.intensity - left.intensity) / span_width,
        };

        let col_start = (left.x.ceil() as i64).max(0);
        let col_end = ((right.x.ceil() as i64) - 1).min(width as i64 - 1);
        if col_end < col_start {
            row += 1;
            continue;
        }

        let offset = col_start as f32 - left.x;
        let mut attrib = Attribs::at_offset(&left, &col_step, offset);

        let row_base = (row - slice_row_offset) as usize * width as usize;
        for col in col_start..=col_end {
            let index = row_base + col as usize;
            let z = attrib.ndc_z;
            if z < depth_cells[index] {
                let z_recip = 1.0 / attrib.inv_w;
                let tex_u = attrib.u_over_w * z_recip;
                let tex_v = attrib.v_over_w * z_recip;
                let (r, g, b) = tex.sample_nearest(tex_u, tex_v);
                let (r, g, b) = shading.apply(
                    (r, g, b),
                    z_recip,
                    attrib.intensity,
                    col as u32,
                    row as u32,
                );
                depth_cells[index] = z;
                let base = index * 4;
                pixels[base] = r;
                pixels[base + 1] = g;
                pixels[base + 2] = b;
                pixels[base + 3] = 255;
                pixels_drawn += 1;
            }
            attrib = Attribs::at_offset(&attrib, &col_step, 1.0);
        }

        row += 1;
    }

    pixels_drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shading::ShadingState;

    fn vert(x: f32, y: f32, inv_w: f32, u: f32, v: f32, z: f32) -> RasterVertex {
        RasterVertex { x, y, inv_w, u_over_w: u * inv_w, v_over_w: v * inv_w, ndc_z: z, intensity: 1.0 }
    }

    #[test]
    fn centered_triangle_writes_interior_pixels() {
        let verts = [
            vert(8.0, 14.0, 1.0, 0.0, 0.0, 0.0),
            vert(2.0, 2.0, 1.0, 1.0, 0.0, 0.0),
            vert(14.0, 2.0, 1.0, 0.0, 1.0, 0.0),
        ];
        let prepared = PreparedTriangle::new(verts, 16).unwrap();
        let pixels = vec![255u8, 0, 0, 255];
        let tex = TextureView::new(1, 1, &pixels);
        let shading = ShadingState::default();
        let mut fb = Framebuffer::new(16, 16);
        let mut depth = DepthBuffer::new(16, 16);

        let drawn = rasterize(&prepared, &tex, &shading, &mut fb, &mut depth);
        assert!(drawn > 0);
        assert_eq!(fb.get_pixel(8, 8), Some((255, 0, 0, 255)));
    }

    #[test]
    fn degenerate_flat_triangle_draws_nothing() {
        let verts = [
            vert(0.0, 5.0, 1.0, 0.0, 0.0, 0.0),
            vert(1.0, 5.0, 1.0, 0.0, 0.0, 0.0),
            vert(2.0, 5.0, 1.0, 0.0, 0.0, 0.0),
        ];
        assert!(PreparedTriangle::new(verts, 16).is_none());
    }

    #[test]
    fn row_range_split_matches_full_rasterize() {
        let verts = [
            vert(8.0, 14.0, 1.0, 0.0, 0.0, 0.0),
            vert(2.0, 2.0, 1.0, 1.0, 0.0, 0.0),
            vert(14.0, 2.0, 1.0, 0.0, 1.0, 0.0),
        ];
        let pixels = vec![10u8, 20, 30, 255];
        let tex = TextureView::new(1, 1, &pixels);
        let shading = ShadingState::default();

        let prepared_a = PreparedTriangle::new(verts, 16).unwrap();
        let mut fb_a = Framebuffer::new(16, 16);
        let mut depth_a = DepthBuffer::new(16, 16);
        rasterize(&prepared_a, &tex, &shading, &mut fb_a, &mut depth_a);

        let prepared_b = PreparedTriangle::new(verts, 16).unwrap();
        let mut fb_b = Framebuffer::new(16, 16);
        let mut depth_b = DepthBuffer::new(16, 16);
        let mid = (prepared_b.draw_min_y + prepared_b.draw_max_y) / 2;
        rasterize_row_range(&prepared_b, &tex, &shading, prepared_b.draw_min_y, mid, 16, 0, fb_b.pixels_mut(), depth_b.cells_mut());
        rasterize_row_range(&prepared_b, &tex, &shading, mid + 1, prepared_b.draw_max_y, 16, 0, fb_b.pixels_mut(), depth_b.cells_mut());

        assert_eq!(fb_a.bytes(), fb_b.bytes());
    }
}
