//! Immutable texture view
//!
//! A single concrete, borrowed view type that every draw entry point takes a
//! texture as. Loader or collaborator code is responsible for decoding
//! whatever asset format it uses into one of these; the `image_compat`
//! feature provides an adapter from the `image` crate's buffer types for
//! that purpose.

/// Borrowed, tightly packed RGBA8 image. The core never copies texture pixels.
#[derive(Debug, Clone, Copy)]
pub struct TextureView<'a> {
    width: u32,
    height: u32,
    pixels: &'a [u8],
}

impl<'a> TextureView<'a> {
    /// Wraps a tightly packed RGBA8 buffer. `pixels.len()` must equal `width * height * 4`;
    /// this is checked with `debug_assert!` rather than a `Result`, since a mismatched
    /// length is a collaborator bug, not a rendering-time degenerate case.
    pub fn new(width: u32, height: u32, pixels: &'a [u8]) -> TextureView<'a> {
        debug_assert!(
            pixels.len() as u64 == u64::from(width) * u64::from(height) * 4,
            "texture buffer length does not match width*height*4"
        );
        TextureView { width, height, pixels }
    }

    #[inline(always)]
    pub fn width(&self) -> u32 { self.width }

    #[inline(always)]
    pub fn height(&self) -> u32 { self.height }

    /// True for the "no texture" condition the geometry stage rejects with `RenderError::NoTexture`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Fetches the RGB triple at already-wrapped integer texel coordinates.
    ///
    /// `x` and `y` must already lie in `[0, width)` / `[0, height)` -- the rasterizer's
    /// inner loop performs the modulo wrap itself (see `rasterizer.rs`) so this stays a
    /// single bounds-checked index in the hot path.
    #[inline]
    pub fn texel_rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let index = (y as usize * self.width as usize + x as usize) * 4;
        (self.pixels[index], self.pixels[index + 1], self.pixels[index + 2])
    }

    /// Nearest-neighbor sample at a floating-point UV coordinate, wrapping modulo the
    /// texture dimensions with negative results folded non-negative before indexing.
    pub fn sample_nearest(&self, u: f32, v: f32) -> (u8, u8, u8) {
        let x = wrap_index(u, self.width);
        let y = wrap_index(v, self.height);
        self.texel_rgb(x, y)
    }
}

/// Folds a texture-space coordinate (already scaled by a dimension) into `[0, dim)`,
/// wrapping negative values to stay non-negative per the sampling contract.
#[inline]
pub(crate) fn wrap_index(coord: f32, dim: u32) -> u32 {
    if dim == 0 {
        return 0;
    }
    let dim_f = dim as f32;
    let wrapped = coord.rem_euclid(dim_f).floor();
    (wrapped as u32).min(dim - 1)
}
