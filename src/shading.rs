//! Fog and per-vertex lighting applied to a sampled texel before it is
//! written to the framebuffer.

/// Per-renderer fog and lighting configuration, set via `Renderer::set_fog`
/// and `Renderer::set_ambient_floor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingState {
    fog_enabled: bool,
    fog_near: f32,
    fog_far: f32,
    fog_color: (u8, u8, u8),
    ambient_floor: f32,
}

impl Default for ShadingState {
    fn default() -> ShadingState {
        ShadingState {
            fog_enabled: false,
            fog_near: 0.0,
            fog_far: 1.0,
            fog_color: (0, 0, 0),
            ambient_floor: 0.0,
        }
    }
}

impl ShadingState {
    pub fn set_fog(&mut self, enabled: bool, near: f32, far: f32, color: (u8, u8, u8)) {
        self.fog_enabled = enabled;
        self.fog_near = near;
        self.fog_far = far;
        self.fog_color = color;
    }

    pub fn set_ambient_floor(&mut self, floor: f32) {
        self.ambient_floor = floor.clamp(0.0, 1.0);
    }

    /// Applies lighting intensity and then fog to a sampled texel.
    ///
    /// `z_linear` is the reconstructed (non-NDC) depth along the camera axis,
    /// `intensity` is the screen-space-interpolated per-vertex brightness, and
    /// `col`/`row` feed the fog dither so adjacent pixels at the same depth
    /// don't band identically.
    pub fn apply(&self, rgb: (u8, u8, u8), z_linear: f32, intensity: f32, col: u32, row: u32) -> (u8, u8, u8) {
        let lit = apply_intensity(rgb, intensity.max(self.ambient_floor));
        if self.fog_enabled {
            apply_fog(lit, z_linear, self.fog_near, self.fog_far, self.fog_color, col, row)
        } else {
            lit
        }
    }
}

#[inline]
fn apply_intensity(rgb: (u8, u8, u8), intensity: f32) -> (u8, u8, u8) {
    let scale = intensity.clamp(0.0, 1.0);
    (
        (rgb.0 as f32 * scale).round() as u8,
        (rgb.1 as f32 * scale).round() as u8,
        (rgb.2 as f32 * scale).round() as u8,
    )
}

/// Linear fog with a fixed dither bias on the blend factor to break up banding.
fn apply_fog(
    rgb: (u8, u8, u8),
    z_linear: f32,
    near: f32,
    far: f32,
    color: (u8, u8, u8),
    col: u32,
    row: u32,
) -> (u8, u8, u8) {
    let t = ((z_linear - near) / (far - near)).clamp(0.0, 1.0);
    let dither = if (col + row) % 2 == 0 { 1.0 / 255.0 } else { -1.0 / 255.0 };
    let t = (t + dither).clamp(0.0, 1.0);
    (
        lerp_u8(rgb.0, color.0, t),
        lerp_u8(rgb.1, color.1, t),
        lerp_u8(rgb.2, color.2, t),
    )
}

#[inline]
fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}
