//! Matrix and vector primitives
//!
//! Built atop `nalgebra`'s `Matrix4`/`Vector3`/`Vector4` storage and arithmetic.
//! This module adds the named free functions the geometry stage is written
//! against, rather than calling `nalgebra`'s own `Perspective3`/`Isometry3`
//! constructors directly, since their `w` convention is not guaranteed to line
//! up with the one fixed below.

pub use nalgebra::{Matrix4, Vector3, Vector4};

/// 4x4 identity matrix.
#[inline]
pub fn identity() -> Matrix4<f32> {
    Matrix4::identity()
}

/// Translation matrix for the given offset.
#[inline]
pub fn translation(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, x,
        0.0, 1.0, 0.0, y,
        0.0, 0.0, 1.0, z,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Rotation about the X axis, in radians, embedded in a 4x4 affine matrix.
#[inline]
pub fn rotation_x(theta: f32) -> Matrix4<f32> {
    let (s, c) = theta.sin_cos();
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, c, -s, 0.0,
        0.0, s, c, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Rotation about the Y axis, in radians, embedded in a 4x4 affine matrix.
#[inline]
pub fn rotation_y(theta: f32) -> Matrix4<f32> {
    let (s, c) = theta.sin_cos();
    Matrix4::new(
        c, 0.0, s, 0.0,
        0.0, 1.0, 0.0, 0.0,
        -s, 0.0, c, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Rotation about the Z axis, in radians, embedded in a 4x4 affine matrix.
#[inline]
pub fn rotation_z(theta: f32) -> Matrix4<f32> {
    let (s, c) = theta.sin_cos();
    Matrix4::new(
        c, -s, 0.0, 0.0,
        s, c, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Non-uniform scale matrix.
#[inline]
pub fn scale(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
    Matrix4::new(
        sx, 0.0, 0.0, 0.0,
        0.0, sy, 0.0, 0.0,
        0.0, 0.0, sz, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// OpenGL-style perspective projection.
///
/// `fov_y` is the vertical field of view in radians; `aspect` is width/height.
/// Post-divide NDC lands in `[-1, 1]^3`, and `w_clip = z_eye` is positive for
/// points in front of the camera. Degenerate inputs (`near == far`, `near == 0`
/// combined with a zero denominator) are not guarded against, matching the
/// spec's "undefined, need not be handled" contract.
#[inline]
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    let f = 1.0 / (fov_y * 0.5).tan();
    Matrix4::new(
        f / aspect, 0.0, 0.0, 0.0,
        0.0, f, 0.0, 0.0,
        0.0, 0.0, far / (far - near), -far * near / (far - near),
        0.0, 0.0, 1.0, 0.0,
    )
}

/// Matrix product `a * b`.
#[inline]
pub fn multiply(a: &Matrix4<f32>, b: &Matrix4<f32>) -> Matrix4<f32> {
    a * b
}

/// Transforms a homogeneous vector by a matrix: `m * v`.
#[inline]
pub fn multiply_vec4(m: &Matrix4<f32>, v: Vector4<f32>) -> Vector4<f32> {
    m * v
}
