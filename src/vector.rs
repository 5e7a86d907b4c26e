//! 2D vector helpers used by the boundary bounce.
//!
//! Thin free functions over [`glam::Vec2`] so the reflection code reads the
//! same way the bounce rule is described: magnitude, unit vector, dot.

use glam::Vec2;

/// Smallest bias [`reflection_bias`] will return.
///
/// Keeps photons from skimming along the boundary when their velocity is
/// almost tangent to the normal.
pub const MIN_REFLECTION_BIAS: f32 = 0.03;

/// Euclidean length of `v`.
#[inline]
pub fn magnitude(v: Vec2) -> f32 {
    (v.x * v.x + v.y * v.y).sqrt()
}

/// Unit vector pointing along `v`.
///
/// `v` must be non-zero. A zero vector divides by zero and yields non-finite
/// components; photon velocities are never exactly zero so callers in this
/// crate do not guard against it.
#[inline]
pub fn normalize(v: Vec2) -> Vec2 {
    let length = magnitude(v);
    Vec2::new(v.x / length, v.y / length)
}

/// Dot product of `a` and `b`.
#[inline]
pub fn dot(a: Vec2, b: Vec2) -> f32 {
    a.x * b.x + a.y * b.y
}

/// Bias used by the photon bounce: `max(0.03, n · v)`.
#[inline]
pub fn reflection_bias(unit_normal: Vec2, unit_velocity: Vec2) -> f32 {
    dot(unit_normal, unit_velocity).max(MIN_REFLECTION_BIAS)
}
