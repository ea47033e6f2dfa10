//! 2D vector helpers
//!
//! [`glam::Vec2`] is the vector type throughout the simulation. These are the
//! few derived operations the terrain and blast code lean on.

use glam::Vec2;

/// Unit vector in the direction of `v`; the zero vector stays zero
#[inline]
pub fn unit(v: Vec2) -> Vec2 {
    v.normalize_or_zero()
}

/// Normal of `v`, rotated a quarter turn: `(-y, x)`
#[inline]
pub fn normal(v: Vec2) -> Vec2 {
    v.perp()
}

/// Unit normal of a surface tangent
#[inline]
pub fn unit_normal(tangent: Vec2) -> Vec2 {
    unit(normal(tangent))
}

/// Clamp to [0, 1], mapping NaN to 0
#[inline]
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
