//! Math helpers and glam re-exports.
//!
//! Rotations in sprig are plain `f32` angles in **degrees**, counter-clockwise,
//! and never normalized: a transform rotated by `350` and then by `20` reports
//! `370`. Only [`signed_angle`] and [`angle`] fold their result into a fixed
//! range, because they are derived from vector directions.

use std::f32::consts::{PI, TAU};

pub use glam::Vec2;

/// Rotate `value` counter-clockwise by `degrees`.
pub fn rotate(value: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(value)
}

/// Signed angle in degrees that rotates `from` onto `to`, in `(-180, 180]`.
///
/// Positive means counter-clockwise. Antiparallel vectors are the wrap point:
/// both `signed_angle(a, -a)` and `signed_angle(-a, a)` return `180`, so the
/// function is antisymmetric everywhere except exactly there.
pub fn signed_angle(from: Vec2, to: Vec2) -> f32 {
    // Wrap in radians so the `(-PI, PI]` boundary is decided before the
    // lossy degree conversion.
    let mut result = to.y.atan2(to.x) - from.y.atan2(from.x);
    if result > PI {
        result -= TAU;
    } else if result <= -PI {
        result += TAU;
    }
    result.to_degrees()
}

/// Unsigned angle in degrees between `a` and `b`, in `[0, 180]`.
pub fn angle(a: Vec2, b: Vec2) -> f32 {
    signed_angle(a, b).abs()
}
