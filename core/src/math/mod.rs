//! Math type aliases and helper functions.
//!
//! Vector types come from `nalgebra`; [`packing`] converts between floats and
//! the compact encodings used by packed vertex formats.

pub use nalgebra;

pub mod packing;

/// 2D vector (f32).
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector (f32).
pub type Vec4 = nalgebra::Vector4<f32>;

/// Build a [`Vec3`] from a `[x, y, z]` array.
#[inline]
pub fn vec3_from_array(a: [f32; 3]) -> Vec3 {
    Vec3::new(a[0], a[1], a[2])
}

/// Convert a [`Vec3`] to a `[x, y, z]` array.
#[inline]
pub fn vec3_to_array(v: Vec3) -> [f32; 3] {
    [v.x, v.y, v.z]
}

/// Unsigned angle between two vectors in radians, or zero if either is degenerate.
pub fn angle_between(a: &Vec3, b: &Vec3) -> f32 {
    let denom = a.norm() * b.norm();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}
