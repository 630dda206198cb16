//! Face winding and normal flipping.

use meshforge_core::mesh::IndexElement;

/// Reverse the winding of every triangle by swapping its last two indices.
///
/// # Panics
///
/// If the index count is not divisible by three.
pub fn flip_face_winding_in_place<I: IndexElement>(indices: &mut [I]) {
    assert!(
        indices.len() % 3 == 0,
        "flip_face_winding_in_place(): index count {} is not divisible by 3",
        indices.len()
    );
    for triangle in indices.chunks_exact_mut(3) {
        triangle.swap(1, 2);
    }
}

/// Negate every normal.
pub fn flip_normals_in_place(normals: &mut [[f32; 3]]) {
    for normal in normals.iter_mut() {
        for component in normal.iter_mut() {
            *component = -*component;
        }
    }
}
