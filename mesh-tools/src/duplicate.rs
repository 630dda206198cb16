//! Expanding indexed data into non-indexed data.

use meshforge_core::mesh::{IndicesRef, MeshData};
use meshforge_core::profiling::profile_function;

use crate::interleave::{copy_attributes, interleaved_layout};

fn check_index(caller: &str, position: usize, index: u32, count: usize) -> usize {
    assert!(
        (index as usize) < count,
        "{caller}(): index {index} at position {position} out of range for {count} elements"
    );
    index as usize
}

/// Copy `data[index]` for every index, in index order.
///
/// # Panics
///
/// If an index is out of range for `data`.
pub fn duplicate<T: Copy>(indices: IndicesRef<'_>, data: &[T]) -> Vec<T> {
    indices
        .iter()
        .enumerate()
        .map(|(position, index)| data[check_index("duplicate", position, index, data.len())])
        .collect()
}

/// Type-erased [`duplicate`] over elements of `element_size` bytes.
///
/// # Panics
///
/// If `element_size` is zero, `data` isn't a whole number of elements, or an
/// index is out of range.
pub fn duplicate_erased(indices: IndicesRef<'_>, data: &[u8], element_size: usize) -> Vec<u8> {
    assert!(
        element_size > 0 && data.len() % element_size == 0,
        "duplicate_erased(): {} bytes is not a whole number of {}-byte elements",
        data.len(),
        element_size
    );
    let count = data.len() / element_size;
    let mut out = Vec::with_capacity(indices.len() * element_size);
    for (position, index) in indices.iter().enumerate() {
        let i = check_index("duplicate_erased", position, index, count);
        out.extend_from_slice(&data[i * element_size..(i + 1) * element_size]);
    }
    out
}

/// Turn an indexed mesh into a non-indexed one with one vertex per index.
///
/// The result is interleaved following the same rules as
/// [`interleaved_layout`](crate::interleaved_layout).
///
/// # Panics
///
/// If the mesh is not indexed or an index is out of range.
pub fn duplicate_mesh(mesh: &MeshData<'_>) -> MeshData<'static> {
    profile_function!();

    assert!(mesh.is_indexed(), "duplicate_mesh(): the mesh is not indexed");
    let indices = mesh.indices();
    let vertex_count = mesh.vertex_count();
    for (position, index) in indices.iter().enumerate() {
        check_index("duplicate_mesh", position, index, vertex_count as usize);
    }

    let count = indices.len() as u32;
    let mut out = interleaved_layout(mesh, count, &[]);
    let attributes = out.attributes().to_vec();
    copy_attributes(mesh, out.mutable_vertex_data(), &attributes, count, |vertex| {
        indices.get(vertex as usize)
    });

    log::debug!(
        "duplicate_mesh(): {} vertices expanded by {} indices",
        vertex_count,
        count
    );

    out
}
