//! Index generation for strip, loop and fan topologies.
//!
//! Each generator returns the indices turning `vertex_count` vertices of the
//! source topology into the equivalent list topology.

use meshforge_core::mesh::{MeshData, PrimitiveTopology};
use meshforge_core::profiling::profile_function;

/// Indices `offset..offset + vertex_count`.
///
/// # Panics
///
/// If the last index doesn't fit into [`u32`].
pub fn generate_trivial_indices(vertex_count: u32, offset: u32) -> Vec<u32> {
    let Some(end) = offset.checked_add(vertex_count) else {
        panic!("generate_trivial_indices(): {vertex_count} indices starting at {offset} overflow u32");
    };
    (offset..end).collect()
}

/// Line strip to line list: `0 1, 1 2, 2 3, ...`.
///
/// # Panics
///
/// If `vertex_count` is one.
pub fn generate_line_strip_indices(vertex_count: u32) -> Vec<u32> {
    assert!(
        vertex_count == 0 || vertex_count >= 2,
        "generate_line_strip_indices(): expected either zero or at least two vertices, got {vertex_count}"
    );
    let mut indices = Vec::with_capacity(2 * vertex_count.saturating_sub(1) as usize);
    for i in 1..vertex_count {
        indices.extend_from_slice(&[i - 1, i]);
    }
    indices
}

/// Line loop to line list: the strip plus a segment back to the first vertex.
///
/// # Panics
///
/// If `vertex_count` is one.
pub fn generate_line_loop_indices(vertex_count: u32) -> Vec<u32> {
    assert!(
        vertex_count == 0 || vertex_count >= 2,
        "generate_line_loop_indices(): expected either zero or at least two vertices, got {vertex_count}"
    );
    let mut indices = generate_line_strip_indices(vertex_count);
    if vertex_count > 0 {
        indices.extend_from_slice(&[vertex_count - 1, 0]);
    }
    indices
}

/// Triangle strip to triangle list.
///
/// Every other triangle has its first two vertices swapped so all triangles
/// keep the winding of the first one: `0 1 2, 2 1 3, 2 3 4, ...`.
///
/// # Panics
///
/// If `vertex_count` is one or two.
pub fn generate_triangle_strip_indices(vertex_count: u32) -> Vec<u32> {
    assert!(
        vertex_count == 0 || vertex_count >= 3,
        "generate_triangle_strip_indices(): expected either zero or at least three vertices, got {vertex_count}"
    );
    let mut indices = Vec::with_capacity(3 * vertex_count.saturating_sub(2) as usize);
    for i in 0..vertex_count.saturating_sub(2) {
        if i % 2 == 0 {
            indices.extend_from_slice(&[i, i + 1, i + 2]);
        } else {
            indices.extend_from_slice(&[i + 1, i, i + 2]);
        }
    }
    indices
}

/// Triangle fan to triangle list: `0 1 2, 0 2 3, 0 3 4, ...`.
///
/// # Panics
///
/// If `vertex_count` is one or two.
pub fn generate_triangle_fan_indices(vertex_count: u32) -> Vec<u32> {
    assert!(
        vertex_count == 0 || vertex_count >= 3,
        "generate_triangle_fan_indices(): expected either zero or at least three vertices, got {vertex_count}"
    );
    let mut indices = Vec::with_capacity(3 * vertex_count.saturating_sub(2) as usize);
    for i in 1..vertex_count.saturating_sub(1) {
        indices.extend_from_slice(&[0, i, i + 1]);
    }
    indices
}

/// Convert a strip, loop or fan mesh into the equivalent list mesh.
///
/// Line strips and loops become [`PrimitiveTopology::LineList`], triangle
/// strips and fans [`PrimitiveTopology::TriangleList`]. For an indexed mesh
/// the generated pattern is applied to its index buffer. The vertex data is
/// copied unchanged and the result has [`u32`] indices.
///
/// # Panics
///
/// If the topology is already a list (or points), or the vertex or index
/// count is too small for the topology.
pub fn generate_indices(mesh: &MeshData<'_>) -> MeshData<'static> {
    profile_function!();

    let count = if mesh.is_indexed() {
        mesh.index_count()
    } else {
        mesh.vertex_count()
    };
    let (topology, pattern) = match mesh.topology() {
        PrimitiveTopology::LineStrip => (PrimitiveTopology::LineList, generate_line_strip_indices(count)),
        PrimitiveTopology::LineLoop => (PrimitiveTopology::LineList, generate_line_loop_indices(count)),
        PrimitiveTopology::TriangleStrip => (
            PrimitiveTopology::TriangleList,
            generate_triangle_strip_indices(count),
        ),
        PrimitiveTopology::TriangleFan => (
            PrimitiveTopology::TriangleList,
            generate_triangle_fan_indices(count),
        ),
        other => panic!("generate_indices(): {other:?} is not a strip, loop or fan topology"),
    };

    let indices = if mesh.is_indexed() {
        let source = mesh.indices();
        pattern.iter().map(|&i| source.get(i as usize)).collect()
    } else {
        pattern
    };

    log::debug!(
        "generate_indices(): {} {:?} primitives -> {:?} with {} indices",
        mesh.primitive_count(),
        mesh.topology(),
        topology,
        indices.len()
    );

    let mut builder = MeshData::builder(topology)
        .indices_from(&indices)
        .vertices(mesh.vertex_data().to_vec(), mesh.attributes().to_vec())
        .vertex_count(mesh.vertex_count());
    if let Some(label) = mesh.label() {
        builder = builder.label(label);
    }
    builder.build()
}
