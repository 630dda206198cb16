//! Shared fixtures for the mesh tools integration tests.

use meshforge_core::mesh::{
    MeshAttributeData, MeshBuffer, MeshData, PrimitiveTopology, VertexAttributeFormat,
    VertexAttributeSemantic,
};

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Non-interleaved mesh with Float3 positions followed by Float2 texture
/// coordinates in one buffer.
pub fn planar_mesh(positions: &[[f32; 3]], uvs: &[[f32; 2]], indices: Option<&[u32]>) -> MeshData<'static> {
    assert_eq!(positions.len(), uvs.len());
    let count = positions.len() as u32;

    let mut bytes = bytemuck::cast_slice::<[f32; 3], u8>(positions).to_vec();
    bytes.extend_from_slice(bytemuck::cast_slice(uvs));

    let mut builder = MeshData::builder(PrimitiveTopology::TriangleList).vertices(
        MeshBuffer::from(bytes),
        vec![
            MeshAttributeData::packed(
                VertexAttributeSemantic::Position,
                VertexAttributeFormat::Float3,
                0,
                count,
            ),
            MeshAttributeData::packed(
                VertexAttributeSemantic::TexCoord0,
                VertexAttributeFormat::Float2,
                12 * count,
                count,
            ),
        ],
    );
    if let Some(indices) = indices {
        builder = builder.indices_from(indices);
    }
    builder.build()
}

/// Unit square in the XY plane as two triangles sharing an edge.
pub fn square() -> MeshData<'static> {
    planar_mesh(
        &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        Some(&[0, 1, 2, 0, 2, 3]),
    )
}

/// Deterministic pseudo-random bytes.
pub fn test_pattern(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

/// Deterministic pseudo-random floats in `[0, 1]`.
pub fn unit_floats(count: usize, seed: u32) -> Vec<f32> {
    test_pattern(count * 4, seed)
        .chunks_exact(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f32 / u32::MAX as f32)
        .collect()
}
