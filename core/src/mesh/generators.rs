//! Owned, interleaved test shapes with u32 indices.

use std::f32::consts::PI;

use super::data::{MeshAttributeData, MeshBuffer, MeshData, PrimitiveTopology};
use super::layout::{VertexAttributeFormat, VertexAttributeSemantic};

/// Sphere and grid vertex, 32 bytes.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PnuVertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

/// Quad vertex, 20 bytes.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PuVertex {
    position: [f32; 3],
    uv: [f32; 2],
}

fn position_normal_uv_attributes(vertex_count: u32) -> Vec<MeshAttributeData> {
    let stride = std::mem::size_of::<PnuVertex>() as u32;
    vec![
        MeshAttributeData::new(
            VertexAttributeSemantic::Position,
            VertexAttributeFormat::Float3,
            0,
            stride,
            vertex_count,
        ),
        MeshAttributeData::new(
            VertexAttributeSemantic::Normal,
            VertexAttributeFormat::Float3,
            12,
            stride,
            vertex_count,
        ),
        MeshAttributeData::new(
            VertexAttributeSemantic::TexCoord0,
            VertexAttributeFormat::Float2,
            24,
            stride,
            vertex_count,
        ),
    ]
}

/// UV sphere with `(rings + 1) * (segments + 1)` vertices.
///
/// The seam column and both pole rows repeat positions.
pub fn generate_sphere(radius: f32, segments: u32, rings: u32) -> MeshData<'static> {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for ring in 0..=rings {
        let theta = ring as f32 * PI / rings as f32;
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        for segment in 0..=segments {
            let phi = segment as f32 * 2.0 * PI / segments as f32;
            let sin_phi = phi.sin();
            let cos_phi = phi.cos();

            let x = sin_theta * cos_phi;
            let y = cos_theta;
            let z = sin_theta * sin_phi;

            vertices.push(PnuVertex {
                position: [x * radius, y * radius, z * radius],
                normal: [x, y, z],
                uv: [segment as f32 / segments as f32, ring as f32 / rings as f32],
            });
        }
    }

    // Counter-clockwise when seen from outside.
    for ring in 0..rings {
        for segment in 0..segments {
            let current = ring * (segments + 1) + segment;
            let next = current + segments + 1;

            indices.push(current);
            indices.push(current + 1);
            indices.push(next);

            indices.push(current + 1);
            indices.push(next + 1);
            indices.push(next);
        }
    }

    let vertex_count = vertices.len() as u32;
    MeshData::builder(PrimitiveTopology::TriangleList)
        .indices_from(&indices)
        .vertices(
            MeshBuffer::from_pod(&vertices),
            position_normal_uv_attributes(vertex_count),
        )
        .label("sphere")
        .build()
}

/// Two-triangle quad on the XY plane facing +Z, uv (0, 0) at the top left.
pub fn generate_quad(half_width: f32, half_height: f32) -> MeshData<'static> {
    let vertices = [
        PuVertex {
            position: [-half_width, -half_height, 0.0],
            uv: [0.0, 1.0],
        },
        PuVertex {
            position: [half_width, -half_height, 0.0],
            uv: [1.0, 1.0],
        },
        PuVertex {
            position: [half_width, half_height, 0.0],
            uv: [1.0, 0.0],
        },
        PuVertex {
            position: [-half_width, half_height, 0.0],
            uv: [0.0, 0.0],
        },
    ];

    let indices: [u32; 6] = [0, 1, 2, 2, 3, 0];
    let stride = std::mem::size_of::<PuVertex>() as u32;

    MeshData::builder(PrimitiveTopology::TriangleList)
        .indices_from(&indices)
        .vertices(
            MeshBuffer::from_pod(&vertices),
            vec![
                MeshAttributeData::new(
                    VertexAttributeSemantic::Position,
                    VertexAttributeFormat::Float3,
                    0,
                    stride,
                    4,
                ),
                MeshAttributeData::new(
                    VertexAttributeSemantic::TexCoord0,
                    VertexAttributeFormat::Float2,
                    12,
                    stride,
                    4,
                ),
            ],
        )
        .label("quad")
        .build()
}

/// Grid on the XZ plane facing +Y, `subdivisions` cells per side over
/// `[-half_size, half_size]`.
pub fn generate_grid(half_size: f32, subdivisions: u32) -> MeshData<'static> {
    let cells = subdivisions.max(1);
    let side = cells + 1;
    let mut vertices = Vec::with_capacity((side * side) as usize);
    let mut indices = Vec::with_capacity((cells * cells * 6) as usize);

    for row in 0..side {
        let v = row as f32 / cells as f32;
        for column in 0..side {
            let u = column as f32 / cells as f32;
            vertices.push(PnuVertex {
                position: [(u * 2.0 - 1.0) * half_size, 0.0, (v * 2.0 - 1.0) * half_size],
                normal: [0.0, 1.0, 0.0],
                uv: [u, v],
            });
        }
    }

    for row in 0..cells {
        for column in 0..cells {
            let current = row * side + column;
            let below = current + side;

            indices.extend_from_slice(&[current, below, current + 1]);
            indices.extend_from_slice(&[current + 1, below, below + 1]);
        }
    }

    let vertex_count = vertices.len() as u32;
    MeshData::builder(PrimitiveTopology::TriangleList)
        .indices_from(&indices)
        .vertices(
            MeshBuffer::from_pod(&vertices),
            position_normal_uv_attributes(vertex_count),
        )
        .label("grid")
        .build()
}
