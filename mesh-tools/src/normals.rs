//! Normal generation for triangle meshes.
//!
//! Flat normals give every triangle its own face normal. Smooth normals sum
//! the face normals around each vertex, weighted by triangle area and by the
//! angle the triangle spans at that vertex, so long thin triangles don't skew
//! the result. Vertices at bit-identical positions share the sum, which keeps
//! shading continuous across texture seams and hard-split vertices.

use std::collections::HashMap;

use meshforge_core::math::{Vec3, angle_between, vec3_from_array, vec3_to_array};
use meshforge_core::mesh::{
    IndicesRef, MeshData, PrimitiveTopology, VertexAttributeFormat, VertexAttributeSemantic,
};
use meshforge_core::profiling::profile_function;

use crate::duplicate::duplicate_mesh;
use crate::generate_indices::generate_trivial_indices;
use crate::interleave::{ExtraAttribute, interleave_ref};

/// How [`generate_normals`] computes normals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalMode {
    /// One normal per face; indexed meshes are expanded first.
    Flat,
    /// Area- and angle-weighted per-vertex normals.
    #[default]
    Smooth,
}

/// One face normal per triangle, repeated for each of its three vertices.
///
/// Zero-area triangles get zero normals.
///
/// # Panics
///
/// If the position count is not divisible by three.
pub fn generate_flat_normals(positions: &[[f32; 3]]) -> Vec<[f32; 3]> {
    profile_function!();

    assert!(
        positions.len() % 3 == 0,
        "generate_flat_normals(): position count {} is not divisible by 3",
        positions.len()
    );

    let mut degenerate = 0;
    let mut normals = Vec::with_capacity(positions.len());
    for triangle in positions.chunks_exact(3) {
        let a = vec3_from_array(triangle[0]);
        let b = vec3_from_array(triangle[1]);
        let c = vec3_from_array(triangle[2]);
        let normal = match (b - a).cross(&(c - a)).try_normalize(0.0) {
            Some(normal) => vec3_to_array(normal),
            None => {
                degenerate += 1;
                [0.0; 3]
            }
        };
        normals.extend_from_slice(&[normal; 3]);
    }

    if degenerate > 0 {
        log::warn!("generate_flat_normals(): {degenerate} zero-area triangles got zero normals");
    }
    normals
}

/// Area- and angle-weighted per-vertex normals over indexed triangles.
///
/// Vertices not referenced by any triangle, and vertices whose weighted sum
/// cancels out, get zero normals.
///
/// # Panics
///
/// If the index count is not divisible by three or an index is out of range.
pub fn generate_smooth_normals(indices: IndicesRef<'_>, positions: &[[f32; 3]]) -> Vec<[f32; 3]> {
    profile_function!();

    assert!(
        indices.len() % 3 == 0,
        "generate_smooth_normals(): index count {} is not divisible by 3",
        indices.len()
    );

    // Every vertex accumulates into the first vertex at the same position.
    let mut first_at: HashMap<[u32; 3], usize> = HashMap::with_capacity(positions.len());
    let canonical: Vec<usize> = positions
        .iter()
        .enumerate()
        .map(|(i, position)| *first_at.entry(position.map(f32::to_bits)).or_insert(i))
        .collect();

    let mut accumulated = vec![Vec3::zeros(); positions.len()];
    let mut degenerate = 0;
    for position in (0..indices.len()).step_by(3) {
        let corners = [
            indices.get(position) as usize,
            indices.get(position + 1) as usize,
            indices.get(position + 2) as usize,
        ];
        for (offset, &index) in corners.iter().enumerate() {
            assert!(
                index < positions.len(),
                "generate_smooth_normals(): index {} at position {} out of range for {} vertices",
                index,
                position + offset,
                positions.len()
            );
        }

        let [a, b, c] = corners.map(|index| vec3_from_array(positions[index]));
        // Its length is twice the triangle area.
        let cross = (b - a).cross(&(c - a));
        if cross.norm_squared() == 0.0 {
            degenerate += 1;
            continue;
        }

        let angles = [
            angle_between(&(b - a), &(c - a)),
            angle_between(&(c - b), &(a - b)),
            angle_between(&(a - c), &(b - c)),
        ];
        for (&index, angle) in corners.iter().zip(angles) {
            accumulated[canonical[index]] += cross * angle;
        }
    }

    if degenerate > 0 {
        log::warn!("generate_smooth_normals(): skipped {degenerate} zero-area triangles");
    }

    canonical
        .iter()
        .map(|&id| accumulated[id].try_normalize(0.0).map_or([0.0; 3], vec3_to_array))
        .collect()
}

/// Copy of a triangle-list mesh with generated normals.
///
/// An existing `Float3` normal attribute is overwritten, otherwise a new one is
/// appended. The result is interleaved; [`NormalMode::Flat`] also makes it
/// non-indexed.
///
/// # Panics
///
/// If the mesh isn't a triangle list, has no positions, or already has a
/// normal attribute in a format other than `Float3`.
pub fn generate_normals(mesh: &MeshData<'_>, mode: NormalMode) -> MeshData<'static> {
    profile_function!();

    assert_eq!(
        mesh.topology(),
        PrimitiveTopology::TriangleList,
        "generate_normals(): expected a triangle list but got {:?}",
        mesh.topology()
    );
    let existing = mesh.attribute_id(VertexAttributeSemantic::Normal);
    if let Some(id) = existing {
        assert_eq!(
            mesh.attribute(id).format,
            VertexAttributeFormat::Float3,
            "generate_normals(): normal attribute {} has format {:?}, expected Float3",
            id,
            mesh.attribute(id).format
        );
    }

    let expanded;
    let source = if mode == NormalMode::Flat && mesh.is_indexed() {
        expanded = duplicate_mesh(mesh);
        &expanded
    } else {
        mesh
    };

    let positions = source.positions3d();
    let normals = match mode {
        NormalMode::Flat => generate_flat_normals(&positions),
        NormalMode::Smooth if source.is_indexed() => {
            generate_smooth_normals(source.indices(), &positions)
        }
        NormalMode::Smooth => {
            let indices = generate_trivial_indices(source.vertex_count(), 0);
            generate_smooth_normals(IndicesRef::from_slice(&indices), &positions)
        }
    };

    log::debug!(
        "generate_normals(): {:?} normals for {} vertices, {}",
        mode,
        normals.len(),
        if existing.is_some() { "overwriting" } else { "appending" }
    );

    let extras = match existing {
        Some(_) => Vec::new(),
        None => vec![ExtraAttribute::with_data(
            VertexAttributeSemantic::Normal,
            VertexAttributeFormat::Float3,
            &normals[..],
        )],
    };
    let mut out = match interleave_ref(source, &extras) {
        Ok(out) => out,
        Err(err) => unreachable!("normals were generated for every vertex: {err}"),
    };
    if let Some(id) = existing {
        out.write_attribute(id, &normals);
    }
    out
}
