//! Integration tests for the mesh tools.
//!
//! # Test Categories
//!
//! - **Deduplication Tests**: exact and fuzzy vertex merging, remap invariants
//! - **Compression Tests**: index narrowing and vertex range compaction
//! - **Interleaving Tests**: layout invariants and zero-copy paths
//! - **Pipeline Tests**: the tools chained on generated meshes
//!
//! ```bash
//! cargo test -p meshforge-mesh-tools --test pipeline_tests
//! ```

mod common;

use rstest::rstest;

use common::{init_logging, planar_mesh, square, test_pattern, unit_floats};
use meshforge_core::math::{Vec3, vec3_from_array};
use meshforge_core::mesh::generators::{generate_grid, generate_sphere};
use meshforge_core::mesh::{
    DataFlags, IndexFormat, IndicesRef, MeshData, PrimitiveTopology, VertexAttributeFormat,
    VertexAttributeSemantic,
};
use meshforge_mesh_tools::{
    ExtraAttribute, MeshToolsError, NormalMode, compress_indices, compress_indices_as,
    compress_mesh_indices, duplicate_mesh, flip_face_winding_in_place, generate_indices,
    generate_normals, interleave, interleave_ref, interleaved_layout, is_interleaved,
    remove_duplicates, remove_duplicates_fuzzy_in_place, remove_duplicates_fuzzy_indexed_in_place,
    remove_duplicates_in_place,
};

// ============================================================================
// Deduplication Tests
// ============================================================================

/// Close vertex pairs collapse onto the first vertex of each pair.
#[test]
fn test_fuzzy_dedup_scenario() {
    init_logging();

    let mut indices = [3u8, 2, 0, 1, 2, 3];
    let mut positions = [[1.0f32, 0.0], [2.0, 1.0], [0.0, 4.0], [1.0, 5.0]];

    let unique =
        remove_duplicates_fuzzy_indexed_in_place(&mut indices, &mut positions, 2.0).unwrap();

    assert_eq!(unique, 2);
    assert_eq!(&positions[..unique], &[[1.0, 0.0], [0.0, 4.0]]);
    assert_eq!(indices, [1, 1, 0, 0, 1, 1]);
}

/// Jittered copies of well separated points collapse back onto those points.
///
/// Copies differ from their point by less than half the tolerance in every
/// component, at random places relative to the grid.
#[rstest]
#[case::coarse(1, 0.5)]
#[case::fine(2, 0.01)]
#[case::tiny(3, 1.0e-4)]
fn test_fuzzy_dedup_remap_properties(#[case] seed: u32, #[case] epsilon: f32) {
    init_logging();

    const POINTS: usize = 50;
    const COPIES: usize = 4;
    let noise = unit_floats(POINTS * 3 * (1 + COPIES), seed);
    let mut noise = noise.chunks_exact(3);

    let mut data: Vec<[f32; 3]> = (0..POINTS)
        .map(|p| {
            let n = noise.next().unwrap();
            [
                (p % 5) as f32 * 10.0 + n[0],
                (p / 5 % 5) as f32 * 10.0 + n[1],
                (p / 25) as f32 * 10.0 + n[2],
            ]
        })
        .collect();
    let mut point_of: Vec<usize> = (0..POINTS).collect();
    for copy in 0..POINTS * COPIES {
        let point = copy % POINTS;
        let n = noise.next().unwrap();
        let base = data[point];
        data.push([
            base[0] + (n[0] - 0.5) * 0.8 * epsilon,
            base[1] + (n[1] - 0.5) * 0.8 * epsilon,
            base[2] + (n[2] - 0.5) * 0.8 * epsilon,
        ]);
        point_of.push(point);
    }
    let original = data.clone();

    let (remap, unique) = remove_duplicates_fuzzy_in_place(&mut data, epsilon);

    assert_eq!(unique, POINTS);
    assert_eq!(remap.len(), original.len());
    for (i, &id) in remap.iter().enumerate() {
        assert!((id as usize) < unique && id as usize <= i);
        assert_eq!(id, remap[point_of[i]], "vertex {i} {:?}", original[i]);
    }
    assert_eq!(&data[..unique], &original[..POINTS]);
}

/// Every remap entry points at an earlier-or-same, byte-identical survivor.
#[rstest]
#[case::bytes(1, 64)]
#[case::shorts(2, 300)]
#[case::vec3(12, 500)]
fn test_exact_dedup_remap_invariants(#[case] element_size: usize, #[case] count: usize) {
    init_logging();

    let original: Vec<u8> = test_pattern(element_size * count, element_size as u32)
        .into_iter()
        .map(|b| b % 2)
        .collect();
    let mut data = original.clone();

    let (remap, unique) = remove_duplicates_in_place(&mut data, element_size);

    assert_eq!(remap.len(), count);
    assert!(unique >= 1 && unique <= count);
    for (i, &id) in remap.iter().enumerate() {
        let id = id as usize;
        assert!(id <= i && id < unique, "remap[{i}] = {id}, unique {unique}");
        assert_eq!(
            &data[id * element_size..(id + 1) * element_size],
            &original[i * element_size..(i + 1) * element_size]
        );
    }
    for a in 0..unique {
        for b in a + 1..unique {
            assert_ne!(
                &data[a * element_size..(a + 1) * element_size],
                &data[b * element_size..(b + 1) * element_size]
            );
        }
    }
}

#[test]
fn test_remove_duplicates_restores_expanded_grid() {
    init_logging();

    let grid = generate_grid(1.0, 4);
    let expanded = duplicate_mesh(&grid);
    assert!(!expanded.is_indexed());
    assert_eq!(expanded.vertex_count(), 4 * 4 * 6);

    let deduplicated = remove_duplicates(&expanded);
    assert_eq!(deduplicated.vertex_count(), grid.vertex_count());
    assert_eq!(deduplicated.index_format(), Some(IndexFormat::Uint32));
    assert_eq!(deduplicated.label(), Some("grid"));

    // Same triangles, same positions.
    let original = grid.positions3d();
    let positions = deduplicated.positions3d();
    for (a, b) in grid.indices_u32().iter().zip(deduplicated.indices_u32()) {
        assert_eq!(original[*a as usize], positions[b as usize]);
    }
}

// ============================================================================
// Compression Tests
// ============================================================================

#[test]
fn test_compress_mesh_indices_scenario() {
    init_logging();

    let positions: Vec<[f32; 3]> = (0..103).map(|i| [i as f32, 0.0, 0.0]).collect();
    let uvs: Vec<[f32; 2]> = (0..103).map(|i| [0.0, i as f32]).collect();
    let mesh = planar_mesh(&positions, &uvs, Some(&[102, 101, 100, 101, 102]));

    let compressed = compress_mesh_indices(&mesh, IndexFormat::Uint16);

    assert_eq!(compressed.index_format(), Some(IndexFormat::Uint16));
    assert_eq!(compressed.indices_u32(), vec![2, 1, 0, 1, 2]);
    assert_eq!(compressed.vertex_count(), 3);
    assert_eq!(
        compressed.positions3d(),
        vec![[100.0, 0.0, 0.0], [101.0, 0.0, 0.0], [102.0, 0.0, 0.0]]
    );
    assert_eq!(
        compressed.texture_coordinates2d(),
        vec![[0.0, 100.0], [0.0, 101.0], [0.0, 102.0]]
    );
}

#[rstest]
#[case::fits_u8(&[0, 200, 255], IndexFormat::Uint8)]
#[case::needs_u16(&[0, 256], IndexFormat::Uint16)]
#[case::needs_u32(&[65_536, 3], IndexFormat::Uint32)]
fn test_compress_indices_narrowest(#[case] indices: &[u32], #[case] expected: IndexFormat) {
    let (bytes, format) = compress_indices(IndicesRef::from_slice(indices), IndexFormat::Uint8, 0);
    assert_eq!(format, expected);
    assert_eq!(bytes.len(), indices.len() * expected.size());
    assert_eq!(IndicesRef::new(format, &bytes).to_u32_vec(), indices.to_vec());
}

#[test]
fn test_compress_indices_as_overflow_is_recoverable() {
    let err = compress_indices_as::<u8>(IndicesRef::from(&[10u32, 300, 20]), 0).unwrap_err();
    assert_eq!(
        err,
        MeshToolsError::IndexOverflow {
            position: 1,
            value: 300,
            format: IndexFormat::Uint8,
        }
    );

    let narrowed = compress_indices_as::<u8>(IndicesRef::from(&[110u32, 300, 120]), 100).unwrap();
    assert_eq!(narrowed, vec![10, 200, 20]);
}

// ============================================================================
// Interleaving Tests
// ============================================================================

#[rstest]
#[case::no_extras(vec![])]
#[case::normal(vec![ExtraAttribute::new(VertexAttributeSemantic::Normal, VertexAttributeFormat::Float3)])]
#[case::padded(vec![
    ExtraAttribute::padding(4),
    ExtraAttribute::new(VertexAttributeSemantic::Color, VertexAttributeFormat::Unorm8x4),
    ExtraAttribute::padding(2),
])]
fn test_interleave_is_interleaved(#[case] extras: Vec<ExtraAttribute<'static>>) {
    init_logging();

    let mesh = interleave(square(), &extras).unwrap();
    assert!(is_interleaved(&mesh));
    let added = extras
        .iter()
        .filter(|extra| !matches!(extra, ExtraAttribute::Padding(_)))
        .count();
    assert_eq!(mesh.attribute_count(), 2 + added);
    assert_eq!(mesh.positions3d()[2], [1.0, 1.0, 0.0]);
    assert_eq!(mesh.texture_coordinates2d()[3], [0.0, 1.0]);
    assert_eq!(mesh.indices_u32(), vec![0, 1, 2, 0, 2, 3]);
}

/// A borrowed interleaved mesh is copied byte for byte.
#[test]
fn test_interleave_borrowed_copies_exact_bytes() {
    let sphere = generate_sphere(1.0, 8, 4);
    let borrowed = MeshData::builder(PrimitiveTopology::TriangleList)
        .vertices(sphere.vertex_data(), sphere.attributes().to_vec())
        .build();
    assert!(!borrowed.vertex_data_flags().contains(DataFlags::OWNED));

    let layout = interleaved_layout(&borrowed, 0, &[]);
    assert_eq!(layout.attribute(0).stride, sphere.attribute(0).stride);

    let copy = interleave(borrowed, &[]).unwrap();
    assert!(copy.vertex_data_flags().contains(DataFlags::OWNED));
    assert_eq!(copy.vertex_data(), sphere.vertex_data());
    assert_eq!(copy.attributes(), sphere.attributes());
}

#[test]
fn test_interleave_ref_leaves_source_alone() {
    let source = square();
    let before = source.vertex_data().to_vec();

    let normals = [[0.0f32, 0.0, 1.0]; 4];
    let out = interleave_ref(
        &source,
        &[ExtraAttribute::with_data(
            VertexAttributeSemantic::Normal,
            VertexAttributeFormat::Float3,
            &normals,
        )],
    )
    .unwrap();

    assert_eq!(source.vertex_data(), &before[..]);
    assert_eq!(out.normals(), normals.to_vec());
    assert_eq!(out.attribute(0).stride, 32);
}

// ============================================================================
// Pipeline Tests
// ============================================================================

/// Deduplicate, compress, then interleave a triangle soup.
#[test]
fn test_dedup_compress_interleave_pipeline() {
    init_logging();

    let soup = duplicate_mesh(&square());
    assert_eq!(soup.vertex_count(), 6);

    let deduplicated = remove_duplicates(&soup);
    assert_eq!(deduplicated.vertex_count(), 4);

    let compressed = compress_mesh_indices(&deduplicated, IndexFormat::Uint8);
    assert_eq!(compressed.index_format(), Some(IndexFormat::Uint8));
    assert_eq!(compressed.indices_u32(), vec![0, 1, 2, 0, 2, 3]);

    let mesh = interleave(
        compressed,
        &[ExtraAttribute::new(VertexAttributeSemantic::Normal, VertexAttributeFormat::Float3)],
    )
    .unwrap();
    assert!(is_interleaved(&mesh));
    assert_eq!(mesh.attribute(0).stride, 32);
    assert_eq!(mesh.normals(), vec![[0.0; 3]; 4]);
}

#[test]
fn test_generate_smooth_normals_on_sphere() {
    init_logging();

    let sphere = generate_sphere(2.0, 32, 16);
    let mesh = generate_normals(&sphere, NormalMode::Smooth);

    assert_eq!(mesh.attribute_count(), sphere.attribute_count());
    for (position, normal) in mesh.positions3d().iter().zip(mesh.normals()) {
        // Pole vertices may only touch zero-area triangles.
        if position[1].abs() > 1.99 {
            continue;
        }
        let normal = vec3_from_array(normal);
        assert!((normal.norm() - 1.0).abs() < 1e-4);
        let radial = vec3_from_array(*position).normalize();
        assert!(normal.dot(&radial) > 0.95, "{normal:?} vs {radial:?}");
    }
}

#[test]
fn test_generate_flat_normals_on_grid() {
    init_logging();

    let mesh = generate_normals(&generate_grid(1.0, 3), NormalMode::Flat);

    assert!(!mesh.is_indexed());
    assert_eq!(mesh.vertex_count(), 3 * 3 * 6);
    for normal in mesh.normals() {
        assert!((vec3_from_array(normal) - Vec3::y()).norm() < 1e-5);
    }
}

/// Converting a fan to a list and flipping it makes its normals point the
/// other way.
#[test]
fn test_fan_to_list_then_flip() {
    init_logging();

    let fan = planar_mesh(
        &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        &[[0.0; 2]; 4],
        None,
    );
    let fan = MeshData::builder(PrimitiveTopology::TriangleFan)
        .vertices(fan.vertex_data(), fan.attributes().to_vec())
        .build();

    let list = generate_indices(&fan);
    assert_eq!(list.topology(), PrimitiveTopology::TriangleList);
    let front = generate_normals(&list, NormalMode::Smooth).normals();
    assert!(front.iter().all(|n| n[2] > 0.99));

    let mut indices = list.indices_u32();
    flip_face_winding_in_place(&mut indices);
    let flipped = MeshData::builder(PrimitiveTopology::TriangleList)
        .indices_from(&indices)
        .vertices(list.vertex_data(), list.attributes().to_vec())
        .build();
    let back = generate_normals(&flipped, NormalMode::Smooth).normals();
    assert!(back.iter().all(|n| n[2] < -0.99));
}
