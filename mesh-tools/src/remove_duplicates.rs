//! Vertex deduplication, exact and with tolerance.
//!
//! All variants keep the first occurrence of every distinct vertex, compact
//! the survivors to the front of the buffer in the order they were first seen
//! and return a remap table with one entry per input vertex. Since survivors
//! keep their relative order, `remap[i] <= i` always holds.
//!
//! Fuzzy deduplication quantizes every component to a grid of `epsilon`-sized
//! cells. A single grid would split values sitting close to either side of a
//! cell boundary, so the grid is repeated with every combination of axes
//! shifted by half a cell and the groups found by all passes are joined.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use meshforge_core::mesh::{IndexElement, IndexFormat, MeshData, MeshIndexData};
use meshforge_core::profiling::{profile_function, profile_plot, profile_scope};

use crate::error::{MeshToolsError, Result};
use crate::interleave::interleave_ref;

/// Move `survivors` to the front of `data`, keeping their order.
///
/// `survivors` must be strictly increasing.
fn compact<T: Copy>(data: &mut [T], survivors: &[usize]) {
    for (new, &old) in survivors.iter().enumerate() {
        if new != old {
            data[new] = data[old];
        }
    }
}

/// Group `count` items by key, returning the remap table and the survivors.
fn group_by_key<K: Hash + Eq>(count: usize, key: impl Fn(usize) -> K) -> (Vec<u32>, Vec<usize>) {
    let mut unique: HashMap<K, u32> = HashMap::with_capacity(count);
    let mut remap = Vec::with_capacity(count);
    let mut survivors = Vec::new();
    for i in 0..count {
        let next = survivors.len() as u32;
        let id = *unique.entry(key(i)).or_insert_with(|| {
            survivors.push(i);
            next
        });
        remap.push(id);
    }
    (remap, survivors)
}

fn check_index_capacity<I: IndexElement>(vertex_count: usize) -> Result<()> {
    if vertex_count > I::FORMAT.max_value() as usize {
        return Err(MeshToolsError::IndexTypeTooSmall {
            format: I::FORMAT,
            vertex_count,
        });
    }
    Ok(())
}

fn check_indices<I: IndexElement>(caller: &str, indices: &[I], vertex_count: usize) {
    for (position, index) in indices.iter().enumerate() {
        assert!(
            (index.to_u32() as usize) < vertex_count,
            "{caller}(): index {} at position {} out of range for {} vertices",
            index.to_u32(),
            position,
            vertex_count
        );
    }
}

fn remap_indices<I: IndexElement>(indices: &mut [I], remap: &[u32]) {
    for index in indices.iter_mut() {
        let mapped = remap[index.to_u32() as usize];
        // Survivors only move towards the front, so the value never grows.
        *index = I::from_u32(mapped)
            .unwrap_or_else(|| unreachable!("remapped index {mapped} exceeds {:?}", I::FORMAT));
    }
}

/// Remove byte-wise duplicates from `data`, split into `element_size` chunks.
///
/// Returns the remap table and the number of unique elements, which now
/// occupy `data[..unique * element_size]`. The rest of `data` is left in an
/// unspecified state.
///
/// # Panics
///
/// If `element_size` is zero or `data` isn't a whole number of elements.
pub fn remove_duplicates_in_place(data: &mut [u8], element_size: usize) -> (Vec<u32>, usize) {
    profile_function!();

    assert!(
        element_size > 0 && data.len() % element_size == 0,
        "remove_duplicates_in_place(): {} bytes is not a whole number of {}-byte elements",
        data.len(),
        element_size
    );
    let count = data.len() / element_size;

    let (remap, survivors) = {
        let elements: &[u8] = data;
        group_by_key(count, |i| &elements[i * element_size..(i + 1) * element_size])
    };
    for (new, &old) in survivors.iter().enumerate() {
        if new != old {
            data.copy_within(old * element_size..(old + 1) * element_size, new * element_size);
        }
    }

    log::trace!(
        "remove_duplicates_in_place(): {} -> {} elements of {} bytes",
        count,
        survivors.len(),
        element_size
    );
    (remap, survivors.len())
}

/// [`remove_duplicates_in_place`], additionally rewriting `indices` to the
/// compacted elements. Returns the number of unique elements.
///
/// # Errors
///
/// [`MeshToolsError::IndexTypeTooSmall`] if `I` can't address every element.
///
/// # Panics
///
/// Same as [`remove_duplicates_in_place`], or if an index is out of range.
pub fn remove_duplicates_indexed_in_place<I: IndexElement>(
    indices: &mut [I],
    data: &mut [u8],
    element_size: usize,
) -> Result<usize> {
    assert!(
        element_size > 0 && data.len() % element_size == 0,
        "remove_duplicates_indexed_in_place(): {} bytes is not a whole number of {}-byte elements",
        data.len(),
        element_size
    );
    let count = data.len() / element_size;
    check_index_capacity::<I>(count)?;
    check_indices("remove_duplicates_indexed_in_place", indices, count);

    let (remap, unique) = remove_duplicates_in_place(data, element_size);
    remap_indices(indices, &remap);
    Ok(unique)
}

/// Remove duplicate vertices from a whole mesh.
///
/// Vertices are compared byte-wise across all attributes after interleaving,
/// so two vertices merge only if every attribute matches. The result is
/// interleaved and indexed: an indexed input keeps its index format with the
/// indices rewritten, a non-indexed input gets [`IndexFormat::Uint32`]
/// indices.
///
/// # Panics
///
/// If the mesh has no attributes or an index is out of range.
pub fn remove_duplicates(mesh: &MeshData<'_>) -> MeshData<'static> {
    profile_function!();

    assert!(
        mesh.attribute_count() > 0,
        "remove_duplicates(): the mesh has no attributes"
    );

    let mut interleaved = match interleave_ref(mesh, &[]) {
        Ok(interleaved) => interleaved,
        Err(err) => unreachable!("interleaving without extras failed: {err}"),
    };
    let attributes = interleaved.attributes().to_vec();
    let stride = attributes[0].stride as usize;
    let vertex_count = interleaved.vertex_count() as usize;

    let mut vertices = interleaved.release_vertex_data().into_vec();
    vertices.resize(stride * vertex_count, 0);
    let (remap, unique) = if stride == 0 {
        // Zero-sized vertices are all equal.
        (vec![0; vertex_count], vertex_count.min(1))
    } else {
        remove_duplicates_in_place(&mut vertices, stride)
    };
    vertices.truncate(stride * unique);

    let (index_bytes, index_desc) = match interleaved.index_descriptor() {
        Some(desc) => {
            let old = interleaved.indices_u32();
            check_indices("remove_duplicates", &old, vertex_count);
            let mut bytes = Vec::with_capacity(old.len() * desc.format.size());
            for index in old {
                let mapped = remap[index as usize];
                match desc.format {
                    IndexFormat::Uint8 => bytes.push(mapped as u8),
                    IndexFormat::Uint16 => bytes.extend_from_slice(bytemuck::bytes_of(&(mapped as u16))),
                    IndexFormat::Uint32 => bytes.extend_from_slice(bytemuck::bytes_of(&mapped)),
                }
            }
            (bytes, MeshIndexData::tight(desc.format, desc.count))
        }
        None => (
            bytemuck::cast_slice(&remap).to_vec(),
            MeshIndexData::tight(IndexFormat::Uint32, remap.len() as u32),
        ),
    };

    log::debug!(
        "remove_duplicates(): {} -> {} vertices of {} bytes",
        vertex_count,
        unique,
        stride
    );
    profile_plot!("remove_duplicates_unique", unique);

    let attributes = attributes
        .into_iter()
        .map(|mut attr| {
            attr.vertex_count = unique as u32;
            attr
        })
        .collect();
    let mut builder = MeshData::builder(mesh.topology())
        .indices(index_bytes, index_desc)
        .vertices(vertices, attributes)
        .vertex_count(unique as u32);
    if let Some(label) = mesh.label() {
        builder = builder.label(label);
    }
    builder.build()
}

/// A vertex component type supported by fuzzy deduplication.
pub trait FuzzyComponent: Copy + PartialOrd + Debug {
    /// Widen to `f64` for quantization.
    fn to_f64(self) -> f64;
}

impl FuzzyComponent for f32 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl FuzzyComponent for f64 {
    fn to_f64(self) -> f64 {
        self
    }
}

impl FuzzyComponent for i32 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

/// Tolerance of `2^-bits`.
pub fn epsilon_from_bits(bits: u32) -> f64 {
    (-(bits as f64)).exp2()
}

/// Remove vertices equal within `epsilon` in every component.
///
/// Returns the remap table and the number of unique vertices, which now
/// occupy `data[..unique]` in the order they were first seen.
///
/// Each pass puts every vertex into a grid cell and merges the vertices that
/// share one, so a single merge only ever joins vertices less than `epsilon`
/// apart in every component. There is one pass for every combination of axes
/// shifted by half a cell, which guarantees that vertices less than
/// `epsilon / 2` apart in every component end up merged, also when they
/// straddle cell boundaries along several axes. Merging is transitive, so a
/// chain of close vertices can join vertices further apart.
///
/// Infinite and NaN components are compared by their exact bits and never
/// merge with finite values.
///
/// # Panics
///
/// If `epsilon` is not positive or a vertex has more than 16 components.
pub fn remove_duplicates_fuzzy_in_place<T: FuzzyComponent, const N: usize>(
    data: &mut [[T; N]],
    epsilon: T,
) -> (Vec<u32>, usize) {
    profile_function!();

    let epsilon = epsilon.to_f64();
    assert!(
        epsilon > 0.0,
        "remove_duplicates_fuzzy_in_place(): epsilon must be positive, got {epsilon}"
    );
    assert!(
        N <= 16,
        "remove_duplicates_fuzzy_in_place(): expected at most 16 components, got {N}"
    );
    if data.is_empty() {
        return (Vec::new(), 0);
    }

    let mut min = [f64::INFINITY; N];
    let mut max = [f64::NEG_INFINITY; N];
    for vertex in data.iter() {
        for d in 0..N {
            let value = vertex[d].to_f64();
            if value.is_finite() {
                min[d] = min[d].min(value);
                max[d] = max[d].max(value);
            }
        }
    }
    // Dimensions without any finite value.
    for d in 0..N {
        if min[d] > max[d] {
            min[d] = 0.0;
            max[d] = 0.0;
        }
    }
    // Keep cell coordinates within the exactly representable integer range.
    let range = (0..N).map(|d| max[d] - min[d]).fold(0.0, f64::max);
    let epsilon = epsilon.max(range / (1u64 << 52) as f64);

    let cell = |vertex: &[T; N], shifted: u32| {
        let mut cell = [0i64; N];
        let mut bits = [0u64; N];
        for d in 0..N {
            let value = vertex[d].to_f64();
            if value.is_finite() {
                let shift = if shifted & (1 << d) != 0 { epsilon * 0.5 } else { 0.0 };
                cell[d] = ((value + shift - min[d]) / epsilon).floor() as i64;
            } else {
                bits[d] = value.to_bits();
            }
        }
        (cell, bits)
    };

    // Every group's root is its earliest member.
    let mut parent: Vec<usize> = (0..data.len()).collect();
    for shifted in 0..(1u32 << N) {
        profile_scope!("fuzzy_pass");

        let mut first_in_cell = HashMap::with_capacity(data.len());
        let mut merged = 0;
        for (i, vertex) in data.iter().enumerate() {
            let first = *first_in_cell.entry(cell(vertex, shifted)).or_insert(i);
            if first != i && union(&mut parent, first, i) {
                merged += 1;
            }
        }
        log::trace!("remove_duplicates_fuzzy_in_place(): shift mask {shifted:#b} merged {merged} groups");
    }

    let mut survivors = Vec::new();
    let mut group_ids = vec![0u32; data.len()];
    let mut remap = Vec::with_capacity(data.len());
    for i in 0..data.len() {
        let root = find(&mut parent, i);
        if root == i {
            group_ids[i] = survivors.len() as u32;
            survivors.push(i);
        }
        remap.push(group_ids[root]);
    }
    compact(data, &survivors);

    log::debug!(
        "remove_duplicates_fuzzy_in_place(): {} -> {} vertices, epsilon {}",
        data.len(),
        survivors.len(),
        epsilon
    );
    (remap, survivors.len())
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Join the groups of `a` and `b`, keeping the smaller root. Returns whether
/// they were separate.
fn union(parent: &mut [usize], a: usize, b: usize) -> bool {
    let (a, b) = (find(parent, a), find(parent, b));
    if a == b {
        return false;
    }
    parent[a.max(b)] = a.min(b);
    true
}

/// [`remove_duplicates_fuzzy_in_place`], additionally rewriting `indices` to
/// the compacted vertices. Returns the number of unique vertices.
///
/// # Errors
///
/// [`MeshToolsError::IndexTypeTooSmall`] if `I` can't address every vertex.
/// Nothing is modified in that case.
///
/// # Panics
///
/// If `epsilon` is not positive or an index is out of range.
pub fn remove_duplicates_fuzzy_indexed_in_place<I: IndexElement, T: FuzzyComponent, const N: usize>(
    indices: &mut [I],
    data: &mut [[T; N]],
    epsilon: T,
) -> Result<usize> {
    check_index_capacity::<I>(data.len())?;
    check_indices("remove_duplicates_fuzzy_indexed_in_place", indices, data.len());

    let (remap, unique) = remove_duplicates_fuzzy_in_place(data, epsilon);
    remap_indices(indices, &remap);
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use meshforge_core::mesh::{
        MeshAttributeData, MeshBuffer, PrimitiveTopology, VertexAttributeFormat,
        VertexAttributeSemantic,
    };

    use super::*;

    #[test]
    fn test_exact_in_place() {
        let mut data = [-15i32, 32, 24, -15, 15, 7541, 24, 32];
        let (remap, unique) =
            remove_duplicates_in_place(bytemuck::cast_slice_mut(&mut data), std::mem::size_of::<i32>());
        assert_eq!(unique, 5);
        assert_eq!(remap, vec![0, 1, 2, 0, 3, 4, 2, 1]);
        assert_eq!(&data[..unique], &[-15, 32, 24, 15, 7541]);
    }

    #[test]
    fn test_exact_indexed_in_place() {
        let mut data = [-15i32, 32, 24, -15, 15, 7541, 24, 32];
        let mut indices = [3u8, 2, 0, 1, 7, 6, 5, 4];
        let unique = remove_duplicates_indexed_in_place(
            &mut indices,
            bytemuck::cast_slice_mut(&mut data),
            4,
        )
        .unwrap();
        assert_eq!(unique, 5);
        assert_eq!(indices, [0, 2, 0, 1, 1, 2, 4, 3]);
    }

    #[test]
    fn test_exact_indexed_type_too_small() {
        let mut data = vec![0u8; 256];
        let mut indices = [0u8, 255];
        let err = remove_duplicates_indexed_in_place(&mut indices, &mut data, 1).unwrap_err();
        assert_eq!(
            err,
            MeshToolsError::IndexTypeTooSmall {
                format: IndexFormat::Uint8,
                vertex_count: 256,
            }
        );
        assert_eq!(indices, [0, 255]);
    }

    #[test]
    #[should_panic(expected = "remove_duplicates_in_place(): 5 bytes is not a whole number of 2-byte elements")]
    fn test_exact_bad_size() {
        remove_duplicates_in_place(&mut [0u8; 5], 2);
    }

    #[test]
    fn test_fuzzy_scenario() {
        let mut positions = [[1.0f32, 0.0], [2.0, 1.0], [0.0, 4.0], [1.0, 5.0]];
        let mut indices = [3u8, 2, 0, 1, 2, 3];
        let unique = remove_duplicates_fuzzy_indexed_in_place(&mut indices, &mut positions, 2.0).unwrap();
        assert_eq!(unique, 2);
        assert_eq!(&positions[..unique], &[[1.0, 0.0], [0.0, 4.0]]);
        assert_eq!(indices, [1, 1, 0, 0, 1, 1]);
    }

    #[test]
    fn test_fuzzy_boundary_straddling() {
        // 1.99 and 2.01 are in different cells of the unshifted grid.
        let mut data = [[0.0f64], [1.99], [2.01], [5.0]];
        let (remap, unique) = remove_duplicates_fuzzy_in_place(&mut data, 1.0);
        assert_eq!(unique, 3);
        assert_eq!(remap, vec![0, 1, 1, 2]);
        assert_eq!(&data[..unique], &[[0.0], [1.99], [5.0]]);
    }

    #[test]
    fn test_fuzzy_integers() {
        let mut data = [[10i32, 10, 10], [11, 10, 10], [100, 10, 10], [10, 10, 30]];
        let (remap, unique) = remove_duplicates_fuzzy_in_place(&mut data, 4);
        assert_eq!(unique, 3);
        assert_eq!(remap, vec![0, 0, 1, 2]);
    }

    #[test]
    fn test_fuzzy_diagonal_straddling() {
        // Both components of the last two vertices cross a cell boundary.
        let mut data = [[-10.0f32, -10.0], [0.99, 0.99], [1.01, 1.01]];
        let (remap, unique) = remove_duplicates_fuzzy_in_place(&mut data, 1.0);
        assert_eq!(unique, 2);
        assert_eq!(remap, vec![0, 1, 1]);
    }

    #[test]
    fn test_fuzzy_far_apart_stay_separate() {
        let mut data = [[0.0f64, 0.0, 0.0], [0.0, 0.0, 1.5], [1.5, 1.5, 1.5]];
        let (remap, unique) = remove_duplicates_fuzzy_in_place(&mut data, 1.0);
        assert_eq!(unique, 3);
        assert_eq!(remap, vec![0, 1, 2]);
    }

    #[test]
    fn test_fuzzy_non_finite() {
        let mut data = [[0.0f32], [f32::INFINITY]];
        let (remap, unique) = remove_duplicates_fuzzy_in_place(&mut data, 0.5);
        assert_eq!(unique, 2);
        assert_eq!(remap, vec![0, 1]);

        let mut data = [
            [1.0f32, 0.0],
            [f32::NAN, 0.0],
            [1.1, 0.0],
            [f32::NEG_INFINITY, 0.0],
            [f32::NEG_INFINITY, 0.1],
            [f32::NEG_INFINITY, 9.0],
        ];
        let (remap, unique) = remove_duplicates_fuzzy_in_place(&mut data, 0.5);
        assert_eq!(unique, 4);
        assert_eq!(remap, vec![0, 1, 0, 2, 2, 3]);
        assert_eq!(data[0], [1.0, 0.0]);
        assert!(data[1][0].is_nan());
    }

    #[test]
    fn test_fuzzy_empty() {
        let mut data: [[f32; 3]; 0] = [];
        assert_eq!(remove_duplicates_fuzzy_in_place(&mut data, 0.1), (vec![], 0));
    }

    #[test]
    #[should_panic(expected = "epsilon must be positive, got 0")]
    fn test_fuzzy_zero_epsilon() {
        remove_duplicates_fuzzy_in_place(&mut [[1.0f32]], 0.0);
    }

    #[test]
    fn test_epsilon_from_bits() {
        assert_eq!(epsilon_from_bits(0), 1.0);
        assert_eq!(epsilon_from_bits(2), 0.25);
        assert_eq!(epsilon_from_bits(10), 1.0 / 1024.0);
    }

    #[test]
    fn test_mesh_non_indexed() {
        let positions = [[0.0f32, 0.0], [1.0, 0.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
        let mesh = MeshData::builder(PrimitiveTopology::PointList)
            .vertices(
                MeshBuffer::from_pod(&positions),
                vec![MeshAttributeData::packed(
                    VertexAttributeSemantic::Position,
                    VertexAttributeFormat::Float2,
                    0,
                    5,
                )],
            )
            .build();

        let deduplicated = remove_duplicates(&mesh);
        assert_eq!(deduplicated.vertex_count(), 3);
        assert_eq!(deduplicated.index_format(), Some(IndexFormat::Uint32));
        assert_eq!(deduplicated.indices_u32(), vec![0, 1, 0, 1, 2]);
        assert_eq!(
            deduplicated.positions2d(),
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]
        );
    }

    #[test]
    fn test_mesh_indexed_keeps_format() {
        // Same position, different colors for vertices 0 and 2.
        let positions = [[0.0f32, 0.0], [1.0, 0.0], [0.0, 0.0], [1.0, 0.0]];
        let colors = [[255u8, 0, 0, 255], [0, 0, 0, 255], [0, 255, 0, 255], [0, 0, 0, 255]];
        let mut bytes = bytemuck::cast_slice::<[f32; 2], u8>(&positions).to_vec();
        bytes.extend_from_slice(bytemuck::cast_slice(&colors));
        let mesh = MeshData::builder(PrimitiveTopology::LineList)
            .indices_from(&[3u8, 2, 1, 0])
            .vertices(
                bytes,
                vec![
                    MeshAttributeData::packed(
                        VertexAttributeSemantic::Position,
                        VertexAttributeFormat::Float2,
                        0,
                        4,
                    ),
                    MeshAttributeData::packed(
                        VertexAttributeSemantic::Color,
                        VertexAttributeFormat::Unorm8x4,
                        32,
                        4,
                    ),
                ],
            )
            .build();

        let deduplicated = remove_duplicates(&mesh);
        assert_eq!(deduplicated.vertex_count(), 3);
        assert_eq!(deduplicated.index_format(), Some(IndexFormat::Uint8));
        assert_eq!(deduplicated.indices_u32(), vec![1, 2, 1, 0]);
        assert_eq!(deduplicated.attribute(0).stride, 12);
    }
}
