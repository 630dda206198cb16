//! Index compression: storing indices in the narrowest sufficient type.
//!
//! All variants optionally subtract an `offset` from every index first, which
//! renumbers a sub-range of vertices to start at zero. A negative offset raises
//! the values instead and may force a wider type.

use meshforge_core::mesh::{
    IndexElement, IndexFormat, IndicesRef, MeshAttributeData, MeshData, MeshIndexData,
};
use meshforge_core::profiling::profile_function;

use crate::error::{MeshToolsError, Result};

/// Apply `offset` to the index at `position`.
///
/// # Panics
///
/// If the result is negative or doesn't fit into 32 bits.
fn biased(caller: &str, position: usize, index: u32, offset: i64) -> u32 {
    let value = index as i64 - offset;
    assert!(
        value >= 0,
        "{caller}(): index {index} at position {position} is below the offset {offset}"
    );
    match u32::try_from(value) {
        Ok(value) => value,
        Err(_) => panic!(
            "{caller}(): index {index} at position {position} with offset {offset} doesn't fit into 32 bits"
        ),
    }
}

fn narrow_into<T: IndexElement>(
    caller: &str,
    indices: IndicesRef<'_>,
    offset: i64,
    out: &mut Vec<u8>,
) {
    out.reserve(indices.len() * std::mem::size_of::<T>());
    for (position, index) in indices.iter().enumerate() {
        let value = biased(caller, position, index, offset);
        // The format was chosen from the maximum, so this always fits.
        let narrowed = T::from_u32(value).unwrap_or_else(|| {
            unreachable!("{caller}(): {value} doesn't fit into {:?}", T::FORMAT)
        });
        out.extend_from_slice(bytemuck::bytes_of(&narrowed));
    }
}

/// Compress indices to the narrowest type that is at least `at_least`.
///
/// The type is picked from `max(indices) - offset`: values up to `0xFF` fit
/// [`IndexFormat::Uint8`], up to `0xFFFF` fit [`IndexFormat::Uint16`],
/// anything else needs [`IndexFormat::Uint32`]. Returns the packed bytes in
/// native byte order together with the chosen format.
///
/// # Panics
///
/// If an index minus `offset` is negative or exceeds `u32::MAX`.
///
/// # Example
///
/// ```ignore
/// let (bytes, format) = compress_indices((&[3u32, 200, 7][..]).into(), IndexFormat::Uint8, 0);
/// assert_eq!(format, IndexFormat::Uint8);
/// assert_eq!(bytes, [3, 200, 7]);
/// ```
pub fn compress_indices(
    indices: IndicesRef<'_>,
    at_least: IndexFormat,
    offset: i64,
) -> (Vec<u8>, IndexFormat) {
    profile_function!();

    let max = indices
        .iter()
        .enumerate()
        .map(|(position, index)| biased("compress_indices", position, index, offset))
        .max()
        .unwrap_or(0);
    let format = IndexFormat::smallest_for(max).max(at_least);

    log::debug!(
        "compress_indices(): {} {:?} indices, max {} after offset {}, storing as {:?}",
        indices.len(),
        indices.format(),
        max,
        offset,
        format
    );

    let mut out = Vec::new();
    match format {
        IndexFormat::Uint8 => narrow_into::<u8>("compress_indices", indices, offset, &mut out),
        IndexFormat::Uint16 => narrow_into::<u16>("compress_indices", indices, offset, &mut out),
        IndexFormat::Uint32 => narrow_into::<u32>("compress_indices", indices, offset, &mut out),
    }
    (out, format)
}

/// Type-erased [`compress_indices`] over raw index bytes.
///
/// # Panics
///
/// If `element_size` isn't 1, 2 or 4, or `data` isn't a whole number of
/// contiguous elements.
pub fn compress_indices_erased(
    data: &[u8],
    element_size: usize,
    at_least: IndexFormat,
    offset: i64,
) -> (Vec<u8>, IndexFormat) {
    let Some(format) = IndexFormat::from_size(element_size) else {
        panic!("compress_indices_erased(): expected index type size 1, 2 or 4 but got {element_size}");
    };
    assert!(
        data.len() % element_size == 0,
        "compress_indices_erased(): {} bytes is not a whole number of {}-byte indices",
        data.len(),
        element_size
    );
    compress_indices(IndicesRef::new(format, data), at_least, offset)
}

/// Compress indices into a fixed type `T`.
///
/// Fails with [`MeshToolsError::IndexOverflow`] naming the first index that
/// doesn't fit. Nothing is returned on failure.
///
/// # Panics
///
/// If an index minus `offset` is negative or exceeds `u32::MAX`.
pub fn compress_indices_as<T: IndexElement>(indices: IndicesRef<'_>, offset: i64) -> Result<Vec<T>> {
    profile_function!();

    indices
        .iter()
        .enumerate()
        .map(|(position, index)| {
            let value = biased("compress_indices_as", position, index, offset);
            T::from_u32(value).ok_or(MeshToolsError::IndexOverflow {
                position,
                value,
                format: T::FORMAT,
            })
        })
        .collect()
}

/// Compact an indexed mesh to the vertex range its indices reference.
///
/// Finds the smallest and largest referenced vertex, copies only the vertex
/// bytes covering that range, rebases the attribute offsets into the copied
/// window (strides stay as they are) and stores the indices minus the smallest
/// one in the narrowest type that is at least `at_least`. Callers without a
/// preference pass [`IndexFormat::Uint16`].
///
/// # Panics
///
/// If the mesh is not indexed or an index is out of range for its vertices.
pub fn compress_mesh_indices(mesh: &MeshData<'_>, at_least: IndexFormat) -> MeshData<'static> {
    profile_function!();

    assert!(
        mesh.is_indexed(),
        "compress_mesh_indices(): the mesh is not indexed"
    );

    let indices = mesh.indices();
    let (min, new_vertex_count) = match indices.min_max() {
        Some((min, max)) => {
            assert!(
                max < mesh.vertex_count(),
                "compress_mesh_indices(): index {} out of range for {} vertices",
                max,
                mesh.vertex_count()
            );
            (min, max - min + 1)
        }
        None => (0, 0),
    };

    // Byte range each attribute occupies for vertices [min, max].
    let ranges: Vec<(usize, usize)> = mesh
        .attributes()
        .iter()
        .map(|attr| {
            let start = attr.offset as usize + min as usize * attr.stride as usize;
            let end = if new_vertex_count == 0 {
                start
            } else {
                start + (new_vertex_count as usize - 1) * attr.stride as usize + attr.element_size()
            };
            (start, end)
        })
        .collect();
    let window_start = ranges.iter().map(|&(start, _)| start).min().unwrap_or(0);
    let window_end = ranges.iter().map(|&(_, end)| end).max().unwrap_or(0);

    let attributes: Vec<MeshAttributeData> = mesh
        .attributes()
        .iter()
        .zip(&ranges)
        .map(|(attr, &(start, _))| {
            MeshAttributeData::new(
                attr.semantic,
                attr.format,
                (start - window_start) as u32,
                attr.stride,
                new_vertex_count,
            )
        })
        .collect();

    let (index_bytes, format) = compress_indices(indices, at_least, min as i64);

    log::debug!(
        "compress_mesh_indices(): {} -> {} vertices, {:?} -> {:?} indices, vertex bytes [{}, {})",
        mesh.vertex_count(),
        new_vertex_count,
        indices.format(),
        format,
        window_start,
        window_end
    );

    let mut builder = MeshData::builder(mesh.topology())
        .indices(
            index_bytes,
            MeshIndexData::tight(format, indices.len() as u32),
        )
        .vertices(
            mesh.vertex_data()[window_start..window_end].to_vec(),
            attributes,
        )
        .vertex_count(new_vertex_count);
    if let Some(label) = mesh.label() {
        builder = builder.label(label);
    }
    builder.build()
}
