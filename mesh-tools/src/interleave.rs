//! Interleaving vertex attributes into a single array-of-structs buffer.
//!
//! A layout is computed first ([`interleaved_layout`]); [`interleave`] and
//! [`interleave_ref`] then copy the payload into it. Layouts of already
//! interleaved meshes keep the original stride and relative offsets, so any
//! padding or alignment the caller set up survives.

use meshforge_core::mesh::{
    DataFlags, MeshAttributeData, MeshBuffer, MeshData, MeshIndexData, PrimitiveTopology,
    VertexAttributeFormat, VertexAttributeSemantic,
};
use meshforge_core::profiling::{profile_function, profile_scope};

use crate::error::{MeshToolsError, Result};

/// An attribute appended by the interleaving functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtraAttribute<'a> {
    /// A new attribute, optionally with tightly packed per-vertex payload.
    ///
    /// Without payload the slot is left zeroed for the caller to fill in.
    Attribute {
        /// Semantic meaning of the attribute.
        semantic: VertexAttributeSemantic,
        /// Element format.
        format: VertexAttributeFormat,
        /// One tightly packed element per vertex, if any.
        data: Option<&'a [u8]>,
    },
    /// Bytes to add to (or, if negative, remove from) the running stride.
    Padding(i32),
}

impl<'a> ExtraAttribute<'a> {
    /// An attribute slot without payload.
    pub fn new(semantic: VertexAttributeSemantic, format: VertexAttributeFormat) -> Self {
        Self::Attribute {
            semantic,
            format,
            data: None,
        }
    }

    /// An attribute with payload, one `T` per vertex.
    pub fn with_data<T: bytemuck::Pod>(
        semantic: VertexAttributeSemantic,
        format: VertexAttributeFormat,
        data: &'a [T],
    ) -> Self {
        Self::Attribute {
            semantic,
            format,
            data: Some(bytemuck::cast_slice(data)),
        }
    }

    /// A stride-only gap.
    pub fn padding(bytes: i32) -> Self {
        Self::Padding(bytes)
    }
}

/// Whether all attributes share one stride and fit into one stride-sized window.
///
/// A mesh without attributes is trivially interleaved.
pub fn is_interleaved(mesh: &MeshData<'_>) -> bool {
    let Some(first) = mesh.attributes().first() else {
        return true;
    };

    let stride = first.stride;
    let mut min_offset = usize::MAX;
    let mut max_end = 0;
    for attr in mesh.attributes() {
        if attr.stride != stride {
            return false;
        }
        min_offset = min_offset.min(attr.offset as usize);
        max_end = max_end.max(attr.offset as usize + attr.element_size());
    }
    max_end - min_offset <= stride as usize
}

/// Interleaved layout: the stride plus every attribute's place in it.
struct Layout {
    stride: u32,
    /// Source attributes first, then one entry per non-padding extra.
    attributes: Vec<(VertexAttributeSemantic, VertexAttributeFormat, u32)>,
    /// Position in `attributes` of every extra, `None` for padding.
    extra_ids: Vec<Option<usize>>,
}

impl Layout {
    fn compute(mesh: &MeshData<'_>, extras: &[ExtraAttribute<'_>]) -> Self {
        let mut attributes = Vec::with_capacity(mesh.attribute_count() + extras.len());
        let mut stride: u32 = 0;

        if mesh.attribute_count() > 0 && is_interleaved(mesh) {
            let min_offset = mesh
                .attributes()
                .iter()
                .map(|attr| attr.offset)
                .min()
                .unwrap_or(0);
            stride = mesh.attributes()[0].stride;
            for attr in mesh.attributes() {
                attributes.push((attr.semantic, attr.format, attr.offset - min_offset));
            }
        } else {
            for attr in mesh.attributes() {
                attributes.push((attr.semantic, attr.format, stride));
                stride += attr.element_size() as u32;
            }
        }

        let mut extra_ids = Vec::with_capacity(extras.len());
        for (i, extra) in extras.iter().enumerate() {
            match *extra {
                ExtraAttribute::Padding(padding) => {
                    let padded = stride as i64 + padding as i64;
                    assert!(
                        padded >= 0,
                        "interleaved_layout(): negative padding {} in extra attribute {} is larger than the stride {}",
                        padding,
                        i,
                        stride
                    );
                    stride = padded as u32;
                    extra_ids.push(None);
                }
                ExtraAttribute::Attribute {
                    semantic, format, ..
                } => {
                    extra_ids.push(Some(attributes.len()));
                    attributes.push((semantic, format, stride));
                    stride += format.size() as u32;
                }
            }
        }

        Self {
            stride,
            attributes,
            extra_ids,
        }
    }

    fn attribute_data(&self, vertex_count: u32) -> Vec<MeshAttributeData> {
        self.attributes
            .iter()
            .map(|&(semantic, format, offset)| {
                MeshAttributeData::new(semantic, format, offset, self.stride, vertex_count)
            })
            .collect()
    }
}

/// Empty interleaved layout for `mesh` plus `extras`, sized for `vertex_count`.
///
/// The returned mesh owns a zero-filled vertex buffer, has no index data and
/// carries the source's topology and label. If `mesh` is already interleaved,
/// its stride and relative attribute offsets are kept; otherwise its
/// attributes are packed back to back in their original order. Extras follow,
/// each padding entry moving the running stride.
///
/// # Panics
///
/// If a negative padding is larger than the stride accumulated so far.
pub fn interleaved_layout(
    mesh: &MeshData<'_>,
    vertex_count: u32,
    extras: &[ExtraAttribute<'_>],
) -> MeshData<'static> {
    let layout = Layout::compute(mesh, extras);
    assemble(
        mesh.topology(),
        mesh.label().map(str::to_owned),
        vertex_count,
        MeshBuffer::zeroed(layout.stride as usize * vertex_count as usize),
        layout.attribute_data(vertex_count),
        None,
    )
}

/// Copy the source attributes into a destination laid out by [`Layout`].
///
/// Destination vertex `v` takes source vertex `vertex_map(v)`. Interleaved
/// sources are copied one stride-sized window at a time so bytes between and
/// after attributes survive.
pub(crate) fn copy_attributes(
    source: &MeshData<'_>,
    destination: &mut [u8],
    destination_attributes: &[MeshAttributeData],
    vertex_count: u32,
    vertex_map: impl Fn(u32) -> u32,
) {
    profile_function!();

    let src = source.vertex_data();
    let attributes = source.attributes();
    if attributes.is_empty() {
        return;
    }

    if is_interleaved(source) {
        let src_stride = attributes[0].stride as usize;
        let min_offset = attributes
            .iter()
            .map(|attr| attr.offset as usize)
            .min()
            .unwrap_or(0);
        // Negative padding may shrink the destination stride below the source one.
        let dst_stride = destination_attributes[0].stride as usize;
        let window = src_stride.min(dst_stride);
        for vertex in 0..vertex_count {
            let start = min_offset + vertex_map(vertex) as usize * src_stride;
            let len = window.min(src.len() - start);
            let dst_start = vertex as usize * dst_stride;
            destination[dst_start..dst_start + len].copy_from_slice(&src[start..start + len]);
        }
    } else {
        for (attr, dst_attr) in attributes.iter().zip(destination_attributes) {
            for vertex in 0..vertex_count {
                destination[dst_attr.element_range(vertex)]
                    .copy_from_slice(&src[attr.element_range(vertex_map(vertex))]);
            }
        }
    }
}

/// Check extra payloads against the vertex count before any copying.
fn validate_extras(extras: &[ExtraAttribute<'_>], vertex_count: u32) -> Result<()> {
    for (index, extra) in extras.iter().enumerate() {
        let ExtraAttribute::Attribute {
            format,
            data: Some(data),
            ..
        } = *extra
        else {
            continue;
        };
        if data.is_empty() {
            continue;
        }
        assert!(
            data.len() % format.size() == 0,
            "interleave(): payload of extra attribute {} is {} bytes, not a whole number of {:?} elements",
            index,
            data.len(),
            format
        );
        let actual = data.len() / format.size();
        if actual != vertex_count as usize {
            return Err(MeshToolsError::ExtraAttributeCountMismatch {
                index,
                expected: vertex_count as usize,
                actual,
            });
        }
    }
    Ok(())
}

/// Lay out, copy existing attributes and fill extra payloads.
fn interleave_vertices(
    mesh: &MeshData<'_>,
    extras: &[ExtraAttribute<'_>],
) -> Result<(Vec<u8>, Vec<MeshAttributeData>)> {
    let vertex_count = mesh.vertex_count();
    validate_extras(extras, vertex_count)?;

    let layout = Layout::compute(mesh, extras);
    let attributes = layout.attribute_data(vertex_count);
    let mut data = vec![0u8; layout.stride as usize * vertex_count as usize];

    copy_attributes(mesh, &mut data, &attributes, vertex_count, |vertex| vertex);

    {
        profile_scope!("copy_extra_attributes");
        for (extra, id) in extras.iter().zip(&layout.extra_ids) {
            let (
                ExtraAttribute::Attribute {
                    format,
                    data: Some(payload),
                    ..
                },
                Some(id),
            ) = (*extra, *id)
            else {
                continue;
            };
            if payload.is_empty() {
                continue;
            }
            let size = format.size();
            let dst_attr = attributes[id];
            for (vertex, element) in payload.chunks_exact(size).enumerate() {
                data[dst_attr.element_range(vertex as u32)].copy_from_slice(element);
            }
        }
    }

    log::debug!(
        "interleave(): {} attributes + {} extras into stride {} for {} vertices",
        mesh.attribute_count(),
        extras.len(),
        layout.stride,
        vertex_count
    );

    Ok((data, attributes))
}

fn assemble(
    topology: PrimitiveTopology,
    label: Option<String>,
    vertex_count: u32,
    vertices: MeshBuffer<'static>,
    attributes: Vec<MeshAttributeData>,
    index: Option<(MeshBuffer<'static>, MeshIndexData)>,
) -> MeshData<'static> {
    let mut builder = MeshData::builder(topology)
        .vertices(vertices, attributes)
        .vertex_count(vertex_count);
    if let Some((buffer, desc)) = index {
        builder = builder.indices(buffer, desc);
    }
    if let Some(label) = label {
        builder = builder.label(label);
    }
    builder.build()
}

/// Interleave a mesh the caller gives up, reusing its memory where possible.
///
/// Owned index data is moved into the result. If the mesh is already
/// interleaved, owns its vertex data and there are no extras, the vertex
/// buffer is moved as well and nothing is copied.
///
/// # Errors
///
/// [`MeshToolsError::ExtraAttributeCountMismatch`] if an extra payload
/// doesn't have one element per vertex.
///
/// # Panics
///
/// If a negative padding is larger than the stride accumulated so far.
pub fn interleave(mut mesh: MeshData<'_>, extras: &[ExtraAttribute<'_>]) -> Result<MeshData<'static>> {
    profile_function!();

    let index = match mesh.index_descriptor() {
        Some(desc) => Some((mesh.release_index_data().into_owned_buffer(), desc)),
        None => None,
    };
    let topology = mesh.topology();
    let vertex_count = mesh.vertex_count();
    let label = mesh.label().map(str::to_owned);

    if extras.is_empty()
        && is_interleaved(&mesh)
        && mesh.vertex_data_flags().contains(DataFlags::OWNED)
    {
        log::debug!("interleave(): taking over the already interleaved vertex buffer");
        let attributes = mesh.attributes().to_vec();
        let vertices = mesh.release_vertex_data().into_owned_buffer();
        return Ok(assemble(topology, label, vertex_count, vertices, attributes, index));
    }

    let (data, attributes) = interleave_vertices(&mesh, extras)?;
    Ok(assemble(
        topology,
        label,
        vertex_count,
        MeshBuffer::Owned(data),
        attributes,
        index,
    ))
}

/// Interleave a borrowed mesh, copying all data.
///
/// # Errors
///
/// [`MeshToolsError::ExtraAttributeCountMismatch`] if an extra payload
/// doesn't have one element per vertex.
///
/// # Panics
///
/// If a negative padding is larger than the stride accumulated so far.
pub fn interleave_ref(mesh: &MeshData<'_>, extras: &[ExtraAttribute<'_>]) -> Result<MeshData<'static>> {
    profile_function!();

    let (data, attributes) = interleave_vertices(mesh, extras)?;
    let index = mesh
        .index_descriptor()
        .map(|desc| (MeshBuffer::Owned(mesh.index_data().to_vec()), desc));
    Ok(assemble(
        mesh.topology(),
        mesh.label().map(str::to_owned),
        mesh.vertex_count(),
        MeshBuffer::Owned(data),
        attributes,
        index,
    ))
}
