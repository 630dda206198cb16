//! CPU-side mesh data structures.
//!
//! This module provides:
//! - [`PrimitiveTopology`] - How vertices are assembled into primitives
//! - [`IndexFormat`] - Index element width (u8, u16 or u32)
//! - [`MeshBuffer`] / [`DataFlags`] - Owned or borrowed byte storage
//! - [`MeshIndexData`] / [`MeshAttributeData`] - Views into the index and vertex bytes
//! - [`MeshData`] - Mesh holding one index buffer, one vertex buffer and the views into them
//!
//! # Ownership
//!
//! Each of the two buffers is independently either owned by the mesh or borrowed
//! from the caller. Borrowed buffers may be shared by several meshes at once, so
//! mutation is only exposed when the buffer is [`DataFlags::MUTABLE`]. Attribute
//! and index descriptions are plain `(offset, stride, count)` tuples and never own
//! memory themselves.

use std::fmt;
use std::ops::Range;

use bitflags::bitflags;

use super::indices::{IndexElement, IndicesRef};
use super::layout::{VertexAttributeFormat, VertexAttributeSemantic};

/// Primitive topology describing how vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Each vertex is a separate point.
    PointList,
    /// Every two vertices form a line.
    LineList,
    /// Vertices form a connected strip of lines.
    LineStrip,
    /// Like [`LineStrip`](Self::LineStrip), with the last vertex connected back to the first.
    LineLoop,
    /// Every three vertices form a triangle.
    #[default]
    TriangleList,
    /// Vertices form a connected strip of triangles.
    TriangleStrip,
    /// Triangles sharing the first vertex.
    TriangleFan,
}

impl PrimitiveTopology {
    /// Number of primitives assembled from `count` vertices (or indices).
    pub fn primitive_count(&self, count: u32) -> u32 {
        match self {
            Self::PointList => count,
            Self::LineList => count / 2,
            Self::LineStrip => count.saturating_sub(1),
            Self::LineLoop => {
                if count < 2 {
                    0
                } else {
                    count
                }
            }
            Self::TriangleList => count / 3,
            Self::TriangleStrip | Self::TriangleFan => count.saturating_sub(2),
        }
    }
}

/// Index format for indexed drawing.
///
/// Variants are ordered by width, so `a.max(b)` picks the wider one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum IndexFormat {
    /// 8-bit unsigned integers (max 255 vertices).
    Uint8,
    /// 16-bit unsigned integers (max 65535 vertices).
    #[default]
    Uint16,
    /// 32-bit unsigned integers (max ~4 billion vertices).
    Uint32,
}

impl IndexFormat {
    /// Get the size in bytes of each index.
    pub fn size(&self) -> usize {
        match self {
            Self::Uint8 => 1,
            Self::Uint16 => 2,
            Self::Uint32 => 4,
        }
    }

    /// Largest index value representable in this format.
    pub fn max_value(&self) -> u32 {
        match self {
            Self::Uint8 => u8::MAX as u32,
            Self::Uint16 => u16::MAX as u32,
            Self::Uint32 => u32::MAX,
        }
    }

    /// Narrowest format able to store `value`.
    pub fn smallest_for(value: u32) -> Self {
        if value <= u8::MAX as u32 {
            Self::Uint8
        } else if value <= u16::MAX as u32 {
            Self::Uint16
        } else {
            Self::Uint32
        }
    }

    /// Format with the given element size in bytes, if any.
    pub fn from_size(size: usize) -> Option<Self> {
        match size {
            1 => Some(Self::Uint8),
            2 => Some(Self::Uint16),
            4 => Some(Self::Uint32),
            _ => None,
        }
    }
}

bitflags! {
    /// Ownership state of a mesh buffer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DataFlags: u8 {
        /// The mesh owns the memory and may hand it out on release.
        const OWNED = 1 << 0;
        /// The memory may be written through the mesh.
        const MUTABLE = 1 << 1;
    }
}

/// Byte storage for mesh index or vertex data.
pub enum MeshBuffer<'a> {
    /// Memory owned by the mesh.
    Owned(Vec<u8>),
    /// Read-only memory borrowed from the caller.
    Borrowed(&'a [u8]),
    /// Writable memory borrowed from the caller.
    BorrowedMut(&'a mut [u8]),
}

impl<'a> MeshBuffer<'a> {
    /// An empty owned buffer.
    pub fn empty() -> Self {
        Self::Owned(Vec::new())
    }

    /// Owned buffer filled with `len` zero bytes.
    pub fn zeroed(len: usize) -> Self {
        Self::Owned(vec![0u8; len])
    }

    /// Copy plain-old-data values into a new owned buffer.
    pub fn from_pod<T: bytemuck::Pod>(values: &[T]) -> Self {
        Self::Owned(bytemuck::cast_slice(values).to_vec())
    }

    /// Ownership flags of this buffer.
    pub fn flags(&self) -> DataFlags {
        match self {
            Self::Owned(_) => DataFlags::OWNED | DataFlags::MUTABLE,
            Self::Borrowed(_) => DataFlags::empty(),
            Self::BorrowedMut(_) => DataFlags::MUTABLE,
        }
    }

    /// Whether the buffer is owned by the mesh.
    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }

    /// The stored bytes.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Owned(data) => data,
            Self::Borrowed(data) => data,
            Self::BorrowedMut(data) => data,
        }
    }

    /// The stored bytes, if the buffer is mutable.
    pub fn as_mut_slice(&mut self) -> Option<&mut [u8]> {
        match self {
            Self::Owned(data) => Some(data),
            Self::Borrowed(_) => None,
            Self::BorrowedMut(data) => Some(data),
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the bytes out, copying them if the buffer is borrowed.
    pub fn into_vec(self) -> Vec<u8> {
        match self {
            Self::Owned(data) => data,
            Self::Borrowed(data) => data.to_vec(),
            Self::BorrowedMut(data) => data.to_vec(),
        }
    }

    /// Deep copy into an owned buffer.
    pub fn to_owned_buffer(&self) -> MeshBuffer<'static> {
        MeshBuffer::Owned(self.as_slice().to_vec())
    }

    /// Owned buffer with the same bytes, moving the memory if it is already owned.
    pub fn into_owned_buffer(self) -> MeshBuffer<'static> {
        MeshBuffer::Owned(self.into_vec())
    }
}

impl Default for MeshBuffer<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<u8>> for MeshBuffer<'_> {
    fn from(data: Vec<u8>) -> Self {
        Self::Owned(data)
    }
}

impl<'a> From<&'a [u8]> for MeshBuffer<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::Borrowed(data)
    }
}

impl<'a> From<&'a mut [u8]> for MeshBuffer<'a> {
    fn from(data: &'a mut [u8]) -> Self {
        Self::BorrowedMut(data)
    }
}

impl fmt::Debug for MeshBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Owned(_) => "Owned",
            Self::Borrowed(_) => "Borrowed",
            Self::BorrowedMut(_) => "BorrowedMut",
        };
        f.debug_struct("MeshBuffer")
            .field("kind", &kind)
            .field("len", &self.len())
            .finish()
    }
}

/// Location of the indices inside the index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshIndexData {
    /// Element width.
    pub format: IndexFormat,
    /// Byte offset of the first index.
    pub offset: u32,
    /// Number of indices.
    pub count: u32,
}

impl MeshIndexData {
    /// Describe `count` indices of `format` starting at byte `offset`.
    pub fn new(format: IndexFormat, offset: u32, count: u32) -> Self {
        Self {
            format,
            offset,
            count,
        }
    }

    /// Describe `count` tightly packed indices at the start of the buffer.
    pub fn tight(format: IndexFormat, count: u32) -> Self {
        Self::new(format, 0, count)
    }

    /// Byte range occupied by the indices.
    pub fn byte_range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.count as usize * self.format.size()
    }
}

/// A strided window into the vertex buffer describing one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshAttributeData {
    /// Semantic meaning of this attribute.
    pub semantic: VertexAttributeSemantic,
    /// Data format of this attribute.
    pub format: VertexAttributeFormat,
    /// Byte offset of the first element within the vertex buffer.
    pub offset: u32,
    /// Distance in bytes between consecutive elements.
    pub stride: u32,
    /// Number of elements in the view.
    pub vertex_count: u32,
}

impl MeshAttributeData {
    /// Create a new attribute view.
    pub fn new(
        semantic: VertexAttributeSemantic,
        format: VertexAttributeFormat,
        offset: u32,
        stride: u32,
        vertex_count: u32,
    ) -> Self {
        Self {
            semantic,
            format,
            offset,
            stride,
            vertex_count,
        }
    }

    /// Create a tightly packed attribute view (stride equals the format size).
    pub fn packed(
        semantic: VertexAttributeSemantic,
        format: VertexAttributeFormat,
        offset: u32,
        vertex_count: u32,
    ) -> Self {
        Self::new(semantic, format, offset, format.size() as u32, vertex_count)
    }

    /// Size of one element in bytes.
    pub fn element_size(&self) -> usize {
        self.format.size()
    }

    /// Byte range of element `index`.
    pub fn element_range(&self, index: u32) -> Range<usize> {
        let start = self.offset as usize + index as usize * self.stride as usize;
        start..start + self.element_size()
    }

    /// Byte range spanned by all elements, from the first byte of the first
    /// element to the last byte of the last one.
    pub fn byte_range(&self) -> Range<usize> {
        let start = self.offset as usize;
        if self.vertex_count == 0 {
            return start..start;
        }
        let end = start + (self.vertex_count as usize - 1) * self.stride as usize + self.element_size();
        start..end
    }
}

/// A CPU-side mesh holding raw vertex and index data.
///
/// This is the GPU-agnostic representation of a mesh. It is assembled with
/// [`MeshData::builder`], validated once in [`MeshDataBuilder::build`] and read
/// through accessors afterwards. The typed accessors in this module's `access`
/// submodule copy-convert attribute data into canonical types.
///
/// Malformed construction (an attribute reaching past the vertex buffer, a
/// vertex count mismatch, ...) is a programming error and panics with a message
/// naming the offending attribute and values.
pub struct MeshData<'a> {
    topology: PrimitiveTopology,
    index: Option<(MeshBuffer<'a>, MeshIndexData)>,
    vertex_data: Option<MeshBuffer<'a>>,
    attributes: Vec<MeshAttributeData>,
    vertex_count: u32,
    label: Option<String>,
}

impl<'a> MeshData<'a> {
    /// Start building a mesh with the given topology.
    pub fn builder(topology: PrimitiveTopology) -> MeshDataBuilder<'a> {
        MeshDataBuilder::new(topology)
    }

    /// Get the primitive topology.
    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Check if this mesh uses indexed drawing.
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Get the number of indices (0 for non-indexed meshes).
    pub fn index_count(&self) -> u32 {
        self.index.as_ref().map_or(0, |(_, desc)| desc.count)
    }

    /// Get the index format, if indexed.
    pub fn index_format(&self) -> Option<IndexFormat> {
        self.index.as_ref().map(|(_, desc)| desc.format)
    }

    /// Byte offset of the first index, if indexed.
    pub fn index_offset(&self) -> Option<u32> {
        self.index.as_ref().map(|(_, desc)| desc.offset)
    }

    /// Description of the index view, if indexed.
    pub fn index_descriptor(&self) -> Option<MeshIndexData> {
        self.index.as_ref().map(|(_, desc)| *desc)
    }

    /// Get the whole raw index buffer (empty for non-indexed meshes).
    pub fn index_data(&self) -> &[u8] {
        self.index
            .as_ref()
            .map_or(&[][..], |(buffer, _)| buffer.as_slice())
    }

    /// Ownership flags of the index buffer, empty for non-indexed meshes.
    pub fn index_data_flags(&self) -> DataFlags {
        self.index
            .as_ref()
            .map_or(DataFlags::empty(), |(buffer, _)| buffer.flags())
    }

    /// Type-erased view of the indices.
    ///
    /// # Panics
    ///
    /// If the mesh is not indexed.
    pub fn indices(&self) -> IndicesRef<'_> {
        match &self.index {
            Some((buffer, desc)) => {
                IndicesRef::new(desc.format, &buffer.as_slice()[desc.byte_range()])
            }
            None => panic!("MeshData::indices(): the mesh is not indexed"),
        }
    }

    /// Indices widened to `u32`.
    ///
    /// # Panics
    ///
    /// If the mesh is not indexed.
    pub fn indices_u32(&self) -> Vec<u32> {
        self.indices().to_u32_vec()
    }

    /// Get the whole raw vertex buffer (empty once released).
    pub fn vertex_data(&self) -> &[u8] {
        self.vertex_data
            .as_ref()
            .map_or(&[][..], |buffer| buffer.as_slice())
    }

    /// Ownership flags of the vertex buffer, empty once it was released.
    pub fn vertex_data_flags(&self) -> DataFlags {
        self.vertex_data
            .as_ref()
            .map_or(DataFlags::empty(), |buffer| buffer.flags())
    }

    /// Get the number of attributes.
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Get all attribute views, in declaration order.
    pub fn attributes(&self) -> &[MeshAttributeData] {
        &self.attributes
    }

    /// Get an attribute view by position.
    ///
    /// # Panics
    ///
    /// If `id` is out of range.
    pub fn attribute(&self, id: usize) -> &MeshAttributeData {
        assert!(
            id < self.attributes.len(),
            "MeshData::attribute(): index {} out of range for {} attributes",
            id,
            self.attributes.len()
        );
        &self.attributes[id]
    }

    /// Position of the first attribute with the given semantic.
    pub fn attribute_id(&self, semantic: VertexAttributeSemantic) -> Option<usize> {
        self.attributes.iter().position(|attr| attr.semantic == semantic)
    }

    /// Check if this mesh has an attribute with a specific semantic.
    pub fn has_attribute(&self, semantic: VertexAttributeSemantic) -> bool {
        self.attribute_id(semantic).is_some()
    }

    /// Bytes of element `vertex` of attribute `id`.
    pub fn attribute_bytes(&self, id: usize, vertex: u32) -> &[u8] {
        let attr = self.attribute(id);
        assert!(
            vertex < self.vertex_count,
            "MeshData::attribute_bytes(): vertex {} out of range for {} vertices",
            vertex,
            self.vertex_count
        );
        &self.vertex_data()[attr.element_range(vertex)]
    }

    /// Get the debug label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the number of primitives based on topology and vertex/index count.
    pub fn primitive_count(&self) -> u32 {
        let count = if self.is_indexed() {
            self.index_count()
        } else {
            self.vertex_count
        };
        self.topology.primitive_count(count)
    }

    /// Writable access to the whole vertex buffer.
    ///
    /// # Panics
    ///
    /// If the vertex buffer is not [`DataFlags::MUTABLE`].
    pub fn mutable_vertex_data(&mut self) -> &mut [u8] {
        match self.vertex_data.as_mut().and_then(|buffer| buffer.as_mut_slice()) {
            Some(data) => data,
            None => panic!("MeshData::mutable_vertex_data(): vertex data not mutable"),
        }
    }

    /// Writable access to the whole index buffer.
    ///
    /// # Panics
    ///
    /// If the mesh is not indexed or the index buffer is not [`DataFlags::MUTABLE`].
    pub fn mutable_index_data(&mut self) -> &mut [u8] {
        let Some((buffer, _)) = self.index.as_mut() else {
            panic!("MeshData::mutable_index_data(): the mesh is not indexed");
        };
        match buffer.as_mut_slice() {
            Some(data) => data,
            None => panic!("MeshData::mutable_index_data(): index data not mutable"),
        }
    }

    /// Overwrite every element of attribute `id` with `values`.
    ///
    /// # Panics
    ///
    /// If the vertex buffer is not mutable, `T` does not match the attribute
    /// format size, or `values` does not have one entry per vertex.
    pub fn write_attribute<T: bytemuck::Pod>(&mut self, id: usize, values: &[T]) {
        let attr = *self.attribute(id);
        assert_eq!(
            std::mem::size_of::<T>(),
            attr.element_size(),
            "MeshData::write_attribute(): type size doesn't match {:?} of attribute {}",
            attr.format,
            id
        );
        assert_eq!(
            values.len(),
            self.vertex_count as usize,
            "MeshData::write_attribute(): expected {} values for attribute {} but got {}",
            self.vertex_count,
            id,
            values.len()
        );
        let data = self.mutable_vertex_data();
        for (vertex, value) in values.iter().enumerate() {
            data[attr.element_range(vertex as u32)].copy_from_slice(bytemuck::bytes_of(value));
        }
    }

    /// Transfer the index buffer out of the mesh.
    ///
    /// The mesh becomes non-indexed afterwards; the vertex data is untouched.
    ///
    /// # Panics
    ///
    /// If the mesh is not indexed, which includes a second release.
    pub fn release_index_data(&mut self) -> MeshBuffer<'a> {
        match self.index.take() {
            Some((buffer, _)) => buffer,
            None => panic!("MeshData::release_index_data(): the mesh is not indexed"),
        }
    }

    /// Transfer the vertex buffer out of the mesh.
    ///
    /// All attributes are dropped; the vertex count is kept.
    ///
    /// # Panics
    ///
    /// If the vertex data was already released.
    pub fn release_vertex_data(&mut self) -> MeshBuffer<'a> {
        match self.vertex_data.take() {
            Some(buffer) => {
                self.attributes.clear();
                buffer
            }
            None => panic!("MeshData::release_vertex_data(): vertex data already released"),
        }
    }

    /// Deep copy into a mesh that owns both buffers.
    pub fn to_owned_mesh(&self) -> MeshData<'static> {
        let mut builder = MeshData::builder(self.topology)
            .vertices(
                MeshBuffer::Owned(self.vertex_data().to_vec()),
                self.attributes.clone(),
            )
            .vertex_count(self.vertex_count);
        if let Some((buffer, desc)) = &self.index {
            builder = builder.indices(buffer.to_owned_buffer(), *desc);
        }
        if let Some(label) = &self.label {
            builder = builder.label(label.clone());
        }
        builder.build()
    }
}

impl fmt::Debug for MeshData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshData")
            .field("label", &self.label)
            .field("topology", &self.topology)
            .field("vertex_count", &self.vertex_count)
            .field("attributes", &self.attributes)
            .field("index_format", &self.index_format())
            .field("index_count", &self.index_count())
            .field("index_flags", &self.index_data_flags())
            .field("vertex_flags", &self.vertex_data_flags())
            .finish()
    }
}

// Meshes that own or share-borrow their data can cross threads.
static_assertions::assert_impl_all!(MeshData<'static>: Send, Sync);

/// Builder for [`MeshData`].
///
/// # Example
///
/// ```ignore
/// let mesh = MeshData::builder(PrimitiveTopology::TriangleList)
///     .indices(MeshBuffer::from_pod(&[0u16, 1, 2]), MeshIndexData::tight(IndexFormat::Uint16, 3))
///     .vertices(
///         MeshBuffer::from_pod(&positions),
///         vec![MeshAttributeData::packed(VertexAttributeSemantic::Position, VertexAttributeFormat::Float3, 0, 3)],
///     )
///     .label("triangle")
///     .build();
/// ```
#[derive(Debug)]
pub struct MeshDataBuilder<'a> {
    topology: PrimitiveTopology,
    index: Option<(MeshBuffer<'a>, MeshIndexData)>,
    vertex_data: MeshBuffer<'a>,
    attributes: Vec<MeshAttributeData>,
    vertex_count: Option<u32>,
    label: Option<String>,
}

impl<'a> MeshDataBuilder<'a> {
    /// Create a builder for an empty, non-indexed mesh.
    pub fn new(topology: PrimitiveTopology) -> Self {
        Self {
            topology,
            index: None,
            vertex_data: MeshBuffer::empty(),
            attributes: Vec::new(),
            vertex_count: None,
            label: None,
        }
    }

    /// Set the primitive topology.
    pub fn topology(mut self, topology: PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Set the index buffer and the view into it.
    pub fn indices(mut self, data: impl Into<MeshBuffer<'a>>, index: MeshIndexData) -> Self {
        self.index = Some((data.into(), index));
        self
    }

    /// Copy typed indices into an owned, tightly packed index buffer.
    pub fn indices_from<T: IndexElement>(self, indices: &[T]) -> Self {
        let count = indices.len() as u32;
        self.indices(MeshBuffer::from_pod(indices), MeshIndexData::tight(T::FORMAT, count))
    }

    /// Set the vertex buffer and the attribute views into it.
    pub fn vertices(
        mut self,
        data: impl Into<MeshBuffer<'a>>,
        attributes: Vec<MeshAttributeData>,
    ) -> Self {
        self.vertex_data = data.into();
        self.attributes = attributes;
        self
    }

    /// Set the vertex count explicitly.
    ///
    /// Required for meshes without attributes; otherwise it must agree with
    /// every attribute's count.
    pub fn vertex_count(mut self, count: u32) -> Self {
        self.vertex_count = Some(count);
        self
    }

    /// Set a debug label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Validate and assemble the mesh.
    ///
    /// # Panics
    ///
    /// If an attribute disagrees with the vertex count, reaches past the end
    /// of the vertex buffer, or the index view reaches past the index buffer.
    pub fn build(self) -> MeshData<'a> {
        let vertex_count = match (self.vertex_count, self.attributes.first()) {
            (Some(count), _) => count,
            (None, Some(first)) => first.vertex_count,
            (None, None) => 0,
        };

        let vertex_len = self.vertex_data.len();
        for (id, attr) in self.attributes.iter().enumerate() {
            assert_eq!(
                attr.vertex_count, vertex_count,
                "MeshData: attribute {} ({}) has {} vertices but the mesh has {}",
                id, attr.semantic, attr.vertex_count, vertex_count
            );
            let range = attr.byte_range();
            assert!(
                range.end <= vertex_len,
                "MeshData: attribute {} ({}) spans bytes [{}, {}) but the vertex data is only {} bytes",
                id,
                attr.semantic,
                range.start,
                range.end,
                vertex_len
            );
        }

        if let Some((buffer, desc)) = &self.index {
            let range = desc.byte_range();
            assert!(
                range.end <= buffer.len(),
                "MeshData: {} indices of {:?} at offset {} span bytes [{}, {}) but the index data is only {} bytes",
                desc.count,
                desc.format,
                desc.offset,
                range.start,
                range.end,
                buffer.len()
            );
        }

        log::trace!(
            "MeshData {:?}: {:?}, {} vertices, {} attributes, {} indices",
            self.label,
            self.topology,
            vertex_count,
            self.attributes.len(),
            self.index.as_ref().map_or(0, |(_, desc)| desc.count)
        );

        MeshData {
            topology: self.topology,
            index: self.index,
            vertex_data: Some(self.vertex_data),
            attributes: self.attributes,
            vertex_count,
            label: self.label,
        }
    }
}
