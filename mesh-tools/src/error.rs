//! Mesh tools error types.
//!
//! Only data-dependent capacity problems are reported here. Malformed calls
//! (wrong element size, out-of-range attribute ids, bad padding) panic.

use meshforge_core::mesh::IndexFormat;
use thiserror::Error;

/// Data-dependent failures of the mesh processing functions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshToolsError {
    /// An index doesn't fit into the requested fixed index type.
    #[error("index {value} at position {position} doesn't fit into {format:?}")]
    IndexOverflow {
        /// Position of the offending index in the input.
        position: usize,
        /// The index value after offset subtraction.
        value: u32,
        /// Requested index format.
        format: IndexFormat,
    },
    /// The index type can't address every vertex.
    #[error("{format:?} indices can't address {vertex_count} vertices")]
    IndexTypeTooSmall {
        /// Index format of the index buffer.
        format: IndexFormat,
        /// Number of vertices that need addressing.
        vertex_count: usize,
    },
    /// An extra attribute payload has the wrong number of elements.
    #[error("extra attribute {index} has {actual} elements but the mesh has {expected} vertices")]
    ExtraAttributeCountMismatch {
        /// Position of the attribute in the extras list.
        index: usize,
        /// Vertex count of the mesh.
        expected: usize,
        /// Number of elements in the payload.
        actual: usize,
    },
}

/// Result alias for mesh tools operations.
pub type Result<T> = std::result::Result<T, MeshToolsError>;
