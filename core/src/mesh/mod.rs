//! CPU-side mesh types and generators.
//!
//! This module provides GPU-agnostic mesh data structures:
//!
//! - [`MeshData`] - Index and vertex bytes plus strided attribute views into them
//! - [`MeshBuffer`] - Owned or borrowed byte storage, tagged by [`DataFlags`]
//! - [`IndicesRef`] - Type-erased view over u8/u16/u32 indices
//! - Typed accessors (`positions3d`, `normals`, ...) decoding packed formats
//! - Generators for common shapes (sphere, quad, grid)
//!
//! These types are re-exported by `meshforge-mesh-tools` for convenience.

mod access;
mod data;
pub mod generators;
mod indices;
mod layout;

pub use data::{
    DataFlags, IndexFormat, MeshAttributeData, MeshBuffer, MeshData, MeshDataBuilder,
    MeshIndexData, PrimitiveTopology,
};
pub use indices::{IndexElement, IndicesRef};
pub use layout::{ComponentKind, VertexAttributeFormat, VertexAttributeSemantic};
