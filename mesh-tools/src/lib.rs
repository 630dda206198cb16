//! # Meshforge Mesh Tools
//!
//! Vertex and index processing on top of [`meshforge_core::mesh::MeshData`]:
//! index compression, duplicate removal, interleaving, de-indexing, index
//! generation for strip/loop/fan topologies and normal generation.
//!
//! Functions taking a `&MeshData` return an owned `MeshData<'static>`.
//! [`interleave`] takes the mesh by value and moves owned buffers instead of
//! copying them where it can. Contract violations such as out-of-range
//! indices panic with the name of the offending function; running out of
//! index range is reported through [`MeshToolsError`].

pub mod compress_indices;
pub mod duplicate;
pub mod error;
pub mod flip;
pub mod generate_indices;
pub mod interleave;
pub mod normals;
pub mod remove_duplicates;

pub use meshforge_core::mesh;

pub use compress_indices::{
    compress_indices, compress_indices_as, compress_indices_erased, compress_mesh_indices,
};
pub use duplicate::{duplicate, duplicate_erased, duplicate_mesh};
pub use error::{MeshToolsError, Result};
pub use flip::{flip_face_winding_in_place, flip_normals_in_place};
pub use generate_indices::{
    generate_indices, generate_line_loop_indices, generate_line_strip_indices,
    generate_triangle_fan_indices, generate_triangle_strip_indices, generate_trivial_indices,
};
pub use interleave::{ExtraAttribute, interleave, interleave_ref, interleaved_layout, is_interleaved};
pub use normals::{NormalMode, generate_flat_normals, generate_normals, generate_smooth_normals};
pub use remove_duplicates::{
    FuzzyComponent, epsilon_from_bits, remove_duplicates, remove_duplicates_fuzzy_in_place,
    remove_duplicates_fuzzy_indexed_in_place, remove_duplicates_in_place,
    remove_duplicates_indexed_in_place,
};

/// Mesh tools library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
