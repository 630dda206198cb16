//! # Meshforge Core
//!
//! Core crate for Meshforge: mesh containers, vertex formats, math helpers
//! and optional profiling instrumentation.

pub mod math;
pub mod mesh;
pub mod profiling;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
