//! Core primitive types for rendering
//!
//! Vertex and mesh data shared by every shape node, plus generators for
//! parametric solids.

pub mod mesh;
pub mod parametric;

// Re-export commonly used types
pub use mesh::{Mesh, MeshError, Vertex};
pub use parametric::{ParametricShape, MIN_TESSELLATION};
