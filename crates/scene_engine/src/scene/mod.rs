//! Scene graph
//!
//! A tree of named nodes, each with a local transform relative to its parent
//! and a cumulative world transform recomputed on every update. Composite
//! graph nodes own an ordered list of children; leaf shape nodes own geometry
//! and device resources and draw themselves.
//!
//! ## Architecture
//!
//! ```text
//! Engine (frame driver)
//!      ↓  update(identity) → render() each frame
//! SceneGraph (arena of nodes, root graph)
//!      ↓  depth-first, insertion order
//! Shape nodes → Renderer (device)
//! ```
//!
//! Nodes live in a [`slotmap`] arena and are addressed by [`NodeId`]. Adding
//! takes an owned [`Node`] and returns its handle, so every node has exactly
//! one parent and cycles cannot be built.

mod node;
mod graph;
mod shape;
mod cube_node;
mod geometric_node;


pub use node::{Node, NodeId, NodeKind, GraphNode};
pub use graph::SceneGraph;
pub use shape::{ShapeLeaf, ShapeState, SHADER_FILE, TEXTURED_SHADER_FILE, VERTEX_SHADER_ENTRY, PIXEL_SHADER_ENTRY};
pub use cube_node::{CubeNode, TexturedCubeNode};
pub use geometric_node::GeometricNode;

use thiserror::Error;

use crate::render::{MeshError, RenderError};

/// Scene graph errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The device was not available when a node tried to initialise
    #[error("Render device unavailable while initialising '{node}'")]
    DeviceUnavailable {
        /// Name of the node that failed
        node: String,
    },

    /// A node's geometry could not be built
    #[error("Failed to build mesh for '{node}': {source}")]
    Mesh {
        /// Name of the node that failed
        node: String,
        /// Underlying mesh error
        source: MeshError,
    },

    /// A device call made on behalf of a node failed
    #[error("Device error in '{node}': {source}")]
    Render {
        /// Name of the node that failed
        node: String,
        /// Underlying device error
        source: RenderError,
    },

    /// The handle does not refer to a node in this graph
    #[error("Unknown node {0:?}")]
    UnknownNode(NodeId),

    /// Children can only be added to scene graph nodes
    #[error("Node '{0}' is not a scene graph")]
    NotAGraph(String),
}
