//! Scene nodes
//!
//! Every node carries a name, a local transform set by its owner, and a world
//! transform derived from its parent on each update. What else it holds is
//! decided by its [`NodeKind`].

use slotmap::new_key_type;

use crate::foundation::math::Mat4;
use crate::render::{FrameState, Renderer};
use super::shape::ShapeLeaf;
use super::{CubeNode, GeometricNode, SceneError, TexturedCubeNode};

new_key_type! {
    /// Stable handle to a node in a [`SceneGraph`](super::SceneGraph)
    ///
    /// Handles are generational: once a node is removed its handle never
    /// resolves again, even if the slot is reused.
    pub struct NodeId;
}

/// Composite node payload: an ordered list of owned children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphNode {
    pub(super) children: Vec<NodeId>,
}

impl GraphNode {
    /// Children in insertion (render) order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// The closed set of node variants
#[derive(Debug)]
pub enum NodeKind {
    /// Scene graph owning child nodes
    Graph(GraphNode),
    /// Solid coloured cube
    PrimitiveShape(CubeNode),
    /// Cube with a texture
    TexturedShape(TexturedCubeNode),
    /// Generated solid
    ParametricShape(GeometricNode),
}

impl From<CubeNode> for NodeKind {
    fn from(node: CubeNode) -> Self {
        Self::PrimitiveShape(node)
    }
}

impl From<TexturedCubeNode> for NodeKind {
    fn from(node: TexturedCubeNode) -> Self {
        Self::TexturedShape(node)
    }
}

impl From<GeometricNode> for NodeKind {
    fn from(node: GeometricNode) -> Self {
        Self::ParametricShape(node)
    }
}

/// A node in the scene
#[derive(Debug)]
pub struct Node {
    name: String,
    local_transform: Mat4,
    world_transform: Mat4,
    kind: NodeKind,
}

impl Node {
    /// Create a node with identity transforms
    pub fn new(name: impl Into<String>, kind: impl Into<NodeKind>) -> Self {
        Self {
            name: name.into(),
            local_transform: Mat4::identity(),
            world_transform: Mat4::identity(),
            kind: kind.into(),
        }
    }

    /// Create an empty scene graph node
    pub fn graph(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Graph(GraphNode::default()))
    }

    /// Builder pattern: set the local transform
    pub fn with_local_transform(mut self, transform: Mat4) -> Self {
        self.local_transform = transform;
        self
    }

    /// Node name (not unique)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Placement relative to the parent
    pub fn local_transform(&self) -> &Mat4 {
        &self.local_transform
    }

    /// Replace the placement relative to the parent
    ///
    /// Takes effect at the next update.
    pub fn set_local_transform(&mut self, transform: Mat4) {
        self.local_transform = transform;
    }

    /// Placement in root space as of the last update
    pub fn world_transform(&self) -> &Mat4 {
        &self.world_transform
    }

    /// Variant payload
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Whether this node can own children
    pub fn is_graph(&self) -> bool {
        matches!(self.kind, NodeKind::Graph(_))
    }

    /// Children in render order; empty for leaves
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Graph(graph) => graph.children(),
            _ => &[],
        }
    }

    /// Leaf capability, if this node is a shape
    pub fn as_shape(&self) -> Option<&dyn ShapeLeaf> {
        match &self.kind {
            NodeKind::Graph(_) => None,
            NodeKind::PrimitiveShape(shape) => Some(shape),
            NodeKind::TexturedShape(shape) => Some(shape),
            NodeKind::ParametricShape(shape) => Some(shape),
        }
    }

    fn as_shape_mut(&mut self) -> Option<&mut dyn ShapeLeaf> {
        match &mut self.kind {
            NodeKind::Graph(_) => None,
            NodeKind::PrimitiveShape(shape) => Some(shape),
            NodeKind::TexturedShape(shape) => Some(shape),
            NodeKind::ParametricShape(shape) => Some(shape),
        }
    }

    pub(super) fn graph_mut(&mut self) -> Option<&mut GraphNode> {
        match &mut self.kind {
            NodeKind::Graph(graph) => Some(graph),
            _ => None,
        }
    }

    /// Whether the node holds live device resources
    ///
    /// Graph nodes own no device state and always report `true`.
    pub fn is_initialised(&self) -> bool {
        self.as_shape().map_or(true, |shape| shape.is_initialised())
    }

    /// Recompute the world transform from the parent's and return it
    ///
    /// `world = parent_world * local`: the local transform is applied first.
    pub fn update(&mut self, parent_world: &Mat4) -> Mat4 {
        self.world_transform = parent_world * self.local_transform;
        self.world_transform
    }

    /// Initialise this node's own device state (no-op for graphs)
    pub fn initialise(&mut self, renderer: &mut dyn Renderer) -> Result<(), SceneError> {
        let name = self.name.clone();
        match self.as_shape_mut() {
            Some(shape) => shape.initialise(&name, renderer),
            None => Ok(()),
        }
    }

    /// Draw this node with its current world transform (no-op for graphs)
    pub fn render(&self, frame: &FrameState, renderer: &mut dyn Renderer) -> Result<(), SceneError> {
        match self.as_shape() {
            Some(shape) => shape.render(&self.name, &self.world_transform, frame, renderer),
            None => Ok(()),
        }
    }

    /// Release this node's own device state (no-op for graphs)
    pub fn shutdown(&mut self, renderer: &mut dyn Renderer) {
        let name = self.name.clone();
        if let Some(shape) = self.as_shape_mut() {
            shape.shutdown(&name, renderer);
        }
    }
}
