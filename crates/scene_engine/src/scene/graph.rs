//! Arena-backed scene graph
//!
//! All traversals are depth-first and visit children in insertion order.
//! Find is pre-order and returns the first match, checking a node before its
//! children. Remove descends into children before erasing from the current
//! list, so the first direct match in depth-first order is the one removed.

use log::{debug, error, info};
use slotmap::SlotMap;

use crate::foundation::math::Mat4;
use crate::render::{FrameState, Renderer};
use super::node::{Node, NodeId};
use super::SceneError;

/// Tree of nodes rooted at a single scene graph node
#[derive(Debug)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl SceneGraph {
    /// Create a graph containing only an empty root graph node
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::graph(root_name));
        Self { nodes, root }
    }

    /// Handle of the root node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the handle refers to a node in this graph
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Look up a node for modification
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Children of a node in render order; empty for leaves and unknown ids
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(Node::children).unwrap_or_default()
    }

    /// Set a node's local transform, picked up at the next update
    pub fn set_local_transform(&mut self, id: NodeId, transform: Mat4) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))?;
        node.set_local_transform(transform);
        Ok(())
    }

    /// World transform of a node as of the last update
    pub fn world_transform(&self, id: NodeId) -> Option<Mat4> {
        self.nodes.get(id).map(|node| *node.world_transform())
    }

    /// Append a node to the end of a graph node's children
    ///
    /// The graph takes ownership; the returned handle stays valid until the
    /// node is removed.
    pub fn add(&mut self, graph: NodeId, node: Node) -> Result<NodeId, SceneError> {
        let parent = self.nodes.get(graph).ok_or(SceneError::UnknownNode(graph))?;
        if !parent.is_graph() {
            return Err(SceneError::NotAGraph(parent.name().to_string()));
        }
        let parent_name = parent.name().to_string();

        debug!("Adding '{}' to '{}'", node.name(), parent_name);
        let id = self.nodes.insert(node);
        if let Some(children) = self.nodes.get_mut(graph).and_then(Node::graph_mut) {
            children.children.push(id);
        }
        Ok(id)
    }

    /// Append a node to the root's children
    pub fn add_to_root(&mut self, node: Node) -> Result<NodeId, SceneError> {
        self.add(self.root, node)
    }

    /// Detach a node from anywhere beneath `graph`
    ///
    /// Children are searched before the graph's own list, and a node is
    /// matched by identity, not name. The detached subtree leaves the arena
    /// and is returned in pre-order so the caller can shut down any device
    /// resources it still holds. Removing a node that is not present (or
    /// removing from a leaf) does nothing and returns an empty list.
    ///
    /// Dropping the returned nodes does not release their device resources;
    /// use [`SceneGraph::remove_and_shutdown`] when they are not needed.
    #[must_use = "removed nodes still hold device resources; shut them down or use remove_and_shutdown"]
    pub fn remove(&mut self, graph: NodeId, node: NodeId) -> Vec<Node> {
        if !self.detach(graph, node) {
            return Vec::new();
        }

        let mut subtree = Vec::new();
        self.collect_preorder(node, &mut subtree);
        debug!("Removed subtree of {} node(s)", subtree.len());
        subtree.into_iter().filter_map(|id| self.nodes.remove(id)).collect()
    }

    /// Detach a node like [`SceneGraph::remove`] and release the device
    /// resources of the whole removed subtree
    ///
    /// Returns the number of nodes removed.
    pub fn remove_and_shutdown(&mut self, graph: NodeId, node: NodeId, renderer: &mut dyn Renderer) -> usize {
        let mut removed = self.remove(graph, node);
        for node in &mut removed {
            node.shutdown(renderer);
        }
        removed.len()
    }

    fn detach(&mut self, graph: NodeId, target: NodeId) -> bool {
        let mut detached = false;
        let mut index = 0;
        while let Some(child) = self.child_at(graph, index) {
            detached |= self.detach(child, target);
            index += 1;
        }

        if let Some(parent) = self.nodes.get_mut(graph).and_then(Node::graph_mut) {
            let before = parent.children.len();
            parent.children.retain(|&child| child != target);
            detached |= parent.children.len() != before;
        }
        detached
    }

    fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.nodes.get(id)?.children().get(index).copied()
    }

    fn collect_preorder(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if let Some(node) = self.nodes.get(id) {
            out.push(id);
            for &child in node.children() {
                self.collect_preorder(child, out);
            }
        }
    }

    /// Handles of a node and all its descendants in pre-order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_preorder(id, &mut out);
        out
    }

    /// First node named `name` in pre-order, starting at the root
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.find_from(self.root, name)
    }

    /// First node named `name` in pre-order, starting at `start` itself
    pub fn find_from(&self, start: NodeId, name: &str) -> Option<NodeId> {
        let node = self.nodes.get(start)?;
        if node.name() == name {
            return Some(start);
        }
        node.children().iter().find_map(|&child| self.find_from(child, name))
    }

    /// Initialise every node, stopping at the first failure
    ///
    /// Nodes initialised before the failure keep their resources; the caller
    /// decides whether to shut the graph down.
    pub fn initialise(&mut self, renderer: &mut dyn Renderer) -> Result<(), SceneError> {
        let result = self.initialise_node(self.root, renderer);
        match &result {
            Ok(()) => info!("Scene graph initialised ({} nodes)", self.nodes.len()),
            Err(e) => error!("Scene graph initialisation failed: {}", e),
        }
        result
    }

    /// Initialise a node and its subtree in depth-first order
    pub fn initialise_node(&mut self, id: NodeId, renderer: &mut dyn Renderer) -> Result<(), SceneError> {
        self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))?.initialise(renderer)?;

        let mut index = 0;
        while let Some(child) = self.child_at(id, index) {
            self.initialise_node(child, renderer)?;
            index += 1;
        }
        Ok(())
    }

    /// Recompute every world transform from the root down
    pub fn update(&mut self, parent_world: &Mat4) {
        self.update_node(self.root, parent_world);
    }

    /// Recompute the world transforms of a node and its subtree
    ///
    /// Each node computes its own world transform before any child does.
    pub fn update_node(&mut self, id: NodeId, parent_world: &Mat4) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let world = node.update(parent_world);

        let mut index = 0;
        while let Some(child) = self.child_at(id, index) {
            self.update_node(child, &world);
            index += 1;
        }
    }

    /// Draw every shape in depth-first order
    pub fn render(&self, frame: &FrameState, renderer: &mut dyn Renderer) -> Result<(), SceneError> {
        self.render_node(self.root, frame, renderer)
    }

    /// Draw a node and its subtree
    pub fn render_node(&self, id: NodeId, frame: &FrameState, renderer: &mut dyn Renderer) -> Result<(), SceneError> {
        let node = self.nodes.get(id).ok_or(SceneError::UnknownNode(id))?;
        node.render(frame, renderer)?;
        for &child in node.children() {
            self.render_node(child, frame, renderer)?;
        }
        Ok(())
    }

    /// Release every node's device resources
    ///
    /// Safe to call more than once; nodes stay in the graph and can be
    /// initialised again.
    pub fn shutdown(&mut self, renderer: &mut dyn Renderer) {
        self.shutdown_node(self.root, renderer);
        debug!("Scene graph shut down");
    }

    /// Release the device resources of a node and its subtree
    pub fn shutdown_node(&mut self, id: NodeId, renderer: &mut dyn Renderer) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.shutdown(renderer);

        let mut index = 0;
        while let Some(child) = self.child_at(id, index) {
            self.shutdown_node(child, renderer);
            index += 1;
        }
    }
}
