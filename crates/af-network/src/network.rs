//! The network container.

use std::collections::HashMap;

use af_core::{LinkId, NodeId};
use af_elements::Element;

use crate::ambient::Ambient;
use crate::error::{NetworkError, NetworkResult};
use crate::link::Link;
use crate::node::Node;
use crate::validate;

/// A network of zone nodes and directed links.
///
/// Construction-time invariants (checked eagerly): node and link ids are
/// unique, every link references existing nodes. Solve-time invariants
/// (checked lazily by [`Network::validate_for_solve`]): at least one ambient
/// node exists and every normal node can reach one treating links as
/// undirected edges; partially built networks are legal in between.
#[derive(Debug, Clone, Default)]
pub struct Network {
    nodes: Vec<Node>,
    links: Vec<Link>,
    node_index: HashMap<i64, NodeId>,
    link_index: HashMap<i64, LinkId>,
    pub ambient: Ambient,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; fails on a duplicate id.
    pub fn add_node(&mut self, node: Node) -> NetworkResult<NodeId> {
        if self.node_index.contains_key(&node.id) {
            return Err(NetworkError::DuplicateNodeId { id: node.id });
        }
        let idx = NodeId::from_index(self.nodes.len() as u32);
        self.node_index.insert(node.id, idx);
        self.nodes.push(node);
        Ok(idx)
    }

    /// Add a link between two node ids; fails on a duplicate link id or an
    /// unknown endpoint.
    pub fn add_link(
        &mut self,
        id: i64,
        from: i64,
        to: i64,
        elevation: f64,
        element: Element,
    ) -> NetworkResult<LinkId> {
        if self.link_index.contains_key(&id) {
            return Err(NetworkError::DuplicateLinkId { id });
        }
        let from_idx = *self
            .node_index
            .get(&from)
            .ok_or(NetworkError::UnknownNode { link: id, node: from })?;
        let to_idx = *self
            .node_index
            .get(&to)
            .ok_or(NetworkError::UnknownNode { link: id, node: to })?;

        let idx = LinkId::from_index(self.links.len() as u32);
        self.link_index.insert(id, idx);
        self.links
            .push(Link::new(id, from_idx, to_idx, elevation, element));
        Ok(idx)
    }

    /// O(1) node count.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// O(1) link count.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut [Link] {
        &mut self.links
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index() as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index() as usize]
    }

    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id.index() as usize]
    }

    pub fn link_mut(&mut self, id: LinkId) -> &mut Link {
        &mut self.links[id.index() as usize]
    }

    /// Resolve an external node id to its index handle.
    pub fn node_id(&self, id: i64) -> NetworkResult<NodeId> {
        self.node_index
            .get(&id)
            .copied()
            .ok_or(NetworkError::NodeNotFound { id })
    }

    /// Resolve an external link id to its index handle.
    pub fn link_id(&self, id: i64) -> NetworkResult<LinkId> {
        self.link_index
            .get(&id)
            .copied()
            .ok_or(NetworkError::LinkNotFound { id })
    }

    /// Number of unknown-pressure (normal) nodes.
    pub fn unknown_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_known_pressure()).count()
    }

    /// Recompute every node's density at its current state.
    pub fn update_densities(&mut self) {
        for node in &mut self.nodes {
            node.update_density();
        }
    }

    /// Solve-time validation: ambient presence and connectivity.
    pub fn validate_for_solve(&self) -> NetworkResult<()> {
        validate::validate_topology(self)
    }
}
