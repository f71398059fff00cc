//! Solve-time topology validation.

use std::collections::VecDeque;

use crate::error::{NetworkError, NetworkResult};
use crate::network::Network;

/// Check that the network has an ambient boundary and that every normal
/// node can reach one through the link graph (links taken as undirected).
///
/// An unreachable normal node would make its pressure equation singular, so
/// it is reported by id rather than silently solved to a default pressure.
pub(crate) fn validate_topology(network: &Network) -> NetworkResult<()> {
    let n = network.node_count();

    let ambient: Vec<usize> = network
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, node)| node.is_known_pressure())
        .map(|(i, _)| i)
        .collect();

    if ambient.is_empty() {
        return Err(NetworkError::NoAmbientNode);
    }

    // Undirected adjacency over link endpoints
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for link in network.links() {
        let i = link.from.index() as usize;
        let j = link.to.index() as usize;
        adjacency[i].push(j);
        adjacency[j].push(i);
    }

    // BFS from all ambient nodes at once
    let mut reached = vec![false; n];
    let mut queue: VecDeque<usize> = ambient.into_iter().collect();
    for &start in &queue {
        reached[start] = true;
    }
    while let Some(i) = queue.pop_front() {
        for &j in &adjacency[i] {
            if !reached[j] {
                reached[j] = true;
                queue.push_back(j);
            }
        }
    }

    for (i, node) in network.nodes().iter().enumerate() {
        if !node.is_known_pressure() && !reached[i] {
            return Err(NetworkError::UnreachableNode {
                id: node.id,
                name: node.name.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeKind};
    use af_elements::{Element, PowerLawOrifice};

    fn orifice() -> Element {
        PowerLawOrifice::new(0.002, 0.65).unwrap().into()
    }

    #[test]
    fn empty_network_has_no_ambient() {
        let network = Network::new();
        assert_eq!(
            validate_topology(&network).unwrap_err(),
            NetworkError::NoAmbientNode
        );
    }

    #[test]
    fn all_normal_nodes_is_an_error() {
        let mut network = Network::new();
        network
            .add_node(Node::new(1, "A", NodeKind::Normal))
            .unwrap();
        network
            .add_node(Node::new(2, "B", NodeKind::Normal))
            .unwrap();
        network.add_link(10, 1, 2, 0.0, orifice()).unwrap();
        assert_eq!(
            validate_topology(&network).unwrap_err(),
            NetworkError::NoAmbientNode
        );
    }

    #[test]
    fn disconnected_normal_node_reported() {
        let mut network = Network::new();
        network
            .add_node(Node::new(1, "Out", NodeKind::Ambient))
            .unwrap();
        network
            .add_node(Node::new(2, "Room", NodeKind::Normal))
            .unwrap();
        network
            .add_node(Node::new(3, "Island", NodeKind::Normal))
            .unwrap();
        network.add_link(10, 1, 2, 0.0, orifice()).unwrap();

        match validate_topology(&network).unwrap_err() {
            NetworkError::UnreachableNode { id, .. } => assert_eq!(id, 3),
            other => unreachable!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn reversed_links_still_connect() {
        // Link direction is bookkeeping; reachability is undirected
        let mut network = Network::new();
        network
            .add_node(Node::new(1, "Out", NodeKind::Ambient))
            .unwrap();
        network
            .add_node(Node::new(2, "Room", NodeKind::Normal))
            .unwrap();
        network.add_link(10, 2, 1, 0.0, orifice()).unwrap();
        assert!(validate_topology(&network).is_ok());
    }

    #[test]
    fn ambient_only_network_is_valid() {
        let mut network = Network::new();
        network
            .add_node(Node::new(1, "Out", NodeKind::Ambient))
            .unwrap();
        assert!(validate_topology(&network).is_ok());
    }
}
