//! af-network: network/model layer for the airflow engine.
//!
//! Provides:
//! - Zone nodes with temperature, elevation, volume, and derived density
//! - Directed links carrying one flow element each
//! - The `Network` container with id-indexed O(1) lookup
//! - Lazy solve-time validation (ambient presence, connectivity)
//!
//! # Example
//!
//! ```
//! use af_network::{Network, Node, NodeKind};
//! use af_core::units::m3;
//! use af_elements::PowerLawOrifice;
//!
//! let mut network = Network::new();
//! network.add_node(Node::new(1, "Outdoor", NodeKind::Ambient)).unwrap();
//! network.add_node(Node::new(2, "Room", NodeKind::Normal).with_volume(m3(50.0))).unwrap();
//! network
//!     .add_link(10, 1, 2, 0.0, PowerLawOrifice::new(0.002, 0.65).unwrap().into())
//!     .unwrap();
//!
//! assert_eq!(network.node_count(), 2);
//! assert_eq!(network.link_count(), 1);
//! assert!(network.validate_for_solve().is_ok());
//! ```

pub mod ambient;
pub mod error;
pub mod link;
pub mod network;
pub mod node;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use ambient::Ambient;
pub use error::NetworkError;
pub use link::Link;
pub use network::Network;
pub use node::{Node, NodeKind};
