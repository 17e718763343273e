//! The alloy backed implementations of the node, artifact registry and contract interfaces.

pub mod artifact_store;
pub mod bound_contract;
pub mod rpc_node;

pub use artifact_store::*;
pub use bound_contract::*;
pub use rpc_node::*;
