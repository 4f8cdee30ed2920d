//! # Namespace Tree
//!
//! This crate implements the dentry-equivalent layer of the namespace: the
//! parent→child name edges. A binding associates one name under one
//! directory with one target node; names are unique among siblings and
//! every node except the root is reachable by exactly one binding chain.
//!
//! Node records themselves live in a [`node_registry::NodeRegistry`]; the
//! tree only stores identities.

pub mod path;
pub mod tree;

pub use path::PathError;
pub use tree::{Binding, NamespaceTree, TreeError};
