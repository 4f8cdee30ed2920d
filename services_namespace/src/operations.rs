//! Per-node operations
//!
//! This module defines the operation surface a consumer sees after a mount,
//! dispatched over the closed [`NodeKind`] set: directories answer lookup,
//! listing, and child creation; regular files answer open, read, write, and
//! stat.

use crate::service::NamespaceHandle;
use file_content::{ContentError, FileHandle};
use fs_types::{FileMode, NamespaceId, NodeId, NodeKind, Timestamp};
use namespace_tree::{Binding, TreeError};
use node_registry::RegistryError;
use thiserror::Error;

/// Errors raised by per-node operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OperationError {
    /// Binding/lookup layer error (not found, conflict, not a directory)
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    /// Node record layer error (out of slots, missing record)
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Content layer error (read-only, no buffer)
    #[error("content error: {0}")]
    Content(#[from] ContentError),

    /// A file operation was dispatched to a non-file node
    #[error("not a regular file: {0}")]
    NotAFile(NodeId),

    /// The handle refers to a namespace that is no longer mounted
    #[error("namespace is not mounted: {0}")]
    NotMounted(NamespaceId),
}

/// Metadata reported for one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStat {
    /// Node identity
    pub id: NodeId,
    /// Directory or regular file
    pub kind: NodeKind,
    /// Permission bits recorded at creation
    pub mode: FileMode,
    /// Number of bindings referencing the node
    pub links: u32,
    /// Content length in bytes (regular files only)
    pub size: Option<u64>,
    /// Number of child bindings (directories only)
    pub entry_count: Option<usize>,
    /// Creation instant
    pub created_at: Timestamp,
}

/// The operation surface of mounted namespaces
///
/// Implemented by the mount service; every call is scoped by a
/// [`NamespaceHandle`] and fails with [`OperationError::NotMounted`] once
/// the namespace is gone.
pub trait NamespaceOperations {
    /// Resolves one name under a directory
    fn lookup(
        &self,
        ns: NamespaceHandle,
        dir: NodeId,
        name: &str,
    ) -> Result<NodeId, OperationError>;

    /// Resolves a multi-segment path from the namespace root
    fn resolve(&self, ns: NamespaceHandle, path: &str) -> Result<NodeId, OperationError>;

    /// Lists a directory's bindings, sorted by name
    fn list(&self, ns: NamespaceHandle, dir: NodeId) -> Result<Vec<Binding>, OperationError>;

    /// Creates and binds a new child under a directory
    fn create_child(
        &self,
        ns: NamespaceHandle,
        dir: NodeId,
        name: &str,
        kind: NodeKind,
        mode: FileMode,
    ) -> Result<NodeId, OperationError>;

    /// Opens a regular file
    fn open(&self, ns: NamespaceHandle, node: NodeId) -> Result<FileHandle, OperationError>;

    /// Reads up to `max_len` bytes at `offset`; empty result past the end
    fn read(
        &self,
        ns: NamespaceHandle,
        handle: FileHandle,
        offset: u64,
        max_len: usize,
    ) -> Result<Vec<u8>, OperationError>;

    /// Attempts a write; this filesystem rejects it as read-only
    fn write(
        &self,
        ns: NamespaceHandle,
        handle: FileHandle,
        bytes: &[u8],
        offset: u64,
    ) -> Result<usize, OperationError>;

    /// Reports a node's metadata
    fn stat(&self, ns: NamespaceHandle, node: NodeId) -> Result<NodeStat, OperationError>;
}
