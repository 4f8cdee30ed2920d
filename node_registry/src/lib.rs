//! # Node Registry
//!
//! This crate implements the inode-equivalent layer of the namespace: it
//! allocates node records, assigns each a process-unique identity, and owns
//! the records for the lifetime of the namespace.
//!
//! ## Philosophy
//!
//! - **Single owner**: records live inside the registry; every other
//!   component refers to them by [`NodeId`].
//! - **Explicit failure**: allocation against an exhausted slot limit is an
//!   error the caller must handle, never a retry loop.
//! - **No implicit cleanup**: a caller that bound a name to a node before a
//!   later step failed must unbind it itself.

use fs_types::{Clock, FileMode, NodeId, NodeKind, SystemClock, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by node allocation and record access
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry's node-slot limit is exhausted
    #[error("out of node slots (limit {limit})")]
    OutOfResources {
        /// The configured slot limit
        limit: usize,
    },

    /// No record exists for the given id
    #[error("no node record for {0}")]
    NotFound(NodeId),
}

/// One node record (the inode equivalent)
///
/// Kind, mode, and timestamps are fixed at creation. The link count tracks
/// how many name bindings reference the node; the root is pinned at 2 by
/// convention (self plus the parent binding it does not actually have).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Process-unique identity
    pub id: NodeId,
    /// Directory or regular file, immutable
    pub kind: NodeKind,
    /// Permission bits recorded at creation (no chmod)
    pub mode: FileMode,
    /// Creation instant
    pub created_at: Timestamp,
    /// Modification instant (never updated after creation here)
    pub modified_at: Timestamp,
    /// Access instant (never updated after creation here)
    pub accessed_at: Timestamp,
    links: u32,
}

impl NodeRecord {
    /// Number of name bindings referencing this node
    pub fn links(&self) -> u32 {
        self.links
    }
}

/// Allocates and owns node records for one namespace
pub struct NodeRegistry {
    nodes: HashMap<NodeId, NodeRecord>,
    next_id: u64,
    limit: Option<usize>,
    clock: Box<dyn Clock>,
}

impl NodeRegistry {
    /// Creates a registry with no slot limit, using the system clock
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            next_id: 1,
            limit: None,
            clock: Box::new(SystemClock),
        }
    }

    /// Caps the number of live records
    ///
    /// Allocation past the cap fails with [`RegistryError::OutOfResources`];
    /// mount tests use this to force allocation failure at a chosen step.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Replaces the clock used for record timestamps
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Allocates a fresh node record
    ///
    /// The record starts with link count 0; the binding that names the node
    /// brings it to 1.
    pub fn allocate(&mut self, kind: NodeKind, mode: FileMode) -> Result<NodeId, RegistryError> {
        self.insert_record(kind, mode, 0)
    }

    /// Allocates the root directory record
    ///
    /// The root starts with link count 2: itself plus the conventional
    /// parent binding a mounted root is expected to report.
    pub fn allocate_root(&mut self, mode: FileMode) -> Result<NodeId, RegistryError> {
        self.insert_record(NodeKind::Directory, mode, 2)
    }

    fn insert_record(
        &mut self,
        kind: NodeKind,
        mode: FileMode,
        links: u32,
    ) -> Result<NodeId, RegistryError> {
        if let Some(limit) = self.limit {
            if self.nodes.len() >= limit {
                return Err(RegistryError::OutOfResources { limit });
            }
        }
        let id = NodeId::from_raw(self.next_id);
        self.next_id += 1;
        let now = self.clock.now();
        let record = NodeRecord {
            id,
            kind,
            mode,
            created_at: now,
            modified_at: now,
            accessed_at: now,
            links,
        };
        self.nodes.insert(id, record);
        Ok(id)
    }

    /// Gets a record by id
    pub fn get(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(&id)
    }

    /// Returns true if a record exists for the id
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns the kind of a node, if it exists
    pub fn kind_of(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(&id).map(|record| record.kind)
    }

    /// Increments a node's link count (a binding now references it)
    pub fn increment_links(&mut self, id: NodeId) -> Result<(), RegistryError> {
        let record = self.nodes.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        record.links += 1;
        Ok(())
    }

    /// Decrements a node's link count (a binding was removed)
    pub fn decrement_links(&mut self, id: NodeId) -> Result<(), RegistryError> {
        let record = self.nodes.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        record.links = record.links.saturating_sub(1);
        Ok(())
    }

    /// Removes a record, returning it
    pub fn release(&mut self, id: NodeId) -> Result<NodeRecord, RegistryError> {
        self.nodes.remove(&id).ok_or(RegistryError::NotFound(id))
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no records are live
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drops every record (namespace teardown)
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
