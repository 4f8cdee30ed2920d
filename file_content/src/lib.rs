//! # File Content Provider
//!
//! This crate implements the read/write contract for regular-file nodes.
//! Each file node carries one immutable byte buffer attached at creation;
//! reads are offset-bounded slices of that buffer and writes are rejected.
//!
//! ## Philosophy
//!
//! - **Caller-owned offsets**: a read at an offset is stateless and
//!   re-enterable; the provider keeps no cursor, so two reads at the same
//!   offset return identical bytes.
//! - **Immutable content**: buffers are `Arc<[u8]>`, shared freely with any
//!   number of concurrent readers and never mutated. Writes fail with
//!   [`ContentError::ReadOnly`] rather than being silently swallowed.

use fs_types::NodeId;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by the content provider
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    /// No buffer is attached to the node
    #[error("no content attached to {0}")]
    NotFound(NodeId),

    /// The node already has a buffer
    #[error("content already attached to {0}")]
    AlreadyAttached(NodeId),

    /// Writes are not supported on this filesystem
    #[error("{0} is read-only")]
    ReadOnly(NodeId),
}

/// Opaque token scoping read/write calls to one opened node
///
/// Opening allocates no per-open state; the handle is only the success
/// marker the operation contract requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHandle {
    node: NodeId,
}

impl FileHandle {
    /// The node this handle was opened on
    pub fn node(&self) -> NodeId {
        self.node
    }
}

/// Owns the byte buffers of every regular-file node in one namespace
pub struct ContentStore {
    buffers: HashMap<NodeId, Arc<[u8]>>,
}

impl ContentStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
        }
    }

    /// Attaches an immutable buffer to a node
    pub fn attach(&mut self, node: NodeId, bytes: impl Into<Arc<[u8]>>) -> Result<(), ContentError> {
        if self.buffers.contains_key(&node) {
            return Err(ContentError::AlreadyAttached(node));
        }
        self.buffers.insert(node, bytes.into());
        Ok(())
    }

    /// Removes a node's buffer, returning it (rollback and teardown)
    pub fn detach(&mut self, node: NodeId) -> Option<Arc<[u8]>> {
        self.buffers.remove(&node)
    }

    /// Opens a node for reading
    pub fn open(&self, node: NodeId) -> Result<FileHandle, ContentError> {
        if !self.buffers.contains_key(&node) {
            return Err(ContentError::NotFound(node));
        }
        Ok(FileHandle { node })
    }

    /// Reads up to `max_len` bytes starting at `offset`
    ///
    /// An offset at or past the end of content returns an empty vector: the
    /// normal end-of-stream signal, not an error.
    pub fn read(
        &self,
        handle: FileHandle,
        offset: u64,
        max_len: usize,
    ) -> Result<Vec<u8>, ContentError> {
        let buffer = self
            .buffers
            .get(&handle.node)
            .ok_or(ContentError::NotFound(handle.node))?;
        let len = buffer.len() as u64;
        if offset >= len {
            return Ok(Vec::new());
        }
        let start = offset as usize;
        let take = max_len.min(buffer.len() - start);
        Ok(buffer[start..start + take].to_vec())
    }

    /// Rejects a write
    ///
    /// Content is immutable on this filesystem; the call never mutates and
    /// always reports [`ContentError::ReadOnly`].
    pub fn write(
        &self,
        handle: FileHandle,
        _bytes: &[u8],
        _offset: u64,
    ) -> Result<usize, ContentError> {
        Err(ContentError::ReadOnly(handle.node))
    }

    /// Length of the buffer behind a handle
    pub fn size(&self, handle: FileHandle) -> Result<u64, ContentError> {
        self.buffers
            .get(&handle.node)
            .map(|buffer| buffer.len() as u64)
            .ok_or(ContentError::NotFound(handle.node))
    }

    /// Length of the buffer attached to a node, if any
    pub fn size_of(&self, node: NodeId) -> Option<u64> {
        self.buffers.get(&node).map(|buffer| buffer.len() as u64)
    }

    /// Clones out the shared buffer for lock-free concurrent readers
    pub fn share(&self, node: NodeId) -> Result<Arc<[u8]>, ContentError> {
        self.buffers
            .get(&node)
            .cloned()
            .ok_or(ContentError::NotFound(node))
    }

    /// Number of attached buffers
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Returns true if no buffers are attached
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Drops every buffer (namespace teardown)
    pub fn clear(&mut self) {
        self.buffers.clear();
    }
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &[u8] = b"Hello World!";

    fn store_with_hello() -> (ContentStore, FileHandle) {
        let node = NodeId::from_raw(1);
        let mut store = ContentStore::new();
        store.attach(node, HELLO.to_vec()).unwrap();
        let handle = store.open(node).unwrap();
        (store, handle)
    }

    #[test]
    fn test_read_whole_content() {
        let (store, handle) = store_with_hello();
        assert_eq!(store.read(handle, 0, 100).unwrap(), HELLO);
    }

    #[test]
    fn test_read_from_offset() {
        let (store, handle) = store_with_hello();
        assert_eq!(store.read(handle, 5, 100).unwrap(), b" World!");
        assert_eq!(store.read(handle, 6, 100).unwrap(), b"World!");
    }

    #[test]
    fn test_read_is_length_bounded() {
        let (store, handle) = store_with_hello();
        assert_eq!(store.read(handle, 0, 3).unwrap(), b"Hel");
    }

    #[test]
    fn test_read_at_end_is_empty_not_error() {
        let (store, handle) = store_with_hello();
        assert_eq!(store.read(handle, 12, 5).unwrap(), Vec::<u8>::new());
        assert_eq!(store.read(handle, 20, 5).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_reads_are_reenterable() {
        let (store, handle) = store_with_hello();
        let first = store.read(handle, 3, 4).unwrap();
        let second = store.read(handle, 3, 4).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_is_rejected() {
        let (store, handle) = store_with_hello();
        let result = store.write(handle, b"ZZZ", 0);
        assert_eq!(result, Err(ContentError::ReadOnly(handle.node())));
        // Content unchanged by the attempt.
        assert_eq!(store.read(handle, 0, 3).unwrap(), b"Hel");
    }

    #[test]
    fn test_open_without_content_fails() {
        let store = ContentStore::new();
        let node = NodeId::from_raw(2);
        assert_eq!(store.open(node), Err(ContentError::NotFound(node)));
    }

    #[test]
    fn test_double_attach_is_rejected() {
        let node = NodeId::from_raw(3);
        let mut store = ContentStore::new();
        store.attach(node, HELLO.to_vec()).unwrap();
        let result = store.attach(node, b"other".to_vec());
        assert_eq!(result, Err(ContentError::AlreadyAttached(node)));
    }

    #[test]
    fn test_size_and_share() {
        let (store, handle) = store_with_hello();
        assert_eq!(store.size(handle).unwrap(), 12);
        let shared = store.share(handle.node()).unwrap();
        assert_eq!(&shared[..], HELLO);
    }

    #[test]
    fn test_detach_and_clear() {
        let (mut store, handle) = store_with_hello();
        assert!(store.detach(handle.node()).is_some());
        assert!(store.is_empty());
        store.attach(NodeId::from_raw(9), HELLO.to_vec()).unwrap();
        store.clear();
        assert_eq!(store.len(), 0);
    }
}
