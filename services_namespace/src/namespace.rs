//! One mounted namespace instance (the superblock equivalent)

use crate::builder;
use crate::operations::{NodeStat, OperationError};
use crate::service::{FilesystemType, MountError};
use file_content::{ContentStore, FileHandle};
use fs_types::{FileMode, NamespaceId, NodeId, NodeKind};
use namespace_tree::{Binding, NamespaceTree, TreeError};
use node_registry::NodeRegistry;

/// Mount lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    /// Not attached; all resources released
    Unmounted,
    /// Root allocation and layout construction in progress
    Mounting,
    /// Live and visible to consumers
    Mounted,
    /// Teardown in progress
    Unmounting,
}

/// Options accepted by mount
#[derive(Debug, Clone, Default)]
pub struct MountOptions {
    /// Caps the node registry's live records; mount-atomicity tests use
    /// this to force allocation failure at a chosen build step
    pub node_limit: Option<usize>,
}

/// One mounted instance: root anchor, block geometry, and the owned
/// registry, tree, and content store
///
/// A `Namespace` only exists fully built. Mount either returns a live
/// instance or an error with everything released; there is no partially
/// usable state in between.
pub struct Namespace {
    id: NamespaceId,
    fs_name: String,
    magic: u64,
    block_size: u32,
    block_size_bits: u32,
    root: NodeId,
    state: MountState,
    registry: NodeRegistry,
    tree: NamespaceTree,
    contents: ContentStore,
}

impl Namespace {
    /// Mounts a new namespace of the given filesystem type
    ///
    /// Allocates the root directory (mode rwxr-xr-x), anchors it, then runs
    /// the builder over the type's layout. Any failure releases everything
    /// allocated so far and propagates as a [`MountError`].
    pub fn mount(fstype: &FilesystemType, options: &MountOptions) -> Result<Self, MountError> {
        if fstype.block_size != 1u32 << fstype.block_size_bits {
            return Err(MountError::BadGeometry {
                size: fstype.block_size,
                bits: fstype.block_size_bits,
            });
        }

        let mut registry = NodeRegistry::new();
        if let Some(limit) = options.node_limit {
            registry = registry.with_limit(limit);
        }
        let mut tree = NamespaceTree::new();
        let mut contents = ContentStore::new();

        let root = registry.allocate_root(FileMode::DIR_DEFAULT)?;
        if let Err(error) =
            builder::build_layout(&mut registry, &mut tree, &mut contents, root, &fstype.layout)
        {
            // The builder unwound its own work; release the root too.
            let _ = registry.release(root);
            return Err(error.into());
        }

        Ok(Self {
            id: NamespaceId::new(),
            fs_name: fstype.name.clone(),
            magic: fstype.magic,
            block_size: fstype.block_size,
            block_size_bits: fstype.block_size_bits,
            root,
            state: MountState::Mounted,
            registry,
            tree,
            contents,
        })
    }

    /// This instance's identity
    pub fn id(&self) -> NamespaceId {
        self.id
    }

    /// The filesystem type name this namespace was mounted as
    pub fn fs_name(&self) -> &str {
        &self.fs_name
    }

    /// The type's magic number
    pub fn magic(&self) -> u64 {
        self.magic
    }

    /// Block size in bytes
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// log2 of the block size
    pub fn block_size_bits(&self) -> u32 {
        self.block_size_bits
    }

    /// The root directory node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Current lifecycle state
    pub fn state(&self) -> MountState {
        self.state
    }

    /// Number of live node records
    pub fn node_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of live bindings
    pub fn binding_count(&self) -> usize {
        self.tree.len()
    }

    /// Resolves one name under a directory
    pub fn lookup(&self, dir: NodeId, name: &str) -> Result<NodeId, OperationError> {
        self.require_directory(dir, name)?;
        Ok(self.tree.lookup(dir, name)?)
    }

    /// Resolves a multi-segment path from the root
    pub fn resolve(&self, path: &str) -> Result<NodeId, OperationError> {
        Ok(self.tree.resolve(&self.registry, self.root, path)?)
    }

    /// Lists a directory's bindings, sorted by name
    pub fn list(&self, dir: NodeId) -> Result<Vec<Binding>, OperationError> {
        self.require_directory(dir, "/")?;
        Ok(self.tree.children(dir).into_iter().cloned().collect())
    }

    /// Creates a new child node and binds it under `dir`
    ///
    /// Regular files start with an empty content buffer. If binding fails
    /// after the node was allocated, the node is released before the error
    /// is returned.
    pub fn create_child(
        &mut self,
        dir: NodeId,
        name: &str,
        kind: NodeKind,
        mode: FileMode,
    ) -> Result<NodeId, OperationError> {
        let node = self.registry.allocate(kind, mode)?;
        if let Err(error) = self.tree.bind(&mut self.registry, dir, name, node) {
            let _ = self.registry.release(node);
            return Err(error.into());
        }
        if kind == NodeKind::RegularFile {
            if let Err(error) = self.contents.attach(node, Vec::new()) {
                let _ = self.tree.unbind(&mut self.registry, dir, name);
                let _ = self.registry.release(node);
                return Err(error.into());
            }
        }
        Ok(node)
    }

    /// Opens a regular file for reading
    pub fn open(&self, node: NodeId) -> Result<FileHandle, OperationError> {
        match self.registry.kind_of(node) {
            None => Err(OperationError::Tree(TreeError::MissingNode(node))),
            Some(NodeKind::Directory) => Err(OperationError::NotAFile(node)),
            Some(NodeKind::RegularFile) => Ok(self.contents.open(node)?),
        }
    }

    /// Reads up to `max_len` bytes at `offset`
    pub fn read(
        &self,
        handle: FileHandle,
        offset: u64,
        max_len: usize,
    ) -> Result<Vec<u8>, OperationError> {
        Ok(self.contents.read(handle, offset, max_len)?)
    }

    /// Attempts a write; always rejected as read-only on this filesystem
    pub fn write(
        &self,
        handle: FileHandle,
        bytes: &[u8],
        offset: u64,
    ) -> Result<usize, OperationError> {
        Ok(self.contents.write(handle, bytes, offset)?)
    }

    /// Reports a node's metadata
    pub fn stat(&self, node: NodeId) -> Result<NodeStat, OperationError> {
        let record = self
            .registry
            .get(node)
            .ok_or(OperationError::Tree(TreeError::MissingNode(node)))?;
        let (size, entry_count) = match record.kind {
            NodeKind::RegularFile => (self.contents.size_of(node), None),
            NodeKind::Directory => (None, Some(self.tree.children(node).len())),
        };
        Ok(NodeStat {
            id: record.id,
            kind: record.kind,
            mode: record.mode,
            links: record.links(),
            size,
            entry_count,
            created_at: record.created_at,
        })
    }

    /// Releases every node, binding, and buffer
    ///
    /// Idempotent: tearing down an already-unmounted namespace is a no-op.
    pub fn teardown(&mut self) {
        if self.state == MountState::Unmounted {
            return;
        }
        self.state = MountState::Unmounting;
        self.contents.clear();
        self.tree.clear();
        self.registry.clear();
        self.state = MountState::Unmounted;
    }

    fn require_directory(&self, dir: NodeId, context: &str) -> Result<(), OperationError> {
        match self.registry.kind_of(dir) {
            None => Err(OperationError::Tree(TreeError::MissingNode(dir))),
            Some(NodeKind::Directory) => Ok(()),
            Some(_) => Err(OperationError::Tree(TreeError::NotADirectory(
                context.to_string(),
            ))),
        }
    }
}
