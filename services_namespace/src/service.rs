//! Filesystem-type registration and the mount service
//!
//! The registry and mount table are explicit objects handed to the
//! embedder, created at process start and dropped at process end; nothing
//! here is global state.

use crate::builder::BuildError;
use crate::events::{EventLog, LogLevel, MountEvent, MountEventKind};
use crate::layout::LayoutSpec;
use crate::namespace::{MountOptions, Namespace};
use crate::operations::{NamespaceOperations, NodeStat, OperationError};
use file_content::FileHandle;
use fs_types::{FileMode, NamespaceId, NodeId, NodeKind};
use namespace_tree::Binding;
use node_registry::RegistryError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// The s2fs type name reported at the registration boundary
pub const S2FS_TYPE_NAME: &str = "s2fs";

/// The s2fs magic number distinguishing it from other filesystem types
pub const S2FS_MAGIC: u64 = 0xFFF34;

/// Block size of an s2fs namespace, in bytes
pub const S2FS_BLOCK_SIZE: u32 = 4096;

/// log2 of [`S2FS_BLOCK_SIZE`]
pub const S2FS_BLOCK_SIZE_BITS: u32 = 12;

/// Errors raised by filesystem-type registration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeRegistryError {
    /// A type with this name is already registered
    #[error("filesystem type already registered: {0}")]
    AlreadyRegistered(String),

    /// No type with this name is registered
    #[error("filesystem type not registered: {0}")]
    NotRegistered(String),
}

/// Errors raised by mount and unmount
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MountError {
    /// The requested type name is not in the registry
    #[error("unknown filesystem type: {0}")]
    UnknownType(String),

    /// The descriptor's block size is not `1 << block_size_bits`
    #[error("bad block geometry: size {size} is not 1 << {bits}")]
    BadGeometry {
        /// Declared block size
        size: u32,
        /// Declared log2 block size
        bits: u32,
    },

    /// Root allocation failed
    #[error("allocation failed: {0}")]
    Allocation(#[from] RegistryError),

    /// Layout construction failed (and was rolled back)
    #[error("layout construction failed: {0}")]
    Build(#[from] BuildError),

    /// The handle does not refer to a mounted namespace
    #[error("namespace is not mounted: {0}")]
    NotMounted(NamespaceId),
}

/// Descriptor for one filesystem type
///
/// Plain data: name, magic, block geometry, and the declarative initial
/// layout every mount of this type materializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesystemType {
    /// Type name used at the mount boundary
    pub name: String,
    /// Numeric signature identifying the type
    pub magic: u64,
    /// Block size in bytes
    pub block_size: u32,
    /// log2 of the block size
    pub block_size_bits: u32,
    /// Initial tree recreated identically on every mount
    pub layout: LayoutSpec,
}

impl FilesystemType {
    /// The s2fs descriptor: magic `0xFFF34`, 4096-byte blocks, and the
    /// fixed `/foo/bar` layout
    pub fn s2fs() -> Self {
        Self {
            name: S2FS_TYPE_NAME.to_string(),
            magic: S2FS_MAGIC,
            block_size: S2FS_BLOCK_SIZE,
            block_size_bits: S2FS_BLOCK_SIZE_BITS,
            layout: LayoutSpec::s2fs(),
        }
    }
}

/// Registry of mountable filesystem types
#[derive(Debug, Default)]
pub struct FilesystemTypeRegistry {
    types: HashMap<String, FilesystemType>,
}

impl FilesystemTypeRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Registers a type by its descriptor name
    pub fn register(&mut self, fstype: FilesystemType) -> Result<(), TypeRegistryError> {
        if self.types.contains_key(&fstype.name) {
            return Err(TypeRegistryError::AlreadyRegistered(fstype.name));
        }
        self.types.insert(fstype.name.clone(), fstype);
        Ok(())
    }

    /// Unregisters a type, returning its descriptor
    pub fn unregister(&mut self, name: &str) -> Result<FilesystemType, TypeRegistryError> {
        self.types
            .remove(name)
            .ok_or_else(|| TypeRegistryError::NotRegistered(name.to_string()))
    }

    /// Looks up a registered type
    pub fn get(&self, name: &str) -> Option<&FilesystemType> {
        self.types.get(name)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Opaque handle to one mounted namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespaceHandle {
    id: NamespaceId,
}

impl NamespaceHandle {
    /// The namespace identity behind the handle
    pub fn id(&self) -> NamespaceId {
        self.id
    }
}

/// Owns the type registry and every mounted namespace
///
/// Mutation within one namespace is serialized by a `Mutex` per instance;
/// registration, mount, and unmount mutate the service itself and take
/// `&mut self`.
pub struct MountService {
    types: FilesystemTypeRegistry,
    mounted: HashMap<NamespaceId, Mutex<Namespace>>,
    events: EventLog,
}

impl MountService {
    /// Creates a service with no registered types and nothing mounted
    pub fn new() -> Self {
        Self {
            types: FilesystemTypeRegistry::new(),
            mounted: HashMap::new(),
            events: EventLog::new(),
        }
    }

    /// Registers a filesystem type
    pub fn register_type(&mut self, fstype: FilesystemType) -> Result<(), TypeRegistryError> {
        let name = fstype.name.clone();
        self.types.register(fstype)?;
        self.events.record(MountEvent::new(
            LogLevel::Info,
            MountEventKind::TypeRegistered,
            name,
        ));
        Ok(())
    }

    /// Unregisters a filesystem type
    pub fn unregister_type(&mut self, name: &str) -> Result<(), TypeRegistryError> {
        self.types.unregister(name)?;
        self.events.record(MountEvent::new(
            LogLevel::Info,
            MountEventKind::TypeUnregistered,
            name,
        ));
        Ok(())
    }

    /// Mounts a namespace of a registered type
    ///
    /// A failed mount records a [`MountEventKind::MountFailed`] event and
    /// returns the error; no handle and no partial namespace survive.
    pub fn mount(
        &mut self,
        type_name: &str,
        options: &MountOptions,
    ) -> Result<NamespaceHandle, MountError> {
        let fstype = match self.types.get(type_name) {
            Some(fstype) => fstype,
            None => {
                let error = MountError::UnknownType(type_name.to_string());
                self.events.record(MountEvent::new(
                    LogLevel::Error,
                    MountEventKind::MountFailed,
                    error.to_string(),
                ));
                return Err(error);
            }
        };

        match Namespace::mount(fstype, options) {
            Ok(namespace) => {
                let id = namespace.id();
                self.mounted.insert(id, Mutex::new(namespace));
                self.events.record(
                    MountEvent::new(LogLevel::Info, MountEventKind::Mounted, type_name)
                        .with_namespace(id),
                );
                Ok(NamespaceHandle { id })
            }
            Err(error) => {
                self.events.record(MountEvent::new(
                    LogLevel::Error,
                    MountEventKind::MountFailed,
                    error.to_string(),
                ));
                Err(error)
            }
        }
    }

    /// Unmounts a namespace, releasing everything it owned
    pub fn unmount(&mut self, handle: NamespaceHandle) -> Result<(), MountError> {
        let cell = self
            .mounted
            .remove(&handle.id)
            .ok_or(MountError::NotMounted(handle.id))?;
        let mut namespace = match cell.into_inner() {
            Ok(namespace) => namespace,
            Err(poisoned) => poisoned.into_inner(),
        };
        namespace.teardown();
        self.events.record(
            MountEvent::new(LogLevel::Info, MountEventKind::Unmounted, namespace.fs_name())
                .with_namespace(handle.id),
        );
        Ok(())
    }

    /// Number of live namespaces
    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }

    /// The structured event log
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Runs a closure against one mounted namespace
    pub fn with_namespace<R>(
        &self,
        handle: NamespaceHandle,
        f: impl FnOnce(&Namespace) -> R,
    ) -> Result<R, OperationError> {
        Ok(f(&*self.namespace(handle)?))
    }

    fn namespace(&self, handle: NamespaceHandle) -> Result<MutexGuard<'_, Namespace>, OperationError> {
        let cell = self
            .mounted
            .get(&handle.id)
            .ok_or(OperationError::NotMounted(handle.id))?;
        Ok(match cell.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        })
    }
}

impl Default for MountService {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceOperations for MountService {
    fn lookup(
        &self,
        ns: NamespaceHandle,
        dir: NodeId,
        name: &str,
    ) -> Result<NodeId, OperationError> {
        self.namespace(ns)?.lookup(dir, name)
    }

    fn resolve(&self, ns: NamespaceHandle, path: &str) -> Result<NodeId, OperationError> {
        self.namespace(ns)?.resolve(path)
    }

    fn list(&self, ns: NamespaceHandle, dir: NodeId) -> Result<Vec<Binding>, OperationError> {
        self.namespace(ns)?.list(dir)
    }

    fn create_child(
        &self,
        ns: NamespaceHandle,
        dir: NodeId,
        name: &str,
        kind: NodeKind,
        mode: FileMode,
    ) -> Result<NodeId, OperationError> {
        self.namespace(ns)?.create_child(dir, name, kind, mode)
    }

    fn open(&self, ns: NamespaceHandle, node: NodeId) -> Result<FileHandle, OperationError> {
        self.namespace(ns)?.open(node)
    }

    fn read(
        &self,
        ns: NamespaceHandle,
        handle: FileHandle,
        offset: u64,
        max_len: usize,
    ) -> Result<Vec<u8>, OperationError> {
        self.namespace(ns)?.read(handle, offset, max_len)
    }

    fn write(
        &self,
        ns: NamespaceHandle,
        handle: FileHandle,
        bytes: &[u8],
        offset: u64,
    ) -> Result<usize, OperationError> {
        self.namespace(ns)?.write(handle, bytes, offset)
    }

    fn stat(&self, ns: NamespaceHandle, node: NodeId) -> Result<NodeStat, OperationError> {
        self.namespace(ns)?.stat(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_duplicate() {
        let mut registry = FilesystemTypeRegistry::new();
        registry.register(FilesystemType::s2fs()).unwrap();
        let result = registry.register(FilesystemType::s2fs());
        assert_eq!(
            result,
            Err(TypeRegistryError::AlreadyRegistered("s2fs".to_string()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_unknown() {
        let mut registry = FilesystemTypeRegistry::new();
        let result = registry.unregister("nope");
        assert_eq!(
            result,
            Err(TypeRegistryError::NotRegistered("nope".to_string()))
        );
    }

    #[test]
    fn test_descriptor_constants() {
        let fstype = FilesystemType::s2fs();
        assert_eq!(fstype.name, "s2fs");
        assert_eq!(fstype.magic, 0xFFF34);
        assert_eq!(fstype.block_size, 1 << fstype.block_size_bits);
    }

    #[test]
    fn test_mount_unknown_type() {
        let mut service = MountService::new();
        let result = service.mount("s2fs", &MountOptions::default());
        assert_eq!(result, Err(MountError::UnknownType("s2fs".to_string())));
        assert_eq!(service.events().count_of(MountEventKind::MountFailed), 1);
    }

    #[test]
    fn test_mount_and_unmount_lifecycle_events() {
        let mut service = MountService::new();
        service.register_type(FilesystemType::s2fs()).unwrap();
        let handle = service.mount("s2fs", &MountOptions::default()).unwrap();
        assert_eq!(service.mounted_count(), 1);

        service.unmount(handle).unwrap();
        assert_eq!(service.mounted_count(), 0);

        let kinds: Vec<MountEventKind> =
            service.events().entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MountEventKind::TypeRegistered,
                MountEventKind::Mounted,
                MountEventKind::Unmounted,
            ]
        );
    }

    #[test]
    fn test_unmount_twice_is_not_mounted() {
        let mut service = MountService::new();
        service.register_type(FilesystemType::s2fs()).unwrap();
        let handle = service.mount("s2fs", &MountOptions::default()).unwrap();
        service.unmount(handle).unwrap();
        assert_eq!(
            service.unmount(handle),
            Err(MountError::NotMounted(handle.id()))
        );
    }

    #[test]
    fn test_descriptor_roundtrips_through_json() {
        let fstype = FilesystemType::s2fs();
        let json = serde_json::to_string(&fstype).unwrap();
        let back: FilesystemType = serde_json::from_str(&json).unwrap();
        assert_eq!(fstype, back);
    }
}
