//! # Namespace Service
//!
//! This crate implements the superblock/mount layer of s2fs: registering
//! filesystem types, mounting namespaces, materializing the declarative
//! initial layout, and dispatching per-node operations.
//!
//! ## Philosophy
//!
//! - **No ambient globals**: the filesystem-type registry and the mount
//!   table are explicit objects the embedder owns, not process-wide state.
//! - **Atomic mount**: a namespace is either fully built or not mounted at
//!   all; any layout failure rolls back every node and binding created so
//!   far and the caller never sees a partially usable handle.
//! - **Closed dispatch**: per-node operations match on [`NodeKind`], a
//!   closed two-variant set, instead of open-ended operation tables.
//!
//! [`NodeKind`]: fs_types::NodeKind

pub mod builder;
pub mod events;
pub mod layout;
pub mod namespace;
pub mod operations;
pub mod service;

pub use builder::BuildError;
pub use events::{EventLog, LogLevel, MountEvent, MountEventKind};
pub use layout::{LayoutEntry, LayoutSpec, S2FS_CONTENT};
pub use namespace::{MountOptions, MountState, Namespace};
pub use operations::{NamespaceOperations, NodeStat, OperationError};
pub use service::{
    FilesystemType, FilesystemTypeRegistry, MountError, MountService, NamespaceHandle,
    TypeRegistryError, S2FS_BLOCK_SIZE, S2FS_BLOCK_SIZE_BITS, S2FS_MAGIC, S2FS_TYPE_NAME,
};
