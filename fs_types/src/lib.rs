//! # Filesystem Types
//!
//! This crate defines the fundamental types shared by the s2fs namespace
//! crates.
//!
//! ## Philosophy
//!
//! - **Identity over pointers**: components refer to nodes by typed
//!   identifiers, never by owning references into each other.
//! - **Closed kind set**: a node is a directory or a regular file; dispatch
//!   is over a tagged enum, not open-ended inheritance.
//! - **Testability first**: time comes from a [`Clock`] so tests are
//!   deterministic.
//!
//! ## Key Types
//!
//! - [`NodeId`], [`BindingId`], [`NamespaceId`]: typed identifiers
//! - [`NodeKind`]: directory vs regular file
//! - [`FileMode`]: 9-bit rwxrwxrwx permission mask
//! - [`Timestamp`] and [`Clock`]: creation-time instants

pub mod ids;
pub mod mode;
pub mod time;

pub use ids::{BindingId, NamespaceId, NodeId};
pub use mode::{FileMode, ModeError, NodeKind};
pub use time::{Clock, FixedClock, SystemClock, Timestamp};
