//! Mount-time tree construction
//!
//! The builder walks a [`LayoutSpec`] and materializes nodes and bindings.
//! It runs exactly once per mount, before the namespace is exposed to any
//! consumer. Construction is atomic: the first failing entry aborts the
//! build and every node, binding, and buffer created so far is released in
//! reverse order.

use crate::layout::{LayoutEntry, LayoutSpec};
use file_content::{ContentError, ContentStore};
use fs_types::{NodeId, NodeKind};
use namespace_tree::{NamespaceTree, TreeError};
use node_registry::{NodeRegistry, RegistryError};
use thiserror::Error;

/// Errors raised while materializing a layout
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// The entry itself is malformed (bad path, directory with content)
    #[error("invalid layout entry {path:?}: {reason}")]
    InvalidEntry {
        /// The offending entry's path
        path: String,
        /// Why it was rejected
        reason: String,
    },

    /// Node allocation failed
    #[error("allocation failed: {0}")]
    Registry(#[from] RegistryError),

    /// Binding or parent resolution failed
    #[error("binding failed: {0}")]
    Tree(#[from] TreeError),

    /// Content attachment failed
    #[error("content attach failed: {0}")]
    Content(#[from] ContentError),
}

struct Created {
    parent: NodeId,
    name: String,
    node: NodeId,
    has_content: bool,
}

/// Materializes `layout` under `root`
///
/// On error, everything this call created has already been rolled back; the
/// caller still owns (and must release) the root it allocated beforehand.
pub fn build_layout(
    registry: &mut NodeRegistry,
    tree: &mut NamespaceTree,
    contents: &mut ContentStore,
    root: NodeId,
    layout: &LayoutSpec,
) -> Result<(), BuildError> {
    let mut created: Vec<Created> = Vec::new();

    for entry in &layout.entries {
        if let Err(error) = build_entry(registry, tree, contents, root, entry, &mut created) {
            rollback(registry, tree, contents, &created);
            return Err(error);
        }
    }
    Ok(())
}

fn build_entry(
    registry: &mut NodeRegistry,
    tree: &mut NamespaceTree,
    contents: &mut ContentStore,
    root: NodeId,
    entry: &LayoutEntry,
    created: &mut Vec<Created>,
) -> Result<(), BuildError> {
    if entry.kind == NodeKind::Directory && entry.content.is_some() {
        return Err(BuildError::InvalidEntry {
            path: entry.path.clone(),
            reason: "directories cannot carry content".to_string(),
        });
    }

    let segments = namespace_tree::path::split(&entry.path).map_err(TreeError::from)?;
    let (name, ancestors) = match segments.split_last() {
        Some(split) => split,
        None => {
            return Err(BuildError::InvalidEntry {
                path: entry.path.clone(),
                reason: "path has no final segment".to_string(),
            })
        }
    };

    // The parent must have been materialized by an earlier entry (or be the
    // root); a missing parent is a checked error, never a dangling bind.
    let mut parent = root;
    for segment in ancestors {
        parent = tree.lookup(parent, segment)?;
    }

    let node = registry.allocate(entry.kind, entry.mode)?;
    if let Err(error) = tree.bind(registry, parent, name, node) {
        // The binding never existed, so only the fresh node needs releasing.
        let _ = registry.release(node);
        return Err(error.into());
    }

    let mut has_content = false;
    if entry.kind == NodeKind::RegularFile {
        let bytes = entry.content.clone().unwrap_or_default();
        if let Err(error) = contents.attach(node, bytes) {
            let _ = tree.unbind(registry, parent, name);
            let _ = registry.release(node);
            return Err(error.into());
        }
        has_content = true;
    }

    created.push(Created {
        parent,
        name: name.to_string(),
        node,
        has_content,
    });
    Ok(())
}

fn rollback(
    registry: &mut NodeRegistry,
    tree: &mut NamespaceTree,
    contents: &mut ContentStore,
    created: &[Created],
) {
    for entry in created.iter().rev() {
        if entry.has_content {
            contents.detach(entry.node);
        }
        let _ = tree.unbind(registry, entry.parent, &entry.name);
        let _ = registry.release(entry.node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::S2FS_CONTENT;
    use fs_types::FileMode;

    fn fresh_parts() -> (NodeRegistry, NamespaceTree, ContentStore, NodeId) {
        let mut registry = NodeRegistry::new();
        let root = registry.allocate_root(FileMode::DIR_DEFAULT).unwrap();
        (registry, NamespaceTree::new(), ContentStore::new(), root)
    }

    #[test]
    fn test_builds_the_s2fs_layout() {
        let (mut registry, mut tree, mut contents, root) = fresh_parts();
        build_layout(
            &mut registry,
            &mut tree,
            &mut contents,
            root,
            &LayoutSpec::s2fs(),
        )
        .unwrap();

        let foo = tree.lookup(root, "foo").unwrap();
        let bar = tree.lookup(foo, "bar").unwrap();
        assert_eq!(registry.kind_of(foo), Some(NodeKind::Directory));
        assert_eq!(registry.kind_of(bar), Some(NodeKind::RegularFile));

        let handle = contents.open(bar).unwrap();
        assert_eq!(contents.read(handle, 0, 64).unwrap(), S2FS_CONTENT);
    }

    #[test]
    fn test_first_entry_failure_leaves_only_the_root() {
        // Limit 1: the root consumed the only slot, so creating "foo" fails.
        let mut registry = NodeRegistry::new().with_limit(1);
        let root = registry.allocate_root(FileMode::DIR_DEFAULT).unwrap();
        let mut tree = NamespaceTree::new();
        let mut contents = ContentStore::new();

        let result = build_layout(&mut registry, &mut tree, &mut contents, root, &LayoutSpec::s2fs());
        assert_eq!(
            result,
            Err(BuildError::Registry(RegistryError::OutOfResources {
                limit: 1
            }))
        );
        assert_eq!(registry.len(), 1);
        assert!(tree.is_empty());
        assert!(contents.is_empty());
    }

    #[test]
    fn test_midway_failure_rolls_back_earlier_entries() {
        // Limit 2: root + "foo" fit, the "bar" allocation fails, and the
        // already-built "foo" must be unwound.
        let mut registry = NodeRegistry::new().with_limit(2);
        let root = registry.allocate_root(FileMode::DIR_DEFAULT).unwrap();
        let mut tree = NamespaceTree::new();
        let mut contents = ContentStore::new();

        let result = build_layout(&mut registry, &mut tree, &mut contents, root, &LayoutSpec::s2fs());
        assert!(matches!(result, Err(BuildError::Registry(_))));
        assert_eq!(registry.len(), 1);
        assert!(tree.is_empty());
        assert!(contents.is_empty());
    }

    #[test]
    fn test_entry_under_missing_parent_is_checked() {
        let (mut registry, mut tree, mut contents, root) = fresh_parts();
        let layout = LayoutSpec {
            entries: vec![LayoutEntry::file(
                "ghost/bar",
                FileMode::FILE_DEFAULT,
                b"x".to_vec(),
            )],
        };

        let result = build_layout(&mut registry, &mut tree, &mut contents, root, &layout);
        assert_eq!(
            result,
            Err(BuildError::Tree(TreeError::NotFound("ghost".to_string())))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_directory_with_content_is_rejected() {
        let (mut registry, mut tree, mut contents, root) = fresh_parts();
        let layout = LayoutSpec {
            entries: vec![LayoutEntry {
                path: "foo".to_string(),
                kind: NodeKind::Directory,
                mode: FileMode::DIR_DEFAULT,
                content: Some(b"nope".to_vec()),
            }],
        };

        let result = build_layout(&mut registry, &mut tree, &mut contents, root, &layout);
        assert!(matches!(result, Err(BuildError::InvalidEntry { .. })));
    }

    #[test]
    fn test_duplicate_entry_aborts_and_unwinds() {
        let (mut registry, mut tree, mut contents, root) = fresh_parts();
        let layout = LayoutSpec {
            entries: vec![
                LayoutEntry::directory("foo", FileMode::DIR_DEFAULT),
                LayoutEntry::directory("foo", FileMode::DIR_DEFAULT),
            ],
        };

        let result = build_layout(&mut registry, &mut tree, &mut contents, root, &layout);
        assert_eq!(
            result,
            Err(BuildError::Tree(TreeError::NameConflict("foo".to_string())))
        );
        assert_eq!(registry.len(), 1);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_file_without_content_gets_empty_buffer() {
        let (mut registry, mut tree, mut contents, root) = fresh_parts();
        let layout = LayoutSpec {
            entries: vec![LayoutEntry {
                path: "empty".to_string(),
                kind: NodeKind::RegularFile,
                mode: FileMode::FILE_DEFAULT,
                content: None,
            }],
        };
        build_layout(&mut registry, &mut tree, &mut contents, root, &layout).unwrap();

        let node = tree.lookup(root, "empty").unwrap();
        let handle = contents.open(node).unwrap();
        assert_eq!(contents.read(handle, 0, 16).unwrap(), Vec::<u8>::new());
    }
}
