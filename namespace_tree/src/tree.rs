//! The binding tree: parent→child name edges

use crate::path::{self, PathError};
use fs_types::{BindingId, NodeId, NodeKind};
use node_registry::NodeRegistry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Errors raised by binding and lookup operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// Path or name syntax error
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// No binding with this name under the parent
    #[error("not found: {0}")]
    NotFound(String),

    /// The parent already has a sibling with this name
    #[error("name conflict: {0}")]
    NameConflict(String),

    /// The node being traversed or bound under is not a directory
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// The referenced node has no record in the registry
    #[error("missing node: {0}")]
    MissingNode(NodeId),
}

/// One name edge from a directory to a child node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Identity of this edge
    pub id: BindingId,
    /// The directory that owns the name
    pub parent: NodeId,
    /// The name, unique among the parent's bindings
    pub name: String,
    /// The node the name resolves to
    pub child: NodeId,
}

/// Owns every name edge of one namespace
///
/// Sibling names are kept sorted so directory listings are deterministic.
pub struct NamespaceTree {
    children: HashMap<NodeId, BTreeMap<String, Binding>>,
    next_binding: u64,
}

impl NamespaceTree {
    /// Creates an empty tree
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            next_binding: 1,
        }
    }

    /// Binds `name` under `parent` to `child`
    ///
    /// The parent must be an existing directory, the name must be valid and
    /// free among the parent's bindings, and the child must exist. On
    /// success the child's link count is incremented.
    pub fn bind(
        &mut self,
        registry: &mut NodeRegistry,
        parent: NodeId,
        name: &str,
        child: NodeId,
    ) -> Result<BindingId, TreeError> {
        path::validate_name(name)?;

        match registry.kind_of(parent) {
            None => return Err(TreeError::MissingNode(parent)),
            Some(NodeKind::Directory) => {}
            Some(_) => return Err(TreeError::NotADirectory(name.to_string())),
        }
        if !registry.contains(child) {
            return Err(TreeError::MissingNode(child));
        }

        let siblings = self.children.entry(parent).or_default();
        if siblings.contains_key(name) {
            return Err(TreeError::NameConflict(name.to_string()));
        }

        let id = BindingId::from_raw(self.next_binding);
        self.next_binding += 1;
        siblings.insert(
            name.to_string(),
            Binding {
                id,
                parent,
                name: name.to_string(),
                child,
            },
        );
        registry
            .increment_links(child)
            .map_err(|_| TreeError::MissingNode(child))?;
        Ok(id)
    }

    /// Removes the binding `name` under `parent`, returning it
    ///
    /// Decrements the child's link count. Used by mount rollback and
    /// teardown; this system exposes no user-facing delete.
    pub fn unbind(
        &mut self,
        registry: &mut NodeRegistry,
        parent: NodeId,
        name: &str,
    ) -> Result<Binding, TreeError> {
        let siblings = self
            .children
            .get_mut(&parent)
            .ok_or_else(|| TreeError::NotFound(name.to_string()))?;
        let binding = siblings
            .remove(name)
            .ok_or_else(|| TreeError::NotFound(name.to_string()))?;
        if siblings.is_empty() {
            self.children.remove(&parent);
        }
        // The child record may already be gone during teardown.
        let _ = registry.decrement_links(binding.child);
        Ok(binding)
    }

    /// Resolves one name under a parent directory
    pub fn lookup(&self, parent: NodeId, name: &str) -> Result<NodeId, TreeError> {
        self.children
            .get(&parent)
            .and_then(|siblings| siblings.get(name))
            .map(|binding| binding.child)
            .ok_or_else(|| TreeError::NotFound(name.to_string()))
    }

    /// Resolves a multi-segment path from `root`
    ///
    /// `foo/bar` decomposes into `lookup(root, "foo")` then
    /// `lookup(foo, "bar")`; every intermediate segment must be a directory.
    /// An empty or all-slash path resolves to the root itself.
    pub fn resolve(
        &self,
        registry: &NodeRegistry,
        root: NodeId,
        path_str: &str,
    ) -> Result<NodeId, TreeError> {
        if path_str.trim_matches('/').is_empty() {
            return Ok(root);
        }
        let segments = path::split(path_str)?;

        let mut current = root;
        let mut last = "/";
        for segment in segments {
            match registry.kind_of(current) {
                None => return Err(TreeError::MissingNode(current)),
                Some(NodeKind::Directory) => {}
                Some(_) => return Err(TreeError::NotADirectory(last.to_string())),
            }
            current = self.lookup(current, segment)?;
            last = segment;
        }
        Ok(current)
    }

    /// Returns true if `parent` has a binding named `name`
    pub fn contains(&self, parent: NodeId, name: &str) -> bool {
        self.children
            .get(&parent)
            .is_some_and(|siblings| siblings.contains_key(name))
    }

    /// Lists the bindings under a directory, sorted by name
    pub fn children(&self, parent: NodeId) -> Vec<&Binding> {
        self.children
            .get(&parent)
            .map(|siblings| siblings.values().collect())
            .unwrap_or_default()
    }

    /// Total number of bindings in the tree
    pub fn len(&self) -> usize {
        self.children.values().map(BTreeMap::len).sum()
    }

    /// Returns true if the tree holds no bindings
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Drops every binding (namespace teardown)
    pub fn clear(&mut self) {
        self.children.clear();
    }
}

impl Default for NamespaceTree {
    fn default() -> Self {
        Self::new()
    }
}
