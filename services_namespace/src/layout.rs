//! Declarative initial layouts
//!
//! A mount does not discover its tree from a disk; it materializes one from
//! a [`LayoutSpec`], an ordered list of entries. The spec is plain data
//! (serde-serializable), so a layout can live in configuration as easily as
//! in code. Parents must appear before their children.

use fs_types::{FileMode, NodeKind};
use serde::{Deserialize, Serialize};

/// The fixed content of `/foo/bar` (12 bytes, no trailing newline)
pub const S2FS_CONTENT: &[u8] = b"Hello World!";

/// One entry of an initial layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    /// Path relative to the namespace root, e.g. `foo/bar`
    pub path: String,
    /// Directory or regular file
    pub kind: NodeKind,
    /// Permission bits recorded on the node
    pub mode: FileMode,
    /// Byte content for regular files; must be absent for directories
    #[serde(default)]
    pub content: Option<Vec<u8>>,
}

impl LayoutEntry {
    /// A directory entry
    pub fn directory(path: impl Into<String>, mode: FileMode) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::Directory,
            mode,
            content: None,
        }
    }

    /// A regular-file entry with fixed content
    pub fn file(path: impl Into<String>, mode: FileMode, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::RegularFile,
            mode,
            content: Some(content.into()),
        }
    }
}

/// An ordered initial tree description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSpec {
    /// Entries, materialized in order at mount time
    pub entries: Vec<LayoutEntry>,
}

impl LayoutSpec {
    /// A layout with no entries (the mount ends up with a bare root)
    pub fn empty() -> Self {
        Self::default()
    }

    /// The fixed s2fs layout: `/foo` (rwxr-xr-x) and `/foo/bar`
    /// (rw-r--r--, `"Hello World!"`)
    pub fn s2fs() -> Self {
        Self {
            entries: vec![
                LayoutEntry::directory("foo", FileMode::DIR_DEFAULT),
                LayoutEntry::file("foo/bar", FileMode::FILE_DEFAULT, S2FS_CONTENT),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s2fs_layout_shape() {
        let layout = LayoutSpec::s2fs();
        assert_eq!(layout.entries.len(), 2);

        let foo = &layout.entries[0];
        assert_eq!(foo.path, "foo");
        assert_eq!(foo.kind, NodeKind::Directory);
        assert_eq!(foo.mode.bits(), 0o755);
        assert!(foo.content.is_none());

        let bar = &layout.entries[1];
        assert_eq!(bar.path, "foo/bar");
        assert_eq!(bar.kind, NodeKind::RegularFile);
        assert_eq!(bar.mode.bits(), 0o644);
        assert_eq!(bar.content.as_deref(), Some(S2FS_CONTENT));
    }

    #[test]
    fn test_content_length_is_twelve_bytes() {
        assert_eq!(S2FS_CONTENT.len(), 12);
        assert_eq!(S2FS_CONTENT.last(), Some(&b'!'));
    }

    #[test]
    fn test_layout_roundtrips_through_json() {
        let layout = LayoutSpec::s2fs();
        let json = serde_json::to_string(&layout).unwrap();
        let back: LayoutSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(layout, back);
    }
}
