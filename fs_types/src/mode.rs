//! Node kinds and permission modes

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error raised for permission masks that do not fit the mode bit width
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModeError {
    /// Mode has bits set above the 9 permission bits
    #[error("mode {0:#o} does not fit in 9 permission bits")]
    OutOfRange(u32),
}

/// The kind of a filesystem node
///
/// The set is closed by design: operation dispatch matches on the kind
/// rather than going through open-ended virtual tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A directory: holds name bindings to child nodes
    Directory,
    /// A regular file: holds a byte buffer reachable through open/read
    RegularFile,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Directory => write!(f, "Directory"),
            NodeKind::RegularFile => write!(f, "RegularFile"),
        }
    }
}

/// A 9-bit owner/group/other rwx permission mask
///
/// Recorded at node creation and immutable afterwards; this system has no
/// chmod and performs no enforcement beyond storing the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileMode(u16);

impl FileMode {
    /// Conventional directory mode (rwxr-xr-x)
    pub const DIR_DEFAULT: FileMode = FileMode(0o755);

    /// Conventional regular-file mode (rw-r--r--)
    pub const FILE_DEFAULT: FileMode = FileMode(0o644);

    /// Creates a mode from raw permission bits
    pub fn new(bits: u16) -> Result<Self, ModeError> {
        if bits > 0o777 {
            return Err(ModeError::OutOfRange(bits as u32));
        }
        Ok(Self(bits))
    }

    /// Returns the raw permission bits
    pub fn bits(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03o}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_accepts_permission_bits() {
        let mode = FileMode::new(0o644).unwrap();
        assert_eq!(mode.bits(), 0o644);
        assert_eq!(format!("{}", mode), "644");
    }

    #[test]
    fn test_mode_rejects_high_bits() {
        let result = FileMode::new(0o1777);
        assert_eq!(result, Err(ModeError::OutOfRange(0o1777)));
    }

    #[test]
    fn test_default_modes() {
        assert_eq!(FileMode::DIR_DEFAULT.bits(), 0o755);
        assert_eq!(FileMode::FILE_DEFAULT.bits(), 0o644);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(format!("{}", NodeKind::Directory), "Directory");
        assert_eq!(format!("{}", NodeKind::RegularFile), "RegularFile");
    }
}
