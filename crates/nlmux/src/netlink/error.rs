//! Error types for netlink operations.

use std::io;

/// Result type for netlink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during netlink operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Kernel returned an error code.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel {
        /// The errno value from the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// Message was truncated.
    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Expected message length.
        expected: usize,
        /// Actual bytes received.
        actual: usize,
    },

    /// Invalid message format.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Invalid attribute format.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    /// Sequence number 0 is reserved for unsolicited messages.
    #[error("sequence number 0 cannot be assigned to a request")]
    InvalidSequence,

    /// The message type (family id) has not been resolved yet.
    #[error("message type is not set")]
    IllegalMessageType,

    /// A request is already pending under this sequence number.
    #[error("a handler already exists for sequence {seq}")]
    DuplicateSequence {
        /// The conflicting sequence number.
        seq: u32,
    },

    /// Family is not in the family table.
    #[error("family '{name}' doesn't exist")]
    UnknownFamily {
        /// The family name.
        name: String,
    },

    /// Multicast group is not part of the family.
    #[error("group '{group}' doesn't exist in family '{family}'")]
    UnknownGroup {
        /// The family name.
        family: String,
        /// The group name.
        group: String,
    },

    /// A family-specific send was attempted before resolving the family.
    #[error("family '{name}' has not been resolved")]
    FamilyNotResolved {
        /// The family name.
        name: String,
    },

    /// The broadcast handler is already registered.
    #[error("broadcast handler already registered")]
    DuplicateHandler,

    /// The broadcast handler is not registered.
    #[error("broadcast handler not found")]
    HandlerNotFound,
}

impl Error {
    /// Create a kernel error from an errno value.
    ///
    /// Netlink reports errors as negative errno values; the stored errno is
    /// positive.
    pub fn from_errno(errno: i32) -> Self {
        let message = io::Error::from_raw_os_error(-errno).to_string();
        Self::Kernel {
            errno: -errno,
            message,
        }
    }

    /// Check if this is a "not found" error (ENOENT, ENODEV, unknown family/group).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } => {
                matches!(*errno, libc::ENOENT | libc::ENODEV)
            }
            Self::UnknownFamily { .. } | Self::UnknownGroup { .. } => true,
            _ => false,
        }
    }

    /// Check if this is a permission error (EPERM, EACCES).
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } => matches!(*errno, libc::EPERM | libc::EACCES),
            Self::Io(e) => e.kind() == io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }

    /// Check if this is a "device busy" error (EBUSY).
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Kernel { errno, .. } if *errno == libc::EBUSY)
    }

    /// Get the errno value if this is a kernel error.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Kernel { errno, .. } => Some(*errno),
            _ => None,
        }
    }
}
