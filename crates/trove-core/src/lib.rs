#![no_std]
#[cfg(feature = "std")]
extern crate std;

/// Slot count of the volatile table backend.
pub const MAX_ENTRIES: usize = 8;

/// Hard per-object byte cap, enforced by both backends.
pub const MAX_OBJECT_SIZE: usize = 1024;

/// Staging-buffer size of the flash-log backend. Any single read window
/// (offset + requested length) must fit inside it.
pub const READ_WINDOW: usize = 128;

/// Sectors claimed from the flash region when the log is mounted.
pub const LOG_SECTOR_COUNT: usize = 4;

pub type StorageResult<T> = Result<T, StorageError>;

/// Caller-facing outcome taxonomy, shared by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Malformed caller input: out-of-range offset or read window.
    InvalidArgument,
    /// Unknown uid on get / get_info / remove.
    DoesNotExist,
    /// Capacity exceeded: byte cap or slot count.
    InsufficientStorage,
    /// The backing log failed, or left state it should not have.
    IoError,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}

/// Metadata for one stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Exact stored payload length in bytes.
    pub size: usize,
}
