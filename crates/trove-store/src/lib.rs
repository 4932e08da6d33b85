#![no_std]
#![forbid(unsafe_code)]
#[cfg(feature = "std")]
extern crate std;

pub mod log_store;
pub mod table;
#[cfg(feature = "std")]
pub mod fs_log;

use alloc::sync::Arc;
use spin::Mutex;
use trove_core::{ObjectInfo, StorageResult};

pub use crate::log_store::LogStore;
pub use crate::table::TableStore;
#[cfg(feature = "std")]
pub use crate::fs_log::FsLog;

extern crate alloc;

/// The four-operation store contract.
///
/// Both backends implement it; which one a caller gets is decided at
/// construction time, never by conditional compilation, so the two can
/// coexist in one binary.
///
/// A set that fails leaves the prior object (if any) fully intact. A get
/// whose window runs past the stored size copies what is there and reports
/// the copied count; `offset > stored_size` is `InvalidArgument`. Callers
/// wanting the true size ask `get_info`.
pub trait ObjectStore: Send + Sync {
    /// Create or fully replace the object under `uid`.
    fn set(&mut self, uid: u64, data: &[u8]) -> StorageResult<()>;

    /// Copy up to `out.len()` bytes starting at `offset` into `out`.
    /// Returns the number of bytes copied.
    fn get(&mut self, uid: u64, offset: usize, out: &mut [u8]) -> StorageResult<usize>;

    /// Metadata for the object under `uid`.
    fn get_info(&mut self, uid: u64) -> StorageResult<ObjectInfo>;

    /// Erase the object under `uid`. Absent uids are an error, not a no-op.
    fn remove(&mut self, uid: u64) -> StorageResult<()>;
}

/// Shared handle serializing every operation behind one lock.
///
/// The backends themselves do no internal locking; this is the explicit
/// mutual-exclusion layer for the case of multiple logical callers.
pub struct SharedStore<S: ObjectStore> {
    inner: Arc<Mutex<S>>,
}

impl<S: ObjectStore> SharedStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn set(&self, uid: u64, data: &[u8]) -> StorageResult<()> {
        self.inner.lock().set(uid, data)
    }

    pub fn get(&self, uid: u64, offset: usize, out: &mut [u8]) -> StorageResult<usize> {
        self.inner.lock().get(uid, offset, out)
    }

    pub fn get_info(&self, uid: u64) -> StorageResult<ObjectInfo> {
        self.inner.lock().get_info(uid)
    }

    pub fn remove(&self, uid: u64) -> StorageResult<()> {
        self.inner.lock().remove(uid)
    }
}

impl<S: ObjectStore> Clone for SharedStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
