#![no_std]
#![forbid(unsafe_code)]

use trove_core::LOG_SECTOR_COUNT;

/// Failure vocabulary of the backing log itself.
///
/// The first three variants only occur while binding to the flash region
/// and are construction-fatal; a store never surfaces them per-operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogError {
    /// The device behind the log did not report ready.
    NotReady,
    /// Page-geometry query failed or returned a degenerate layout.
    BadGeometry,
    /// The log refused to mount on an otherwise healthy device.
    MountFailed,
    /// No record under the requested key.
    NotFound,
    /// Physical read/write/erase failure.
    Io,
}

impl core::fmt::Display for LogError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Page geometry of the mounted flash region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogGeometry {
    pub sector_size: usize,
    pub sector_count: usize,
}

impl LogGeometry {
    /// Geometry with the fixed sector count every log binding claims.
    /// Sector size comes from the device's page-info query.
    pub fn fixed(sector_size: usize) -> Self {
        Self {
            sector_size,
            sector_count: LOG_SECTOR_COUNT,
        }
    }

    pub fn capacity(&self) -> usize {
        self.sector_size * self.sector_count
    }
}

/// The black-box keyed flash log underneath the persistent backend.
/// Wear-leveling and garbage collection live entirely behind this seam.
///
/// INVARIANT: every call blocks for the full flash cycle. Nothing here
/// suspends, retries, or times out; a stuck device is the caller's problem.
pub trait BackingLog: Send + Sync {
    /// Replace the record under `key`. Returns bytes written; fewer than
    /// `data.len()` is a short write the caller must treat as a failure.
    fn write(&mut self, key: u64, data: &[u8]) -> Result<usize, LogError>;

    /// Copy up to `buf.len()` bytes of the record under `key`, from the
    /// record's start. Returns bytes copied.
    fn read(&mut self, key: u64, buf: &mut [u8]) -> Result<usize, LogError>;

    /// Drop the record under `key`. Absent keys are NOT an error at this
    /// layer; the log is free to treat the delete as already done.
    fn delete(&mut self, key: u64) -> Result<(), LogError>;

    /// Stored length of the record under `key`.
    fn length(&mut self, key: u64) -> Result<usize, LogError>;
}
