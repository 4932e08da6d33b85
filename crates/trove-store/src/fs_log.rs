#![cfg(feature = "std")]

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;
// Explicitly import Vec and format! to handle no_std crate context
use std::format;
use std::vec::Vec;

use trove_hal::{BackingLog, LogError, LogGeometry};

/// Host-side backing log: one record file per key under a root directory.
///
/// Stands in for the flash log on development machines; same contract,
/// including the mount-time failure behavior.
pub struct FsLog {
    root: PathBuf,
    geometry: LogGeometry,
}

impl FsLog {
    /// Bind to a log directory. Every failure here is construction-fatal,
    /// like a flash mount: nothing degrades into a per-operation error.
    pub fn mount(path: &str, geometry: LogGeometry) -> Result<Self, LogError> {
        if geometry.sector_size == 0 || geometry.sector_count == 0 {
            return Err(LogError::BadGeometry);
        }
        fs::create_dir_all(path).map_err(|_| LogError::NotReady)?;
        let root = PathBuf::from(path);

        // Readiness probe: the region must accept a synced write before we
        // claim it.
        let probe = root.join(".mount");
        File::create(&probe)
            .and_then(|f| f.sync_all())
            .map_err(|_| LogError::MountFailed)?;
        let _ = fs::remove_file(&probe);

        Ok(Self { root, geometry })
    }

    pub fn geometry(&self) -> LogGeometry {
        self.geometry
    }

    fn record_path(&self, key: u64) -> PathBuf {
        self.root.join(format!("obj_{:016x}.bin", key))
    }
}

impl BackingLog for FsLog {
    fn write(&mut self, key: u64, data: &[u8]) -> Result<usize, LogError> {
        let path = self.record_path(key);
        let tmp_path = path.with_extension("tmp");

        // 1. Write .tmp
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp_path)
                .map_err(|_| LogError::Io)?;

            file.write_all(data).map_err(|_| LogError::Io)?;

            // 2. FSYNC (Critical)
            file.sync_all().map_err(|_| LogError::Io)?;
        }

        // 3. Rename (Atomic)
        fs::rename(tmp_path, path).map_err(|_| LogError::Io)?;

        // 4. Sync Parent Dir
        if let Ok(f) = File::open(&self.root) {
            let _ = f.sync_all();
        }

        Ok(data.len())
    }

    fn read(&mut self, key: u64, buf: &mut [u8]) -> Result<usize, LogError> {
        let mut file = File::open(self.record_path(key)).map_err(|_| LogError::NotFound)?;
        let mut record = Vec::new();
        file.read_to_end(&mut record).map_err(|_| LogError::Io)?;

        let n = buf.len().min(record.len());
        buf[..n].copy_from_slice(&record[..n]);
        Ok(n)
    }

    fn delete(&mut self, key: u64) -> Result<(), LogError> {
        let path = self.record_path(key);
        if path.exists() {
            fs::remove_file(path).map_err(|_| LogError::Io)
        } else {
            Ok(())
        }
    }

    fn length(&mut self, key: u64) -> Result<usize, LogError> {
        let meta = fs::metadata(self.record_path(key)).map_err(|_| LogError::NotFound)?;
        Ok(meta.len() as usize)
    }
}
