extern crate alloc;
use alloc::boxed::Box;

use log::{debug, error};
use trove_core::{ObjectInfo, StorageError, StorageResult, MAX_OBJECT_SIZE, READ_WINDOW};
use trove_hal::{BackingLog, LogError};
use zeroize::Zeroize;

use crate::ObjectStore;

/// Persistent backend: a thin translation layer over the keyed flash log.
///
/// Durability, wear-leveling and garbage collection are the log's problem;
/// this layer adds the caller-facing contract and offset-window reads.
///
/// Writes accept objects up to [`MAX_OBJECT_SIZE`], but every read is staged
/// through a [`READ_WINDOW`]-byte buffer, so a single get can only address
/// `offset + out.len() <= READ_WINDOW`. The asymmetry comes from the staging
/// buffer, not the log.
pub struct LogStore {
    log: Box<dyn BackingLog>,
}

impl LogStore {
    pub fn new(log: Box<dyn BackingLog>) -> Self {
        Self { log }
    }

    fn translate(err: LogError) -> StorageError {
        match err {
            LogError::NotFound => StorageError::DoesNotExist,
            _ => StorageError::IoError,
        }
    }
}

impl ObjectStore for LogStore {
    fn set(&mut self, uid: u64, data: &[u8]) -> StorageResult<()> {
        if data.len() > MAX_OBJECT_SIZE {
            error!(
                "set: {} bytes exceeds item cap {}",
                data.len(),
                MAX_OBJECT_SIZE
            );
            return Err(StorageError::InsufficientStorage);
        }

        let written = match self.log.write(uid, data) {
            Ok(n) => n,
            Err(e) => {
                error!("set: log write failed for uid {:#x}: {}", uid, e);
                return Err(Self::translate(e));
            }
        };
        if written < data.len() {
            error!("set: short write, {} of {} bytes", written, data.len());
            return Err(StorageError::IoError);
        }

        debug!("set: uid {:#x}, {} bytes", uid, data.len());
        Ok(())
    }

    fn get(&mut self, uid: u64, offset: usize, out: &mut [u8]) -> StorageResult<usize> {
        match offset.checked_add(out.len()) {
            Some(window) if window <= READ_WINDOW => {}
            _ => {
                error!(
                    "get: offset {} + length {} exceeds read window {}",
                    offset,
                    out.len(),
                    READ_WINDOW
                );
                return Err(StorageError::InvalidArgument);
            }
        }

        let mut stage = [0u8; READ_WINDOW];
        let got = match self.log.read(uid, &mut stage) {
            Ok(n) => n,
            Err(e) => {
                stage.zeroize();
                debug!("get: log read failed for uid {:#x}: {}", uid, e);
                return Err(Self::translate(e));
            }
        };
        if offset > got {
            stage.zeroize();
            error!("get: offset {} past stored size {}", offset, got);
            return Err(StorageError::InvalidArgument);
        }

        let n = core::cmp::min(out.len(), got - offset);
        out[..n].copy_from_slice(&stage[offset..offset + n]);
        stage.zeroize();
        debug!(
            "get: uid {:#x}, offset {}, requested {}, copied {}",
            uid,
            offset,
            out.len(),
            n
        );
        Ok(n)
    }

    fn get_info(&mut self, uid: u64) -> StorageResult<ObjectInfo> {
        match self.log.length(uid) {
            Ok(size) => Ok(ObjectInfo { size }),
            Err(e) => {
                debug!("get_info: length query failed for uid {:#x}: {}", uid, e);
                Err(Self::translate(e))
            }
        }
    }

    fn remove(&mut self, uid: u64) -> StorageResult<()> {
        // The raw log treats deleting an absent key as already done; the
        // store contract does not. Probe first.
        if let Err(e) = self.log.length(uid) {
            debug!("remove: uid {:#x} not present: {}", uid, e);
            return Err(Self::translate(e));
        }
        if let Err(e) = self.log.delete(uid) {
            error!("remove: log delete failed for uid {:#x}: {}", uid, e);
            return Err(StorageError::IoError);
        }
        // Verify erasure; a record that survives its delete is a log fault.
        match self.log.length(uid) {
            Err(LogError::NotFound) => {
                debug!("remove: uid {:#x} erased", uid);
                Ok(())
            }
            Ok(_) => {
                error!("remove: uid {:#x} still present after delete", uid);
                Err(StorageError::IoError)
            }
            Err(e) => {
                error!("remove: verify failed for uid {:#x}: {}", uid, e);
                Err(StorageError::IoError)
            }
        }
    }
}
