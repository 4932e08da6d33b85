extern crate alloc;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use log::{debug, error};
use trove_core::{ObjectInfo, StorageError, StorageResult, MAX_ENTRIES, MAX_OBJECT_SIZE};
use zeroize::Zeroize;

use crate::ObjectStore;

/// Fill pattern for never-used slot buffers. Debug aid only; nothing reads it.
const INIT_FILL: u8 = 0xFF;

#[derive(Zeroize)]
struct Slot {
    used: bool,
    uid: u64,
    size: usize,
    data: [u8; MAX_OBJECT_SIZE],
}

impl Slot {
    fn blank() -> Self {
        Self {
            used: false,
            uid: 0,
            size: 0,
            data: [INIT_FILL; MAX_OBJECT_SIZE],
        }
    }
}

/// Volatile backend: a fixed arena of [`MAX_ENTRIES`] slots.
///
/// Contents do not survive the store; there is no eviction. A set for a new
/// uid on a full table fails rather than displace anything. Free-slot
/// allocation is first-fit at the lowest index, and the uid index is kept
/// beside the arena instead of being rediscovered by scan on every call.
pub struct TableStore {
    slots: Vec<Slot>,
    index: BTreeMap<u64, usize>,
}

impl TableStore {
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(MAX_ENTRIES);
        for _ in 0..MAX_ENTRIES {
            slots.push(Slot::blank());
        }
        Self {
            slots,
            index: BTreeMap::new(),
        }
    }

    /// Slot index currently holding `uid`. Diagnostic accessor; placement
    /// is observable so first-fit reuse stays testable.
    pub fn slot_of(&self, uid: u64) -> Option<usize> {
        self.index.get(&uid).copied()
    }
}

impl Default for TableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for TableStore {
    fn set(&mut self, uid: u64, data: &[u8]) -> StorageResult<()> {
        if data.len() > MAX_OBJECT_SIZE {
            error!(
                "set: {} bytes exceeds item cap {}",
                data.len(),
                MAX_OBJECT_SIZE
            );
            return Err(StorageError::InsufficientStorage);
        }

        let idx = match self.index.get(&uid) {
            Some(&i) => i,
            None => match self.slots.iter().position(|s| !s.used) {
                Some(free) => {
                    self.index.insert(uid, free);
                    free
                }
                None => {
                    error!("set: no free slots for uid {:#x}", uid);
                    return Err(StorageError::InsufficientStorage);
                }
            },
        };

        let slot = &mut self.slots[idx];
        slot.used = true;
        slot.uid = uid;
        slot.size = data.len();
        slot.data[..data.len()].copy_from_slice(data);
        // Stale bytes of a previous, larger object must never leak through
        // a later get.
        slot.data[data.len()..].fill(0);

        debug!("set: uid {:#x}, {} bytes at slot {}", uid, data.len(), idx);
        Ok(())
    }

    fn get(&mut self, uid: u64, offset: usize, out: &mut [u8]) -> StorageResult<usize> {
        let idx = match self.index.get(&uid) {
            Some(&i) => i,
            None => {
                debug!("get: uid {:#x} not found", uid);
                return Err(StorageError::DoesNotExist);
            }
        };
        let slot = &self.slots[idx];
        if offset > slot.size {
            error!("get: offset {} past stored size {}", offset, slot.size);
            return Err(StorageError::InvalidArgument);
        }

        let n = core::cmp::min(out.len(), slot.size - offset);
        out[..n].copy_from_slice(&slot.data[offset..offset + n]);
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
        match self.index.get(&uid) {
            Some(&i) => Ok(ObjectInfo {
                size: self.slots[i].size,
            }),
            None => {
                debug!("get_info: uid {:#x} not found", uid);
                Err(StorageError::DoesNotExist)
            }
        }
    }

    fn remove(&mut self, uid: u64) -> StorageResult<()> {
        let idx = match self.index.remove(&uid) {
            Some(i) => i,
            None => {
                debug!("remove: uid {:#x} not found", uid);
                return Err(StorageError::DoesNotExist);
            }
        };
        self.slots[idx].zeroize();
        debug!("remove: uid {:#x} cleared from slot {}", uid, idx);
        Ok(())
    }
}
