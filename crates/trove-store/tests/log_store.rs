use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use trove_core::{StorageError, MAX_OBJECT_SIZE, READ_WINDOW};
use trove_hal::{BackingLog, LogError};
use trove_store::{LogStore, ObjectStore, TableStore};

/// Injectable log faults, shared with the test after the log is boxed.
#[derive(Default)]
struct Faults {
    short_writes: AtomicBool,
    stuck_records: AtomicBool,
}

/// In-memory stand-in for the flash log.
struct RamLog {
    records: BTreeMap<u64, Vec<u8>>,
    faults: Arc<Faults>,
}

impl RamLog {
    fn new() -> Self {
        Self::with_faults(Arc::new(Faults::default()))
    }

    fn with_faults(faults: Arc<Faults>) -> Self {
        Self {
            records: BTreeMap::new(),
            faults,
        }
    }
}

impl BackingLog for RamLog {
    fn write(&mut self, key: u64, data: &[u8]) -> Result<usize, LogError> {
        if self.faults.short_writes.load(Ordering::SeqCst) {
            // Claim a truncated write without touching stored state.
            return Ok(data.len() / 2);
        }
        self.records.insert(key, data.to_vec());
        Ok(data.len())
    }

    fn read(&mut self, key: u64, buf: &mut [u8]) -> Result<usize, LogError> {
        let record = self.records.get(&key).ok_or(LogError::NotFound)?;
        let n = buf.len().min(record.len());
        buf[..n].copy_from_slice(&record[..n]);
        Ok(n)
    }

    fn delete(&mut self, key: u64) -> Result<(), LogError> {
        if !self.faults.stuck_records.load(Ordering::SeqCst) {
            self.records.remove(&key);
        }
        Ok(())
    }

    fn length(&mut self, key: u64) -> Result<usize, LogError> {
        self.records
            .get(&key)
            .map(Vec::len)
            .ok_or(LogError::NotFound)
    }
}

#[test]
fn unknown_uid_fails_everywhere() {
    let mut store = LogStore::new(Box::new(RamLog::new()));
    let mut buf = [0u8; 4];

    assert_eq!(store.get(0x42, 0, &mut buf), Err(StorageError::DoesNotExist));
    assert_eq!(store.get_info(0x42), Err(StorageError::DoesNotExist));
    assert_eq!(store.remove(0x42), Err(StorageError::DoesNotExist));
}

#[test]
fn round_trip_within_window() {
    let mut store = LogStore::new(Box::new(RamLog::new()));
    store.set(0xA, b"0123456789").unwrap();

    assert_eq!(store.get_info(0xA).unwrap().size, 10);

    let mut mid = [0u8; 4];
    assert_eq!(store.get(0xA, 3, &mut mid).unwrap(), 4);
    assert_eq!(&mid, b"3456");

    // Same clamp policy as the table backend.
    let mut tail = [0u8; 10];
    assert_eq!(store.get(0xA, 8, &mut tail).unwrap(), 2);
    assert_eq!(&tail[..2], b"89");
    assert_eq!(
        store.get(0xA, 11, &mut tail),
        Err(StorageError::InvalidArgument)
    );
}

#[test]
fn window_bound_is_checked_before_the_log() {
    let mut store = LogStore::new(Box::new(RamLog::new()));
    store.set(1, &[0xCD; 200]).unwrap();

    // The bound is the staging buffer, not the object's logical size.
    let mut whole = [0u8; READ_WINDOW + 1];
    assert_eq!(
        store.get(1, 0, &mut whole),
        Err(StorageError::InvalidArgument)
    );
    let mut shifted = [0u8; 29];
    assert_eq!(
        store.get(1, 100, &mut shifted),
        Err(StorageError::InvalidArgument)
    );

    // Windows inside the bound work even on the oversized object.
    let mut edge = [0u8; 8];
    assert_eq!(store.get(1, 120, &mut edge).unwrap(), 8);
    assert_eq!(&edge, &[0xCD; 8]);

    // A small object clamps inside a full window.
    store.set(2, b"tiny").unwrap();
    let mut window = [0u8; READ_WINDOW];
    assert_eq!(store.get(2, 0, &mut window).unwrap(), 4);
    assert_eq!(&window[..4], b"tiny");
}

#[test]
fn write_cap_is_wider_than_read_window() {
    let mut store = LogStore::new(Box::new(RamLog::new()));

    let payload = vec![0xAB; MAX_OBJECT_SIZE];
    store.set(9, &payload).unwrap();
    assert_eq!(store.get_info(9).unwrap().size, MAX_OBJECT_SIZE);

    let oversized = vec![0u8; MAX_OBJECT_SIZE + 1];
    assert_eq!(
        store.set(9, &oversized),
        Err(StorageError::InsufficientStorage)
    );
    // The rejected set replaced nothing.
    assert_eq!(store.get_info(9).unwrap().size, MAX_OBJECT_SIZE);
}

#[test]
fn short_write_is_io_error_and_keeps_prior_object() {
    let faults = Arc::new(Faults::default());
    let mut store = LogStore::new(Box::new(RamLog::with_faults(faults.clone())));

    store.set(5, b"stable").unwrap();

    faults.short_writes.store(true, Ordering::SeqCst);
    assert_eq!(store.set(5, b"replacement"), Err(StorageError::IoError));
    faults.short_writes.store(false, Ordering::SeqCst);

    let mut buf = [0u8; 16];
    assert_eq!(store.get(5, 0, &mut buf).unwrap(), 6);
    assert_eq!(&buf[..6], b"stable");
}

#[test]
fn remove_verifies_erasure() {
    let faults = Arc::new(Faults::default());
    let mut store = LogStore::new(Box::new(RamLog::with_faults(faults.clone())));

    store.set(6, b"sticky").unwrap();
    faults.stuck_records.store(true, Ordering::SeqCst);
    // The delete "succeeds" but the record survives; that is a log fault.
    assert_eq!(store.remove(6), Err(StorageError::IoError));

    faults.stuck_records.store(false, Ordering::SeqCst);
    store.remove(6).unwrap();
    assert_eq!(store.remove(6), Err(StorageError::DoesNotExist));
}

#[test]
fn backends_coexist_behind_the_trait() {
    let mut stores: Vec<Box<dyn ObjectStore>> = vec![
        Box::new(TableStore::new()),
        Box::new(LogStore::new(Box::new(RamLog::new()))),
    ];

    for store in stores.iter_mut() {
        store.set(0xA, b"0123456789").unwrap();
        assert_eq!(store.get_info(0xA).unwrap().size, 10);

        let mut window = [0u8; 4];
        assert_eq!(store.get(0xA, 3, &mut window).unwrap(), 4);
        assert_eq!(&window, b"3456");

        let mut tail = [0u8; 10];
        assert_eq!(store.get(0xA, 8, &mut tail).unwrap(), 2);
        assert_eq!(&tail[..2], b"89");

        store.remove(0xA).unwrap();
        assert_eq!(store.remove(0xA), Err(StorageError::DoesNotExist));
    }
}
