use clap::{Parser, Subcommand};
use log::info;
use trove_core::{ObjectInfo, StorageError, READ_WINDOW};
use trove_hal::LogGeometry;
use trove_store::{FsLog, LogStore, ObjectStore};

#[derive(Parser)]
#[command(about = "Inspect and edit a trove object store on disk")]
struct Cli {
    /// Root directory of the backing log
    #[arg(long, default_value = "./trove-data")]
    dir: String,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Store an object
    Set { uid: String, data: String },
    /// Read a window of an object
    Get {
        uid: String,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Bytes to read; defaults to the rest of the read window
        #[arg(long)]
        length: Option<usize>,
    },
    /// Show stored size
    Info { uid: String },
    /// Erase an object
    Remove { uid: String },
}

fn parse_uid(s: &str) -> anyhow::Result<u64> {
    let trimmed = s.trim_start_matches("0x");
    u64::from_str_radix(trimmed, 16).map_err(|e| anyhow::anyhow!("bad uid {:?}: {}", s, e))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Page size is a host stand-in; on device it comes from the flash query.
    let log = FsLog::mount(&cli.dir, LogGeometry::fixed(4096))
        .map_err(|e| anyhow::anyhow!("mount of {:?} failed: {}", cli.dir, e))?;
    info!(
        "log mounted at {:?} ({} bytes claimed)",
        cli.dir,
        log.geometry().capacity()
    );
    let mut store = LogStore::new(Box::new(log));

    match cli.cmd {
        Cmd::Set { uid, data } => {
            let uid = parse_uid(&uid)?;
            store.set(uid, data.as_bytes())?;
            info!("stored uid {:#x}, {} bytes", uid, data.len());
        }
        Cmd::Get {
            uid,
            offset,
            length,
        } => {
            let uid = parse_uid(&uid)?;
            let want = length.unwrap_or(READ_WINDOW.saturating_sub(offset));
            let mut buf = vec![0u8; want];
            let n = store.get(uid, offset, &mut buf)?;
            println!("{}", hex(&buf[..n]));
        }
        Cmd::Info { uid } => {
            let uid = parse_uid(&uid)?;
            let ObjectInfo { size } = store.get_info(uid)?;
            println!("{}", size);
        }
        Cmd::Remove { uid } => {
            let uid = parse_uid(&uid)?;
            store.remove(uid)?;
            info!("removed uid {:#x}", uid);
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("error: {:#}", err);
        // Exit code mirrors the storage taxonomy so scripts can branch on it.
        let code = match err.downcast_ref::<StorageError>() {
            Some(StorageError::InvalidArgument) => 2,
            Some(StorageError::DoesNotExist) => 3,
            Some(StorageError::InsufficientStorage) => 4,
            Some(StorageError::IoError) => 5,
            None => 1,
        };
        std::process::exit(code);
    }
}
