use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::memory::MemoryDataset;
use crate::traits::{Dataset, Datastore};

/// Snapshot file header: magic + version + flags.
///
/// On-disk format:
/// ```text
/// [4 bytes: magic "SYND"]
/// [1 byte:  format version (currently 1)]
/// [1 byte:  flags (bit 0 = zstd-compressed payload)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized dataset map)]
/// ```
const MAGIC: &[u8; 4] = b"SYND";
const VERSION: u8 = 1;
const FLAG_ZSTD: u8 = 0b0000_0001;

/// Snapshot filename inside the store directory.
const SNAPSHOT_FILE: &str = "synapsd.db";
/// Restore-point filename for the backup options.
const BACKUP_FILE: &str = "synapsd.db.bak";

/// Options recognized by [`FileDatastore::open`].
#[derive(Clone, Debug, Default)]
pub struct StoreOptions {
    /// Copy the existing snapshot aside before loading it.
    pub backup_on_open: bool,
    /// Copy the previous snapshot aside before the closing write.
    pub backup_on_close: bool,
    /// Compress snapshot payloads with zstd.
    pub compression: bool,
}

type DatasetContents = BTreeMap<String, BTreeMap<Vec<u8>, Vec<u8>>>;

/// Directory-rooted datastore with whole-store snapshot persistence.
///
/// Mutations apply to in-memory datasets; `flush()`/`close()` serialize
/// everything into a single CRC-framed snapshot file, written to a temp
/// file and renamed into place so a crash never leaves a torn snapshot.
#[derive(Debug)]
pub struct FileDatastore {
    root: PathBuf,
    options: StoreOptions,
    datasets: RwLock<HashMap<String, Arc<MemoryDataset>>>,
}

impl FileDatastore {
    /// Open (or create) a datastore rooted at `root`.
    pub fn open(root: &Path, options: StoreOptions) -> StoreResult<Self> {
        fs::create_dir_all(root)?;
        let snapshot = root.join(SNAPSHOT_FILE);

        if options.backup_on_open && snapshot.exists() {
            fs::copy(&snapshot, root.join(BACKUP_FILE))?;
            debug!(path = %snapshot.display(), "snapshot backed up on open");
        }

        let contents = if snapshot.exists() {
            load_snapshot(&snapshot)?
        } else {
            DatasetContents::new()
        };

        let mut datasets = HashMap::new();
        for (name, entries) in contents {
            let ds = Arc::new(MemoryDataset::new());
            ds.import(entries);
            datasets.insert(name, ds);
        }

        info!(
            path = %root.display(),
            dataset_count = datasets.len(),
            "file datastore opened"
        );

        Ok(Self {
            root: root.to_path_buf(),
            options,
            datasets: RwLock::new(datasets),
        })
    }

    fn snapshot_path(&self) -> PathBuf {
        self.root.join(SNAPSHOT_FILE)
    }

    fn write_snapshot(&self) -> StoreResult<()> {
        let contents: DatasetContents = {
            let map = self.datasets.read().expect("lock poisoned");
            map.iter()
                .map(|(name, ds)| (name.clone(), ds.export()))
                .collect()
        };

        let mut payload =
            bincode::serialize(&contents).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut flags = 0u8;
        if self.options.compression {
            payload = zstd::encode_all(&payload[..], 0)?;
            flags |= FLAG_ZSTD;
        }
        let crc = crc32fast::hash(&payload);

        // Temp-then-rename keeps the previous snapshot intact on failure.
        let tmp = self.root.join(format!("{SNAPSHOT_FILE}.tmp"));
        {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp)?;
            file.write_all(MAGIC)?;
            file.write_all(&[VERSION, flags])?;
            file.write_all(&crc.to_le_bytes())?;
            file.write_all(&payload)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, self.snapshot_path())?;

        debug!(bytes = payload.len(), compressed = self.options.compression, "snapshot written");
        Ok(())
    }
}

impl Datastore for FileDatastore {
    fn dataset(&self, name: &str) -> StoreResult<Arc<dyn Dataset>> {
        let mut map = self.datasets.write().expect("lock poisoned");
        let ds = map
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryDataset::new()));
        Ok(Arc::clone(ds) as Arc<dyn Dataset>)
    }

    fn dataset_names(&self) -> StoreResult<Vec<String>> {
        let map = self.datasets.read().expect("lock poisoned");
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn flush(&self) -> StoreResult<()> {
        self.write_snapshot()
    }

    fn close(&self) -> StoreResult<()> {
        let snapshot = self.snapshot_path();
        if self.options.backup_on_close && snapshot.exists() {
            fs::copy(&snapshot, self.root.join(BACKUP_FILE))?;
            debug!(path = %snapshot.display(), "snapshot backed up on close");
        }
        self.write_snapshot()?;
        info!(path = %self.root.display(), "file datastore closed");
        Ok(())
    }
}

fn load_snapshot(path: &Path) -> StoreResult<DatasetContents> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 10];
    file.read_exact(&mut header).map_err(|_| StoreError::Corruption {
        path: path.display().to_string(),
        reason: "snapshot shorter than header".into(),
    })?;

    if &header[0..4] != MAGIC {
        return Err(StoreError::Corruption {
            path: path.display().to_string(),
            reason: "bad magic".into(),
        });
    }
    if header[4] != VERSION {
        return Err(StoreError::Corruption {
            path: path.display().to_string(),
            reason: format!("unsupported snapshot version {}", header[4]),
        });
    }
    let flags = header[5];
    let expected_crc = u32::from_le_bytes([header[6], header[7], header[8], header[9]]);

    let mut payload = Vec::new();
    file.read_to_end(&mut payload)?;

    let computed_crc = crc32fast::hash(&payload);
    if computed_crc != expected_crc {
        warn!(path = %path.display(), "snapshot CRC mismatch");
        return Err(StoreError::Corruption {
            path: path.display().to_string(),
            reason: format!("CRC mismatch: expected {expected_crc:08x}, computed {computed_crc:08x}"),
        });
    }

    let payload = if flags & FLAG_ZSTD != 0 {
        zstd::decode_all(&payload[..])?
    } else {
        payload
    };

    bincode::deserialize(&payload).map_err(|e| StoreError::Serialization(e.to_string()))
}
