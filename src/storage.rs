// Key-value persistence adapters

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Durable key-value byte storage the task store persists into
pub trait KeyValueStore {
    /// Bytes previously stored under `key`, or `None` if never written or unavailable
    fn read(&self, key: &str) -> Option<Vec<u8>>;

    /// Replace the value under `key`
    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<()>;
}

// ============================================================================
// In-memory storage
// ============================================================================

/// Volatile storage, mainly for tests
///
/// Counts successful writes and can be told to fail every write, which
/// stands in for quota or permission errors of a real backend.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: HashMap<String, Vec<u8>>,
    write_count: usize,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed raw bytes under a key without counting it as a write
    pub fn insert(&mut self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.values.insert(key.into(), bytes.into());
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    /// Make every subsequent write fail (or succeed again)
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl KeyValueStore for MemoryStorage {
    fn read(&self, key: &str) -> Option<Vec<u8>> {
        self.values.get(key).cloned()
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(eyre!("Storage unavailable: write to {} rejected", key));
        }
        self.values.insert(key.to_string(), bytes.to_vec());
        self.write_count += 1;
        Ok(())
    }
}

// ============================================================================
// File storage
// ============================================================================

/// Directory-backed storage, one `<key>.json` file per key
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Open or create a storage directory at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        // Create directory if it doesn't exist
        fs::create_dir_all(&base_path).context("Failed to create storage directory")?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.lock", key))
    }

    fn validate_key(key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(eyre!("Storage key cannot be empty"));
        }
        if key.len() > 128 {
            return Err(eyre!("Storage key too long: {} (max 128 chars)", key));
        }
        if key.starts_with('.') {
            return Err(eyre!("Storage key cannot start with '.': {}", key));
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
        {
            return Err(eyre!(
                "Invalid storage key: {} (must be alphanumeric with ./_/-)",
                key
            ));
        }
        Ok(())
    }
}

impl KeyValueStore for FileStorage {
    fn read(&self, key: &str) -> Option<Vec<u8>> {
        if let Err(e) = Self::validate_key(key) {
            warn!(key, error = %e, "Refusing to read invalid key");
            return None;
        }

        // Writes replace the file by rename, so a reader never sees a partial value
        let path = self.value_path(key);
        match fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(file = ?path, error = ?e, "Failed to read stored value");
                None
            }
        }
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        Self::validate_key(key)?;

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path(key))
            .context("Failed to open lock file")?;

        // Acquire exclusive lock before writing
        lock_file.lock_exclusive().context("Failed to acquire file lock")?;

        let path = self.value_path(key);
        let tmp_path = self.base_path.join(format!("{}.json.tmp", key));

        let mut file = File::create(&tmp_path).context("Failed to create temporary file")?;
        file.write_all(bytes).context("Failed to write temporary file")?;
        file.sync_all()?; // Ensure data is flushed to disk
        fs::rename(&tmp_path, &path).context("Failed to replace stored value")?;

        debug!(file = ?path, bytes = bytes.len(), "Stored value");

        // Lock is automatically released when lock_file is dropped
        Ok(())
    }
}
