use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use buildwatch_core::BuildId;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache directory missing or not writable: {0}")]
    Dir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode selection: {0}")]
    Encode(String),
    #[error("cached selection is malformed: {0}")]
    Decode(String),
}

/// Single-slot local store for the selection. `set` overwrites wholesale.
pub trait LocalCache: Send + Sync {
    fn get(&self) -> Result<Option<Vec<BuildId>>, CacheError>;
    fn set(&self, ids: &[BuildId]) -> Result<(), CacheError>;
}

/// JSON array stored at `{dir}/{key}.json`, replaced through a temp file.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    file_name: String,
}

impl FileCache {
    pub fn new(dir: PathBuf, key: &str) -> Self {
        Self {
            dir,
            file_name: format!("{key}.json"),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

impl LocalCache for FileCache {
    fn get(&self) -> Result<Option<Vec<BuildId>>, CacheError> {
        let raw = match fs::read_to_string(self.path()) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let ids = serde_json::from_str(&raw).map_err(|err| CacheError::Decode(err.to_string()))?;
        Ok(Some(ids))
    }

    fn set(&self, ids: &[BuildId]) -> Result<(), CacheError> {
        let content = serde_json::to_string(ids).map_err(|err| CacheError::Encode(err.to_string()))?;
        write_atomic(&self.dir, &self.file_name, &content)?;
        Ok(())
    }
}

fn ensure_dir(dir: &Path) -> Result<(), CacheError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| CacheError::Dir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(CacheError::Dir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| CacheError::Dir(e.to_string()))?;
    }
    Ok(())
}

fn write_atomic(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf, CacheError> {
    ensure_dir(dir)?;

    let target = dir.join(file_name);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(&target).map_err(|e| CacheError::Io(e.error))?;
    Ok(target)
}

/// In-process cache for runs without a cache directory.
#[derive(Debug, Default)]
pub struct MemoryCache {
    slot: Mutex<Option<Vec<BuildId>>>,
}

impl MemoryCache {
    pub fn with_ids(ids: Vec<BuildId>) -> Self {
        Self {
            slot: Mutex::new(Some(ids)),
        }
    }
}

impl LocalCache for MemoryCache {
    fn get(&self) -> Result<Option<Vec<BuildId>>, CacheError> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slot.clone())
    }

    fn set(&self, ids: &[BuildId]) -> Result<(), CacheError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(ids.to_vec());
        Ok(())
    }
}
