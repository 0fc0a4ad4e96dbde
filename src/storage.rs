use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// Key of the single record holding every note.
pub const FILES_KEY: &str = "files";

/// Name -> content, in insertion order.
pub type FileMap = IndexMap<String, String>;

/// On-disk shape of the record: a flat JSON object of strings.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct Record(FileMap);

pub fn encode_files(files: &FileMap) -> Result<String> {
    Ok(serde_json::to_string(&Record(files.clone()))?)
}

pub fn decode_files(raw: &str) -> Result<FileMap> {
    let record: Record = serde_json::from_str(raw)
        .context("record is not a flat object of strings")?;
    Ok(record.0)
}

/// Durable key/value backend behind the file store.
pub trait Storage {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {:?}", path)),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {:?}", self.dir))?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp, value).with_context(|| format!("writing {:?}", tmp))?;
        std::fs::rename(&tmp, &path).with_context(|| format!("replacing {:?}", path))?;
        Ok(())
    }
}

/// In-process backend. Nothing outlives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    records: HashMap<String, String>,
    failing: bool,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw record, bypassing encoding.
    #[cfg(test)]
    pub fn with_record(key: &str, raw: &str) -> Self {
        let mut storage = Self::new();
        storage.records.insert(key.to_string(), raw.to_string());
        storage
    }

    /// While failing, every load and save returns an error.
    #[cfg(test)]
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Successful saves so far.
    #[cfg(test)]
    pub fn writes(&self) -> usize {
        self.writes
    }

    #[cfg(test)]
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.records.get(key).map(String::as_str)
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        if self.failing {
            bail!("storage unavailable");
        }
        Ok(self.records.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        if self.failing {
            bail!("storage unavailable");
        }
        self.records.insert(key.to_string(), value.to_string());
        self.writes += 1;
        debug!("memory write #{} to {:?}", self.writes, key);
        Ok(())
    }
}
