// local key-value persistence

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Flat JSON object on disk, e.g. `{"name":"Alice"}`.
///
/// A missing or blank file reads as empty. Keys this program does not own are
/// kept on write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(s) if s.trim().is_empty() => Ok(None),
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read {}", self.path.display())),
        }
    }

    fn parse(&self, raw: &str) -> Result<Map<String, Value>> {
        serde_json::from_str(raw).with_context(|| format!("parse {}", self.path.display()))
    }

    fn load(&self) -> Result<Map<String, Value>> {
        match self.read_raw()? {
            Some(raw) => self.parse(&raw),
            None => Ok(Map::new()),
        }
    }

    /// Like `load`, but a corrupt document is moved aside to `*.json.bak`
    /// and replaced by an empty one so writes keep working.
    fn load_for_write(&self) -> Result<Map<String, Value>> {
        let Some(raw) = self.read_raw()? else {
            return Ok(Map::new());
        };
        match self.parse(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                let bak = self.path.with_extension("json.bak");
                warn!(error = %e, backup = %bak.display(), "store unreadable, starting fresh");
                if let Err(e) = fs::write(&bak, &raw) {
                    warn!(error = %e, "could not back up store");
                }
                Ok(Map::new())
            }
        }
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.load()?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_owned))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = self.load_for_write()?;
        map.insert(key.to_owned(), Value::String(value.to_owned()));

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let body = serde_json::to_string_pretty(&map).context("encode store")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace {}", self.path.display()))?;
        Ok(())
    }
}
