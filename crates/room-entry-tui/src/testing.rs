// in-memory doubles for the store and navigator seams

use crate::nav::Navigator;
use crate::store::KvStore;
use anyhow::{anyhow, Result};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub entries: HashMap<String, String>,
    pub writes: Vec<(String, String)>,
    pub fail: bool,
}

impl MemoryStore {
    pub fn with(key: &str, value: &str) -> Self {
        let mut s = Self::default();
        s.entries.insert(key.into(), value.into());
        s
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail {
            return Err(anyhow!("store offline"));
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail {
            return Err(anyhow!("store offline"));
        }
        self.writes.push((key.into(), value.into()));
        self.entries.insert(key.into(), value.into());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub paths: Vec<String>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, path: &str) {
        self.paths.push(path.to_string());
    }
}
