use crate::model::{NoteKey, StoreError};
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key/value persistence for notes. Values are never blank: absence is "no note".
pub trait NoteStore {
    fn get(&self, key: NoteKey) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: NoteKey, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: NoteKey) -> Result<(), StoreError>;
    fn clear(&mut self) -> Result<(), StoreError>;

    fn contains(&self, key: NoteKey) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    notes: BTreeMap<NoteKey, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl NoteStore for MemoryStore {
    fn get(&self, key: NoteKey) -> Result<Option<String>, StoreError> {
        Ok(self.notes.get(&key).cloned())
    }

    fn set(&mut self, key: NoteKey, value: &str) -> Result<(), StoreError> {
        let value = non_blank(key, value)?;
        self.notes.insert(key, value);
        Ok(())
    }

    fn remove(&mut self, key: NoteKey) -> Result<(), StoreError> {
        self.notes.remove(&key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.notes.clear();
        Ok(())
    }
}

/// Notes kept in memory and mirrored to a YAML file after every mutation.
#[derive(Debug)]
pub struct YamlStore {
    path: PathBuf,
    notes: BTreeMap<NoteKey, String>,
}

impl YamlStore {
    /// Opens the file at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let notes = if path.exists() {
            let data = fs::read_to_string(&path)
                .map_err(|err| StoreError::unavailable("open", format!("{:?}: {}", path, err)))?;
            if data.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_yaml::from_str::<BTreeMap<NoteKey, String>>(&data)
                    .map_err(|err| StoreError::unavailable("open", err))?
                    .into_iter()
                    .filter(|(_, text)| !text.trim().is_empty())
                    .collect()
            }
        } else {
            BTreeMap::new()
        };
        debug!(
            "event=store_open path={} notes={}",
            path.display(),
            notes.len()
        );
        Ok(YamlStore { path, notes })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    fn flush(&self, op: &'static str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| StoreError::unavailable(op, format!("{:?}: {}", parent, err)))?;
        }
        let serialized =
            serde_yaml::to_string(&self.notes).map_err(|err| StoreError::unavailable(op, err))?;
        fs::write(&self.path, serialized)
            .map_err(|err| StoreError::unavailable(op, format!("{:?}: {}", self.path, err)))
    }

    // Applies `change` and persists it, rolling memory back if the write fails.
    fn mutate<F>(&mut self, op: &'static str, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<NoteKey, String>),
    {
        let snapshot = self.notes.clone();
        change(&mut self.notes);
        if let Err(err) = self.flush(op) {
            self.notes = snapshot;
            return Err(err);
        }
        Ok(())
    }
}

impl NoteStore for YamlStore {
    fn get(&self, key: NoteKey) -> Result<Option<String>, StoreError> {
        Ok(self.notes.get(&key).cloned())
    }

    fn set(&mut self, key: NoteKey, value: &str) -> Result<(), StoreError> {
        let value = non_blank(key, value)?;
        if self.notes.get(&key) == Some(&value) {
            return Ok(());
        }
        self.mutate("set", |notes| {
            notes.insert(key, value);
        })
    }

    fn remove(&mut self, key: NoteKey) -> Result<(), StoreError> {
        if !self.notes.contains_key(&key) {
            return Ok(());
        }
        self.mutate("remove", |notes| {
            notes.remove(&key);
        })
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.mutate("clear", |notes| notes.clear())
    }
}

fn non_blank(key: NoteKey, value: &str) -> Result<String, StoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::EmptyValue(key));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::{MemoryStore, NoteStore};
    use crate::model::{NoteKey, StoreError};

    /// Accepts `sets_left` writes, then refuses every later one.
    pub struct FlakyStore {
        pub inner: MemoryStore,
        pub sets_left: usize,
    }

    impl FlakyStore {
        pub fn failing_after(sets: usize) -> Self {
            FlakyStore {
                inner: MemoryStore::new(),
                sets_left: sets,
            }
        }
    }

    impl NoteStore for FlakyStore {
        fn get(&self, key: NoteKey) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }
        fn set(&mut self, key: NoteKey, value: &str) -> Result<(), StoreError> {
            if self.sets_left == 0 {
                return Err(StoreError::unavailable("set", "disk full"));
            }
            self.sets_left -= 1;
            self.inner.set(key, value)
        }
        fn remove(&mut self, key: NoteKey) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
        fn clear(&mut self) -> Result<(), StoreError> {
            self.inner.clear()
        }
    }

    /// Every call fails, as if the backing file vanished.
    pub struct BrokenStore;

    impl NoteStore for BrokenStore {
        fn get(&self, _key: NoteKey) -> Result<Option<String>, StoreError> {
            Err(StoreError::unavailable("get", "disk gone"))
        }
        fn set(&mut self, _key: NoteKey, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::unavailable("set", "disk gone"))
        }
        fn remove(&mut self, _key: NoteKey) -> Result<(), StoreError> {
            Err(StoreError::unavailable("remove", "disk gone"))
        }
        fn clear(&mut self) -> Result<(), StoreError> {
            Err(StoreError::unavailable("clear", "disk gone"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(hours: i64) -> NoteKey {
        NoteKey::from_millis(0) + hours
    }

    #[test]
    fn memory_store_rejects_blank_values() {
        let mut store = MemoryStore::new();
        let err = store.set(key(1), "  ").unwrap_err();
        assert!(matches!(err, StoreError::EmptyValue(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn memory_store_trims_and_removes() {
        let mut store = MemoryStore::new();
        store.set(key(1), " Call ").unwrap();
        assert_eq!(store.get(key(1)).unwrap().as_deref(), Some("Call"));
        assert!(store.contains(key(1)).unwrap());
        store.remove(key(1)).unwrap();
        assert_eq!(store.get(key(1)).unwrap(), None);
        store.remove(key(1)).unwrap();
    }

    #[test]
    fn yaml_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("notes.yml");
        {
            let mut store = YamlStore::open(&path).unwrap();
            store.set(key(9), "Meeting").unwrap();
            store.set(key(10), "Lunch").unwrap();
            store.remove(key(10)).unwrap();
        }
        let store = YamlStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(key(9)).unwrap().as_deref(), Some("Meeting"));
    }

    #[test]
    fn yaml_store_clear_empties_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.yml");
        let mut store = YamlStore::open(&path).unwrap();
        for h in 0..5 {
            store.set(key(h), "x").unwrap();
        }
        store.clear().unwrap();
        assert!(YamlStore::open(&path).unwrap().is_empty());
    }

    #[test]
    fn yaml_store_reports_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.yml");
        fs::write(&path, "not: [valid").unwrap();
        let err = YamlStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { op: "open", .. }));
    }
}
