//! Seen-set persistence.
//!
//! The seen-set is the only state that outlives a run: loaded at start,
//! grown during the run, rewritten in full at the end. The file is a sorted,
//! pretty-printed JSON array of links so it diffs cleanly when committed.

use std::collections::BTreeSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::StateError;

/// Links already processed. Iterates in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    links: BTreeSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, link: &str) -> bool {
        self.links.contains(link)
    }

    /// Returns `false` if the link was already present.
    pub fn insert(&mut self, link: &str) -> bool {
        if self.links.contains(link) {
            return false;
        }
        self.links.insert(link.to_string())
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SeenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            links: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Load/save seam for the seen-set.
pub trait SeenStore: Send + Sync {
    /// No prior state is an empty set, not an error.
    fn load(&self) -> Result<SeenSet, StateError>;
    /// Replace the stored set with `seen`.
    fn save(&self, seen: &SeenSet) -> Result<(), StateError>;
}

/// JSON array on disk, replaced atomically via temp file + rename.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist_err(&self, message: impl ToString) -> StateError {
        StateError::Persist {
            path: self.path.clone(),
            message: message.to_string(),
        }
    }
}

impl SeenStore for JsonFileStore {
    fn load(&self) -> Result<SeenSet, StateError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SeenSet::new()),
            Err(source) => {
                return Err(StateError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let links: Vec<String> =
            serde_json::from_str(&data).map_err(|e| StateError::Corrupt {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        Ok(links.into_iter().collect())
    }

    fn save(&self, seen: &SeenSet) -> Result<(), StateError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.persist_err(e))?;

        let links: Vec<&str> = seen.iter().collect();
        let mut body = serde_json::to_string_pretty(&links).map_err(|e| self.persist_err(e))?;
        body.push('\n');

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| self.persist_err(e))?;
        tmp.write_all(body.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| self.persist_err(e))?;
        tmp.persist(&self.path).map_err(|e| self.persist_err(e.error))?;
        Ok(())
    }
}

/// Keeps the set in memory. Handy for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<SeenSet>,
}

impl MemoryStore {
    pub fn new(initial: SeenSet) -> Self {
        Self {
            inner: Mutex::new(initial),
        }
    }

    pub fn snapshot(&self) -> SeenSet {
        self.inner.lock().expect("seen-set mutex poisoned").clone()
    }
}

impl SeenStore for MemoryStore {
    fn load(&self) -> Result<SeenSet, StateError> {
        Ok(self.snapshot())
    }

    fn save(&self, seen: &SeenSet) -> Result<(), StateError> {
        *self.inner.lock().expect("seen-set mutex poisoned") = seen.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path().join("seen.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_is_sorted_and_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("state/seen.json");
        let store = JsonFileStore::new(&path);

        let set: SeenSet = ["https://b/2", "https://a/1", "https://c/3"]
            .into_iter()
            .collect();
        store.save(&set).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "[\n  \"https://a/1\",\n  \"https://b/2\",\n  \"https://c/3\"\n]\n"
        );
        assert_eq!(store.load().unwrap(), set);

        // saving what was loaded is byte-for-byte stable
        store.save(&store.load().unwrap()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn unparseable_file_is_corrupt() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("seen.json");
        fs::write(&path, "{not json").unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StateError::Corrupt { .. }), "{err}");

        fs::write(&path, r#"{"links": []}"#).unwrap();
        assert!(matches!(
            JsonFileStore::new(&path).load(),
            Err(StateError::Corrupt { .. })
        ));
    }

    #[test]
    fn save_replaces_previous_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path().join("seen.json"));
        store.save(&["https://old"].into_iter().collect()).unwrap();
        store.save(&["https://new"].into_iter().collect()).unwrap();
        let loaded = store.load().unwrap();
        assert!(loaded.contains("https://new"));
        assert!(!loaded.contains("https://old"));
    }

    #[test]
    fn save_into_unwritable_location_is_persist_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "x").unwrap();
        // parent "directory" is a regular file
        let store = JsonFileStore::new(blocker.join("seen.json"));
        assert!(matches!(
            store.save(&SeenSet::new()),
            Err(StateError::Persist { .. })
        ));
    }

    #[test]
    fn insert_reports_novelty() {
        let mut s = SeenSet::new();
        assert!(s.insert("https://x/1"));
        assert!(!s.insert("https://x/1"));
        assert!(s.insert("https://x/1/"));
        assert_eq!(s.len(), 2);
    }
}
