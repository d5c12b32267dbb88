// storage/mod.rs

pub mod reference;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use parking_lot::RwLock;
use log::{info, debug, warn};

use crate::error::{Error, Result};
use crate::parser::DrugNameParser;
use crate::types::Record;
use crate::utils::{ProgressObserver, NoopObserver};

pub use self::reference::{ReferenceSet, build_keys, load_reference_file};

/// Owns the reference database snapshot. Readers clone the `Arc` under a
/// short read lock and then work on an immutable set; `reload` publishes a
/// new snapshot with a single swap.
pub struct ReferenceStore {
    path: Option<PathBuf>,
    parser: DrugNameParser,
    snapshot: RwLock<Option<Arc<ReferenceSet>>>,
}

impl ReferenceStore {
    /// A store backed by the JSON database at `path`, loaded on first use.
    pub fn new<P: Into<PathBuf>>(path: P, parser: DrugNameParser) -> Self {
        Self {
            path: Some(path.into()),
            parser,
            snapshot: RwLock::new(None),
        }
    }

    /// A store over records already in memory. `reload` rebuilds from the
    /// same records.
    pub fn from_records(records: Vec<Record>, parser: DrugNameParser) -> Self {
        let set = ReferenceSet::build(records, &parser);
        Self {
            path: None,
            parser,
            snapshot: RwLock::new(Some(Arc::new(set))),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn parser(&self) -> &DrugNameParser {
        &self.parser
    }

    pub fn load(&self) -> Result<Arc<ReferenceSet>> {
        self.load_with_status(&NoopObserver)
    }

    /// Returns the cached snapshot, reading the database first if nothing is
    /// loaded yet. `observer` hears "Reading database..." only when a read happens.
    pub fn load_with_status(&self, observer: &dyn ProgressObserver) -> Result<Arc<ReferenceSet>> {
        if let Some(set) = self.snapshot.read().as_ref() {
            return Ok(Arc::clone(set));
        }

        let mut guard = self.snapshot.write();
        // Another caller may have finished the load while we waited
        if let Some(set) = guard.as_ref() {
            return Ok(Arc::clone(set));
        }

        observer.on_status("Reading database...");
        let set = Arc::new(self.build()?);
        *guard = Some(Arc::clone(&set));
        Ok(set)
    }

    /// Re-reads the database and swaps in the new snapshot. On failure the
    /// previous snapshot stays in place.
    pub fn reload(&self) -> Result<Arc<ReferenceSet>> {
        let set = match self.build() {
            Ok(set) => Arc::new(set),
            Err(e) => {
                warn!("Reload of reference database failed, keeping previous snapshot: {}", e);
                return Err(e);
            }
        };
        *self.snapshot.write() = Some(Arc::clone(&set));
        info!("Reference database reloaded: {} records", set.len());
        Ok(set)
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.read().is_some()
    }

    /// Record count of the current snapshot; 0 when nothing is loaded.
    pub fn len(&self) -> usize {
        self.snapshot.read().as_ref().map_or(0, |set| set.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn build(&self) -> Result<ReferenceSet> {
        let start = Instant::now();
        let records = match &self.path {
            Some(path) => load_reference_file(path)?,
            None => match self.snapshot.read().as_ref() {
                Some(set) => set.records().to_vec(),
                None => return Err(Error::config("reference store has neither a path nor records")),
            },
        };
        let set = ReferenceSet::build(records, &self.parser);
        info!("Loaded {} reference records in {:?}", set.len(), start.elapsed());
        debug!("Reference columns: {:?}", set.columns());
        Ok(set)
    }
}

impl std::fmt::Debug for ReferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceStore")
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .field("records", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use crate::utils::FnObserver;

    const DB: &str = r#"{"data": [
        {"name_en": "Panadol", "name_ar": "بنادول", "price_retail": 12},
        {"name_en": "Aspirin", "name_ar": "أسبرين", "price_retail": 5}
    ]}"#;

    #[test]
    fn loads_once_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("druglist.json");
        fs::write(&path, DB).unwrap();

        let store = ReferenceStore::new(&path, DrugNameParser::new());
        assert!(!store.is_loaded());
        assert_eq!(store.len(), 0);

        let statuses = RefCell::new(Vec::new());
        let observer = FnObserver::new(|_, _| {}, |m: &str| statuses.borrow_mut().push(m.to_string()));
        let first = store.load_with_status(&observer).unwrap();
        assert_eq!(first.len(), 2);

        // Later calls must not touch the file
        fs::remove_file(&path).unwrap();
        let second = store.load_with_status(&observer).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(statuses.borrow().as_slice(), &["Reading database...".to_string()]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("druglist.json");
        fs::write(&path, DB).unwrap();

        let store = ReferenceStore::new(&path, DrugNameParser::new());
        let before = store.load().unwrap();

        fs::write(&path, "[]").unwrap();
        assert!(matches!(store.reload().unwrap_err(), Error::MalformedData(_)));
        assert!(Arc::ptr_eq(&before, &store.load().unwrap()));

        fs::write(&path, r#"[{"name_en": "Brufen"}]"#).unwrap();
        let after = store.reload().unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(store.load().unwrap().keys_en(), &["brufen"]);
        // Old handles stay valid
        assert_eq!(before.len(), 2);
    }

    #[test]
    fn missing_database_is_an_error_and_stays_unloaded() {
        let store = ReferenceStore::new("no/such/druglist.json", DrugNameParser::new());
        assert!(matches!(store.load().unwrap_err(), Error::MissingFile(_)));
        assert!(!store.is_loaded());
    }

    #[test]
    fn in_memory_store_is_loaded_immediately() {
        let records = crate::reader::json::records_from_document(serde_json::json!([{"name_en": "Panadol"}])).unwrap();
        let store = ReferenceStore::from_records(records, DrugNameParser::new());
        assert!(store.is_loaded());
        assert_eq!(store.reload().unwrap().len(), 1);
    }

    #[test]
    fn concurrent_first_loads_share_one_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("druglist.json");
        fs::write(&path, DB).unwrap();
        let store = Arc::new(ReferenceStore::new(&path, DrugNameParser::new()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.load().unwrap())
            })
            .collect();
        let sets: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(sets.iter().all(|s| Arc::ptr_eq(s, &sets[0])));
    }
}
