//! In-memory gazetteer.
//!
//! Holds every record in an ordered map and indexes canonical and alternate
//! names (lower-cased) for phrase lookup. Intended for datasets that fit in
//! memory and for tests.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use geotag_gazetteer_models::{EARTH_ID, GazetteerEntry, earth};

use crate::{Gazetteer, GazetteerError, Hierarchy, LevelTables, dump};

/// A [`Gazetteer`] backed by in-memory maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGazetteer {
    tables: LevelTables,
    entries: BTreeMap<u64, Arc<GazetteerEntry>>,
    /// lower-cased name -> ids, in insertion order
    names: BTreeMap<String, Vec<u64>>,
}

impl InMemoryGazetteer {
    /// Creates an empty gazetteer that classifies records with `tables`.
    #[must_use]
    pub fn new(tables: LevelTables) -> Self {
        Self {
            tables,
            entries: BTreeMap::new(),
            names: BTreeMap::new(),
        }
    }

    /// Creates a gazetteer holding `entries`.
    #[must_use]
    pub fn from_entries(
        tables: LevelTables,
        entries: impl IntoIterator<Item = GazetteerEntry>,
    ) -> Self {
        let mut gazetteer = Self::new(tables);
        for entry in entries {
            gazetteer.insert(entry);
        }
        gazetteer
    }

    /// Loads a `GeoNames` dump and the level tables found in `tables_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError`] if either the dump or a table file cannot
    /// be read.
    pub fn load(dump_path: &Path, tables_dir: &Path) -> Result<Self, GazetteerError> {
        let tables = LevelTables::load_dir(tables_dir)?;
        let entries = dump::read_dump(dump_path)?;
        Ok(Self::from_entries(tables, entries))
    }

    /// Adds (or replaces) a record, classifying its level. A replaced
    /// record's names stop matching it.
    pub fn insert(&mut self, mut entry: GazetteerEntry) {
        entry.level = self.tables.classify(entry.id);
        let id = entry.id;

        if let Some(old) = self.entries.remove(&id) {
            let kept: BTreeSet<String> = entry.all_names().map(str::to_lowercase).collect();
            for name in old.all_names() {
                let key = name.to_lowercase();
                if kept.contains(&key) {
                    continue;
                }
                if let Some(ids) = self.names.get_mut(&key) {
                    ids.retain(|other| *other != id);
                    if ids.is_empty() {
                        self.names.remove(&key);
                    }
                }
            }
        }

        for name in entry.all_names() {
            let ids = self.names.entry(name.to_lowercase()).or_default();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        self.entries.insert(id, Arc::new(entry));
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the gazetteer holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn by_name(&self, key: &str) -> Vec<Arc<GazetteerEntry>> {
        self.names
            .get(key)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.entries.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Gazetteer for InMemoryGazetteer {
    fn lookup_by_id(&self, id: u64) -> Result<Option<Arc<GazetteerEntry>>, GazetteerError> {
        Ok(self
            .entries
            .get(&id)
            .cloned()
            .or_else(|| (id == EARTH_ID).then(earth)))
    }

    fn lookup_by_phrase(&self, phrase: &str) -> Result<Vec<Arc<GazetteerEntry>>, GazetteerError> {
        let key = phrase.trim().to_lowercase();
        let found = self.by_name(&key);
        if !found.is_empty() || !key.contains('.') {
            return Ok(found);
        }

        // "U.S." -> "us"
        Ok(self.by_name(&key.replace('.', "")))
    }

    fn ancestor_hierarchy(&self, entry: &GazetteerEntry) -> Result<Hierarchy, GazetteerError> {
        let mut hierarchy = Hierarchy::new();
        for (level, id) in self.tables.ancestor_ids(entry) {
            match self.entries.get(&id) {
                Some(ancestor) => {
                    hierarchy.insert(level, Arc::clone(ancestor));
                }
                None => log::debug!("{entry}: {level} ancestor {id} not in gazetteer"),
            }
        }
        Ok(hierarchy)
    }
}
