//! Administrative code tables.
//!
//! `GeoNames` identifies a record's administrative parents only by code
//! (`country_code`, `admin1_code`, `admin2_code`). These tables map the
//! composite code keys (`"FR"`, `"FR.11"`, `"FR.11.75"`) to the ids of the
//! corresponding division records, and classify ids into [`Level`]s.
//!
//! Each table file is a headerless CSV of `code,geonameId` rows:
//!
//! | File             | Key example   |
//! |------------------|---------------|
//! | `country.csv`    | `FR`          |
//! | `admin1.csv`     | `FR.11`       |
//! | `admin2.csv`     | `FR.11.75`    |
//! | `continents.csv` | `EU`          |

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use geotag_gazetteer_models::{EARTH_ID, GazetteerEntry, Level};

use crate::GazetteerError;

/// Code → id tables for each administrative level.
#[derive(Debug, Clone, Default)]
pub struct LevelTables {
    countries: CodeTable,
    admin1: CodeTable,
    admin2: CodeTable,
    continents: CodeTable,
}

#[derive(Debug, Clone, Default)]
struct CodeTable {
    by_code: BTreeMap<String, u64>,
    ids: BTreeSet<u64>,
}

impl CodeTable {
    fn from_rows(rows: impl IntoIterator<Item = (String, u64)>) -> Self {
        let mut table = Self::default();
        for (code, id) in rows {
            table.ids.insert(id);
            table.by_code.insert(code, id);
        }
        table
    }

    fn load(path: &Path) -> Result<Self, GazetteerError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let (Some(code), Some(id)) = (record.get(0), record.get(1)) else {
                return Err(GazetteerError::Parse {
                    file: path.display().to_string(),
                    message: format!("line {}: expected `code,id`", line + 1),
                });
            };
            let id = id.trim().parse::<u64>().map_err(|e| GazetteerError::Parse {
                file: path.display().to_string(),
                message: format!("line {}: invalid id {id:?}: {e}", line + 1),
            })?;
            rows.push((code.trim().to_string(), id));
        }

        Ok(Self::from_rows(rows))
    }

    fn len(&self) -> usize {
        self.by_code.len()
    }
}

/// Composite code keys of an entry's country, admin1 and admin2 parents.
///
/// Admin keys are qualified by the enclosing codes that are present, so an
/// entry in `FR` / `11` / `75` yields `["FR", "FR.11", "FR.11.75"]`.
#[must_use]
pub fn hierarchy_keys(entry: &GazetteerEntry) -> [Option<String>; 3] {
    let country = non_empty(entry.country_code.as_deref());
    let admin1 = non_empty(entry.admin1_code.as_deref());
    let admin2 = non_empty(entry.admin2_code.as_deref());

    let country_prefix = country.map(|c| format!("{c}.")).unwrap_or_default();
    let admin1_prefix = admin1.map(|a| format!("{a}.")).unwrap_or_default();

    [
        country.map(str::to_string),
        admin1.map(|a| format!("{country_prefix}{a}")),
        admin2.map(|a| format!("{country_prefix}{admin1_prefix}{a}")),
    ]
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl LevelTables {
    /// Builds tables from `(code, id)` rows for each level.
    #[must_use]
    pub fn new(
        countries: impl IntoIterator<Item = (String, u64)>,
        admin1: impl IntoIterator<Item = (String, u64)>,
        admin2: impl IntoIterator<Item = (String, u64)>,
        continents: impl IntoIterator<Item = (String, u64)>,
    ) -> Self {
        Self {
            countries: CodeTable::from_rows(countries),
            admin1: CodeTable::from_rows(admin1),
            admin2: CodeTable::from_rows(admin2),
            continents: CodeTable::from_rows(continents),
        }
    }

    /// Loads `country.csv`, `admin1.csv`, `admin2.csv` and `continents.csv`
    /// from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError`] if any file is missing or malformed.
    pub fn load_dir(dir: &Path) -> Result<Self, GazetteerError> {
        let tables = Self {
            countries: CodeTable::load(&dir.join("country.csv"))?,
            admin1: CodeTable::load(&dir.join("admin1.csv"))?,
            admin2: CodeTable::load(&dir.join("admin2.csv"))?,
            continents: CodeTable::load(&dir.join("continents.csv"))?,
        };

        log::info!(
            "Loaded level tables: {} countries, {} admin1, {} admin2, {} continents",
            tables.countries.len(),
            tables.admin1.len(),
            tables.admin2.len(),
            tables.continents.len()
        );

        Ok(tables)
    }

    /// Classifies a record id.
    ///
    /// Earth is recognised by its fixed id; otherwise country, admin1,
    /// admin2 and continent membership are checked in that order, and
    /// anything else is a leaf.
    #[must_use]
    pub fn classify(&self, id: u64) -> Level {
        if id == EARTH_ID {
            Level::Earth
        } else if self.countries.ids.contains(&id) {
            Level::Country
        } else if self.admin1.ids.contains(&id) {
            Level::Admin1
        } else if self.admin2.ids.contains(&id) {
            Level::Admin2
        } else if self.continents.ids.contains(&id) {
            Level::Continent
        } else {
            Level::Leaf
        }
    }

    /// Id of the country with the given ISO code.
    #[must_use]
    pub fn country_id(&self, key: &str) -> Option<u64> {
        self.countries.by_code.get(key).copied()
    }

    /// Id of the admin1 division with the given `CC.A1` key.
    #[must_use]
    pub fn admin1_id(&self, key: &str) -> Option<u64> {
        self.admin1.by_code.get(key).copied()
    }

    /// Id of the admin2 division with the given `CC.A1.A2` key.
    #[must_use]
    pub fn admin2_id(&self, key: &str) -> Option<u64> {
        self.admin2.by_code.get(key).copied()
    }

    /// Ids of the ancestors named by `entry`'s codes, keyed by level.
    ///
    /// The entry's own id is never returned, so a country record does not
    /// list itself as its own country.
    #[must_use]
    pub fn ancestor_ids(&self, entry: &GazetteerEntry) -> BTreeMap<Level, u64> {
        let [country, admin1, admin2] = hierarchy_keys(entry);
        let mut ids = BTreeMap::new();

        let resolved = [
            (Level::Country, country.and_then(|k| self.country_id(&k))),
            (Level::Admin1, admin1.and_then(|k| self.admin1_id(&k))),
            (Level::Admin2, admin2.and_then(|k| self.admin2_id(&k))),
        ];

        for (level, id) in resolved {
            if let Some(id) = id.filter(|id| *id != entry.id) {
                ids.insert(level, id);
            }
        }

        ids
    }
}

#[cfg(test)]
mod tests {
    use geotag_gazetteer_models::earth;

    use super::*;

    fn tables() -> LevelTables {
        LevelTables::new(
            [("FR".to_string(), 3_017_382), ("US".to_string(), 6_252_001)],
            [("FR.11".to_string(), 3_012_874)],
            [("FR.11.75".to_string(), 2_968_815)],
            [("EU".to_string(), 6_255_148)],
        )
    }

    fn located(id: u64, country: &str, admin1: &str, admin2: &str) -> GazetteerEntry {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        GazetteerEntry {
            id,
            name: "Somewhere".to_string(),
            country_code: opt(country),
            admin1_code: opt(admin1),
            admin2_code: opt(admin2),
            level: Level::Leaf,
            ..(*earth()).clone()
        }
    }

    #[test]
    fn classifies_each_level() {
        let tables = tables();
        assert_eq!(tables.classify(EARTH_ID), Level::Earth);
        assert_eq!(tables.classify(3_017_382), Level::Country);
        assert_eq!(tables.classify(3_012_874), Level::Admin1);
        assert_eq!(tables.classify(2_968_815), Level::Admin2);
        assert_eq!(tables.classify(6_255_148), Level::Continent);
        assert_eq!(tables.classify(2_988_507), Level::Leaf);
    }

    #[test]
    fn builds_qualified_keys() {
        let keys = hierarchy_keys(&located(1, "FR", "11", "75"));
        assert_eq!(
            keys,
            [
                Some("FR".to_string()),
                Some("FR.11".to_string()),
                Some("FR.11.75".to_string())
            ]
        );
    }

    #[test]
    fn keys_skip_missing_codes() {
        let keys = hierarchy_keys(&located(1, "", "11", " "));
        assert_eq!(keys, [None, Some("11".to_string()), None]);
    }

    #[test]
    fn resolves_ancestor_ids() {
        let ids = tables().ancestor_ids(&located(2_988_507, "FR", "11", "75"));
        assert_eq!(ids.get(&Level::Country), Some(&3_017_382));
        assert_eq!(ids.get(&Level::Admin1), Some(&3_012_874));
        assert_eq!(ids.get(&Level::Admin2), Some(&2_968_815));
    }

    #[test]
    fn ancestor_ids_exclude_self() {
        let france = located(3_017_382, "FR", "", "");
        assert!(tables().ancestor_ids(&france).is_empty());
    }

    #[test]
    fn unknown_codes_are_absent() {
        let ids = tables().ancestor_ids(&located(1, "ZZ", "99", ""));
        assert!(ids.is_empty());
    }
}
