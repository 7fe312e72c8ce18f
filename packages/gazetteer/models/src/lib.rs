#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Gazetteer record and administrative hierarchy level types.
//!
//! These types describe places as stored in a `GeoNames`-style gazetteer:
//! leaf settlements, second/first-order administrative divisions,
//! countries, continents and the earth root. They carry no lookup logic;
//! see `geotag_gazetteer` for the store itself.

use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// `GeoNames` id of the earth root record.
pub const EARTH_ID: u64 = 6_295_630;

/// Administrative granularity of a gazetteer record.
///
/// Ordered from the most specific ([`Level::Leaf`]) to the root
/// ([`Level::Earth`]).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Level {
    /// Populated places and any other non-administrative feature.
    Leaf,
    /// Second-order administrative division (county, district).
    Admin2,
    /// First-order administrative division (state, province).
    Admin1,
    /// Country.
    Country,
    /// Continent.
    Continent,
    /// The earth root.
    Earth,
}

impl Level {
    /// All levels, leaf first.
    pub const ALL: &[Self] = &[
        Self::Leaf,
        Self::Admin2,
        Self::Admin1,
        Self::Country,
        Self::Continent,
        Self::Earth,
    ];

    /// Levels the context-bound probability models iterate over, in
    /// evaluation order.
    pub const HIERARCHY: &[Self] = &[Self::Country, Self::Admin1, Self::Admin2];

    /// The next coarser level, or `None` at [`Level::Earth`].
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Leaf => Some(Self::Admin2),
            Self::Admin2 => Some(Self::Admin1),
            Self::Admin1 => Some(Self::Country),
            Self::Country => Some(Self::Continent),
            Self::Continent => Some(Self::Earth),
            Self::Earth => None,
        }
    }

    /// The next finer level, or `None` at [`Level::Leaf`].
    #[must_use]
    pub const fn child(self) -> Option<Self> {
        match self {
            Self::Leaf => None,
            Self::Admin2 => Some(Self::Leaf),
            Self::Admin1 => Some(Self::Admin2),
            Self::Country => Some(Self::Admin1),
            Self::Continent => Some(Self::Country),
            Self::Earth => Some(Self::Continent),
        }
    }

    /// Whether this is one of [`Level::HIERARCHY`].
    #[must_use]
    pub const fn is_hierarchy(self) -> bool {
        matches!(self, Self::Admin2 | Self::Admin1 | Self::Country)
    }
}

/// A single gazetteer record.
///
/// Identity is the `GeoNames` id: two entries with the same id are equal
/// regardless of any other field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GazetteerEntry {
    /// `GeoNames` id.
    pub id: u64,
    /// Canonical name (e.g. "Paris").
    pub name: String,
    /// Comma-separated alternate names, possibly empty.
    #[serde(default)]
    pub alternate_names: String,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// `GeoNames` feature class (e.g. "P", "A").
    #[serde(default)]
    pub feature_class: String,
    /// `GeoNames` feature code (e.g. "PPLC", "ADM1").
    #[serde(default)]
    pub feature_code: String,
    /// ISO-3166 two-letter country code.
    #[serde(default)]
    pub country_code: Option<String>,
    /// First-order administrative code within the country.
    #[serde(default)]
    pub admin1_code: Option<String>,
    /// Second-order administrative code within the admin1 division.
    #[serde(default)]
    pub admin2_code: Option<String>,
    /// Third-order administrative code.
    #[serde(default)]
    pub admin3_code: Option<String>,
    /// Fourth-order administrative code.
    #[serde(default)]
    pub admin4_code: Option<String>,
    /// Population, 0 when unknown.
    #[serde(default)]
    pub population: u64,
    /// Hierarchy level, classified by the gazetteer when the record is
    /// loaded. Not part of the source data.
    #[serde(default = "default_level")]
    pub level: Level,
}

const fn default_level() -> Level {
    Level::Leaf
}

static EARTH: LazyLock<Arc<GazetteerEntry>> = LazyLock::new(|| {
    Arc::new(GazetteerEntry {
        id: EARTH_ID,
        name: "Earth".to_string(),
        alternate_names: String::new(),
        latitude: 0.0,
        longitude: 0.0,
        feature_class: "L".to_string(),
        feature_code: "AREA".to_string(),
        country_code: None,
        admin1_code: None,
        admin2_code: None,
        admin3_code: None,
        admin4_code: None,
        population: 0,
        level: Level::Earth,
    })
});

/// The shared earth root record.
#[must_use]
pub fn earth() -> Arc<GazetteerEntry> {
    Arc::clone(&EARTH)
}

impl GazetteerEntry {
    /// Iterates the non-empty, trimmed alternate names.
    pub fn alternate_names(&self) -> impl Iterator<Item = &str> {
        self.alternate_names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// The canonical name followed by every alternate name.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.alternate_names())
    }
}

impl PartialEq for GazetteerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GazetteerEntry {}

impl Hash for GazetteerEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for GazetteerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn entry(id: u64, name: &str, alternates: &str) -> GazetteerEntry {
        GazetteerEntry {
            id,
            name: name.to_string(),
            alternate_names: alternates.to_string(),
            ..(*earth()).clone()
        }
    }

    #[test]
    fn level_order_runs_leaf_to_earth() {
        for window in Level::ALL.windows(2) {
            assert!(window[0] < window[1], "{} !< {}", window[0], window[1]);
        }
    }

    #[test]
    fn parent_and_child_are_inverse() {
        for level in Level::ALL {
            if let Some(parent) = level.parent() {
                assert_eq!(parent.child(), Some(*level));
            }
        }
        assert_eq!(Level::Earth.parent(), None);
        assert_eq!(Level::Leaf.child(), None);
    }

    #[test]
    fn hierarchy_levels() {
        assert!(Level::Country.is_hierarchy());
        assert!(Level::Admin1.is_hierarchy());
        assert!(Level::Admin2.is_hierarchy());
        assert!(!Level::Leaf.is_hierarchy());
        assert!(!Level::Continent.is_hierarchy());
        assert!(Level::HIERARCHY.iter().all(|l| l.is_hierarchy()));
    }

    #[test]
    fn level_parses_case_insensitively() {
        assert_eq!(Level::from_str("admin1").ok(), Some(Level::Admin1));
        assert_eq!(Level::from_str("COUNTRY").ok(), Some(Level::Country));
        assert_eq!(Level::Continent.to_string(), "CONTINENT");
    }

    #[test]
    fn equality_is_by_id_only() {
        assert_eq!(entry(1, "Paris", ""), entry(1, "Lutetia", "Paname"));
        assert_ne!(entry(1, "Paris", ""), entry(2, "Paris", ""));
    }

    #[test]
    fn alternate_names_skip_empty_segments() {
        let e = entry(1, "Paris", "Paname, ,Lutetia,,");
        let names: Vec<&str> = e.all_names().collect();
        assert_eq!(names, vec!["Paris", "Paname", "Lutetia"]);
    }

    #[test]
    fn earth_is_a_shared_singleton() {
        let a = earth();
        let b = earth();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.level, Level::Earth);
        assert_eq!(a.id, EARTH_ID);
    }
}
