#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Tagged mention, toponym and resolver configuration types.
//!
//! A recogniser produces an ordered sequence of [`TaggedMention`]s for a
//! document; a resolver turns the location mentions among them into
//! [`Toponym`]s bound to gazetteer records.

pub mod config;

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use geotag_gazetteer_models::GazetteerEntry;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use config::{ContextBoundConfig, FusionConfig, ResolverConfig, ResolverKind};

/// Named-entity tag assigned by the recogniser.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum EntityTag {
    /// Place names.
    Location,
    /// People.
    Person,
    /// Organisations.
    Organization,
    /// Anything else, including untagged tokens (`O`).
    #[default]
    #[strum(to_string = "OTHER", serialize = "O")]
    #[serde(alias = "O")]
    Other,
}

/// A recognised span of document text.
///
/// Two mentions are equal when their phrases match case-insensitively and
/// their character offsets are identical. The token index is not part of
/// identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedMention {
    /// Surface text.
    pub phrase: String,
    /// Recognised entity tag.
    #[serde(default)]
    pub tag: EntityTag,
    /// Zero-based token index within the document.
    pub index: usize,
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
}

impl TaggedMention {
    /// Creates a mention.
    #[must_use]
    pub fn new(phrase: impl Into<String>, tag: EntityTag, index: usize, start: usize, end: usize) -> Self {
        Self {
            phrase: phrase.into(),
            tag,
            index,
            start,
            end,
        }
    }

    /// Creates a [`EntityTag::Location`] mention.
    #[must_use]
    pub fn location(phrase: impl Into<String>, index: usize, start: usize, end: usize) -> Self {
        Self::new(phrase, EntityTag::Location, index, start, end)
    }

    /// Lower-cased phrase, the key mentions are grouped by.
    #[must_use]
    pub fn key(&self) -> String {
        self.phrase.to_lowercase()
    }

    /// Whether this mention was tagged as a location.
    #[must_use]
    pub fn is_location(&self) -> bool {
        self.tag == EntityTag::Location
    }

    /// Token distance to another mention.
    #[must_use]
    pub const fn token_distance(&self, other: &Self) -> usize {
        self.index.abs_diff(other.index)
    }
}

impl PartialEq for TaggedMention {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
            && self.end == other.end
            && self.phrase.to_lowercase() == other.phrase.to_lowercase()
    }
}

impl Eq for TaggedMention {}

impl Hash for TaggedMention {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.phrase.to_lowercase().hash(state);
        self.start.hash(state);
        self.end.hash(state);
    }
}

impl Ord for TaggedMention {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then(self.end.cmp(&other.end))
            .then_with(|| self.phrase.to_lowercase().cmp(&other.phrase.to_lowercase()))
    }
}

impl PartialOrd for TaggedMention {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for TaggedMention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} {}[{}-{}]",
            self.phrase, self.tag, self.index, self.start, self.end
        )
    }
}

/// A location mention, optionally resolved to a gazetteer record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toponym {
    /// Surface text.
    pub phrase: String,
    /// Zero-based token index within the document.
    pub index: usize,
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
    /// Name of the resolved record, or the phrase when unresolved.
    pub name: String,
    /// Latitude (WGS84), if resolved.
    pub latitude: Option<f64>,
    /// Longitude (WGS84), if resolved.
    pub longitude: Option<f64>,
    /// `GeoNames` id of the resolved record.
    pub geoname_id: Option<u64>,
    /// `GeoNames` id of the enclosing country.
    pub country_id: Option<u64>,
    /// Name of the enclosing country.
    pub country: Option<String>,
    /// `GeoNames` id of the enclosing first-order division.
    pub admin1_id: Option<u64>,
    /// Name of the enclosing first-order division.
    pub admin1: Option<String>,
    /// `GeoNames` id of the enclosing second-order division.
    pub admin2_id: Option<u64>,
    /// `GeoNames` feature class.
    pub feature_class: Option<String>,
    /// `GeoNames` feature code.
    pub feature_code: Option<String>,
    /// Resolver confidence.
    #[serde(default)]
    pub score: f64,
}

impl Toponym {
    /// A mention with no gazetteer binding.
    #[must_use]
    pub fn unresolved(mention: &TaggedMention) -> Self {
        Self {
            phrase: mention.phrase.clone(),
            index: mention.index,
            start: mention.start,
            end: mention.end,
            name: mention.phrase.clone(),
            latitude: None,
            longitude: None,
            geoname_id: None,
            country_id: None,
            country: None,
            admin1_id: None,
            admin1: None,
            admin2_id: None,
            feature_class: None,
            feature_code: None,
            score: 0.0,
        }
    }

    /// A mention bound to `entry` with the given confidence.
    #[must_use]
    pub fn resolved(mention: &TaggedMention, entry: &GazetteerEntry, score: f64) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            name: entry.name.clone(),
            latitude: Some(entry.latitude),
            longitude: Some(entry.longitude),
            geoname_id: Some(entry.id),
            feature_class: non_empty(&entry.feature_class),
            feature_code: non_empty(&entry.feature_code),
            score,
            ..Self::unresolved(mention)
        }
    }

    /// Attaches the enclosing administrative divisions.
    #[must_use]
    pub fn with_ancestors(
        mut self,
        country: Option<&GazetteerEntry>,
        admin1: Option<&GazetteerEntry>,
        admin2: Option<&GazetteerEntry>,
    ) -> Self {
        self.country_id = country.map(|c| c.id);
        self.country = country.map(|c| c.name.clone());
        self.admin1_id = admin1.map(|a| a.id);
        self.admin1 = admin1.map(|a| a.name.clone());
        self.admin2_id = admin2.map(|a| a.id);
        self
    }

    /// The location mention this toponym was resolved from.
    #[must_use]
    pub fn mention(&self) -> TaggedMention {
        TaggedMention::location(self.phrase.clone(), self.index, self.start, self.end)
    }
}

/// Same mention, same coordinates.
impl PartialEq for Toponym {
    fn eq(&self, other: &Self) -> bool {
        self.mention() == other.mention()
            && self.latitude == other.latitude
            && self.longitude == other.longitude
    }
}

impl std::fmt::Display for Toponym {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => write!(f, "{} ({lat:.6},{lng:.6})", self.phrase),
            _ => write!(f, "{} (unresolved)", self.phrase),
        }
    }
}

/// A document to resolve: its text and the recogniser's output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Caller-assigned identifier, used only for logging.
    #[serde(default)]
    pub id: String,
    /// Full document text.
    #[serde(default)]
    pub text: String,
    /// Tagged mentions in document order.
    #[serde(default)]
    pub mentions: Vec<TaggedMention>,
}
