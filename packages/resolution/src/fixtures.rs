//! A tiny in-memory gazetteer shared by the resolver tests.

use std::sync::Arc;

use geotag_gazetteer::{
    Gazetteer, GazetteerEntry, GazetteerError, Hierarchy, InMemoryGazetteer, Level, LevelTables,
};
use geotag_resolution_models::TaggedMention;

use crate::candidate::CandidateEntry;

pub const FRANCE: u64 = 3_017_382;
pub const PARIS_FR: u64 = 2_988_507;
pub const USA: u64 = 6_252_001;
pub const TEXAS: u64 = 4_736_286;
pub const LAMAR_COUNTY: u64 = 4_705_086;
pub const PARIS_TX: u64 = 4_717_560;
pub const GREECE: u64 = 390_903;
pub const ATTICA: u64 = 6_692_632;
pub const ATHENS_GR: u64 = 264_371;
pub const GEORGIA: u64 = 4_197_000;
pub const ATHENS_GA: u64 = 4_180_386;

#[allow(clippy::too_many_arguments)]
fn record(
    id: u64,
    name: &str,
    alternates: &str,
    codes: [&str; 3],
    population: u64,
    latitude: f64,
    longitude: f64,
    feature_code: &str,
) -> GazetteerEntry {
    let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
    GazetteerEntry {
        id,
        name: name.to_string(),
        alternate_names: alternates.to_string(),
        latitude,
        longitude,
        feature_class: if feature_code.starts_with("PPL") { "P" } else { "A" }.to_string(),
        feature_code: feature_code.to_string(),
        country_code: opt(codes[0]),
        admin1_code: opt(codes[1]),
        admin2_code: opt(codes[2]),
        admin3_code: None,
        admin4_code: None,
        population,
        level: Level::Leaf,
    }
}

fn tables() -> LevelTables {
    let rows = |rows: &[(&str, u64)]| {
        rows.iter()
            .map(|(code, id)| ((*code).to_string(), *id))
            .collect::<Vec<_>>()
    };
    LevelTables::new(
        rows(&[("FR", FRANCE), ("US", USA), ("GR", GREECE)]),
        rows(&[
            ("US.TX", TEXAS),
            ("US.GA", GEORGIA),
            ("GR.ESYE31", ATTICA),
        ]),
        rows(&[("US.TX.277", LAMAR_COUNTY)]),
        Vec::new(),
    )
}

/// France, the US and Greece with a few divisions, two Parises and two
/// Athenses. Paris, France knows only its country; Paris, Texas its
/// country and state.
pub fn gazetteer() -> InMemoryGazetteer {
    InMemoryGazetteer::from_entries(
        tables(),
        [
            record(FRANCE, "France", "Republique francaise", ["FR", "", ""], 64_768_389, 46.0, 2.0, "PCLI"),
            record(PARIS_FR, "Paris", "Paname", ["FR", "", ""], 2_138_551, 48.853_41, 2.348_8, "PPLC"),
            record(USA, "United States", "US,USA", ["US", "", ""], 310_232_863, 39.76, -98.5, "PCLI"),
            record(TEXAS, "Texas", "", ["US", "TX", ""], 22_875_689, 31.25, -99.25, "ADM1"),
            record(LAMAR_COUNTY, "Lamar County", "", ["US", "TX", "277"], 49_793, 33.66, -95.57, "ADM2"),
            record(PARIS_TX, "Paris", "", ["US", "TX", ""], 25_171, 33.660_94, -95.555_47, "PPLA2"),
            record(GREECE, "Greece", "Hellas", ["GR", "", ""], 11_000_000, 39.0, 22.0, "PCLI"),
            record(ATTICA, "Attica", "", ["GR", "ESYE31", ""], 3_828_434, 38.0, 23.7, "ADM1"),
            record(ATHENS_GR, "Athens", "Athina", ["GR", "ESYE31", ""], 664_046, 37.983_76, 23.727_84, "PPLC"),
            record(GEORGIA, "Georgia", "", ["US", "GA", ""], 9_919_945, 32.75, -83.5, "ADM1"),
            record(ATHENS_GA, "Athens", "", ["US", "GA", ""], 115_452, 33.960_95, -83.377_94, "PPLA2"),
        ],
    )
}

/// [`gazetteer`] behind the trait object the resolvers take.
pub fn shared() -> Arc<dyn Gazetteer> {
    Arc::new(gazetteer())
}

/// Looks up a fixture record, panicking when it is missing.
pub fn entry(gazetteer: &InMemoryGazetteer, id: u64) -> Arc<GazetteerEntry> {
    gazetteer
        .lookup_by_id(id)
        .unwrap()
        .unwrap_or_else(|| panic!("fixture {id} missing"))
}

/// A fixture record with its resolved ancestors.
pub fn candidate(id: u64) -> CandidateEntry {
    let gazetteer = gazetteer();
    let entry = entry(&gazetteer, id);
    let hierarchy = gazetteer.ancestor_hierarchy(&entry).unwrap();
    CandidateEntry::new(entry, hierarchy)
}

/// A location mention of `phrase` at token `index`, starting at `start`.
pub fn location(phrase: &str, index: usize, start: usize) -> TaggedMention {
    TaggedMention::location(phrase, index, start, start + phrase.len())
}

/// A gazetteer whose every lookup fails.
pub struct FailingGazetteer;

impl Gazetteer for FailingGazetteer {
    fn lookup_by_id(&self, _id: u64) -> Result<Option<Arc<GazetteerEntry>>, GazetteerError> {
        Err(GazetteerError::Unavailable("offline".to_string()))
    }

    fn lookup_by_phrase(&self, _phrase: &str) -> Result<Vec<Arc<GazetteerEntry>>, GazetteerError> {
        Err(GazetteerError::Unavailable("offline".to_string()))
    }

    fn ancestor_hierarchy(&self, _entry: &GazetteerEntry) -> Result<Hierarchy, GazetteerError> {
        Err(GazetteerError::Unavailable("offline".to_string()))
    }
}
