//! `GeoNames` dump parsing.
//!
//! Reads the tab-separated `allCountries.txt` / `<CC>.txt` export format.
//! Columns used:
//!
//! | #  | Column            |
//! |----|-------------------|
//! | 0  | geonameid         |
//! | 1  | name              |
//! | 3  | alternatenames    |
//! | 4  | latitude          |
//! | 5  | longitude         |
//! | 6  | feature class     |
//! | 7  | feature code      |
//! | 8  | country code      |
//! | 10 | admin1 code       |
//! | 11 | admin2 code       |
//! | 12 | admin3 code       |
//! | 13 | admin4 code       |
//! | 14 | population        |
//!
//! Rows that cannot be parsed are skipped with a warning.

use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use geotag_gazetteer_models::{GazetteerEntry, Level};

use crate::GazetteerError;

const MIN_COLUMNS: usize = 15;

/// Reads every parsable record from a dump file.
///
/// Levels are left as [`Level::Leaf`]; the gazetteer classifies them on
/// insertion.
///
/// # Errors
///
/// Returns [`GazetteerError`] if the file cannot be opened or read.
pub fn read_dump(path: &Path) -> Result<Vec<GazetteerEntry>, GazetteerError> {
    let file = std::fs::File::open(path)?;
    let entries = read_dump_from(file)?;
    log::info!(
        "Read {} gazetteer records from {}",
        entries.len(),
        path.display()
    );
    Ok(entries)
}

/// Reads every parsable record from a dump stream.
///
/// # Errors
///
/// Returns [`GazetteerError`] if the stream cannot be read.
pub fn read_dump_from<R: Read>(reader: R) -> Result<Vec<GazetteerEntry>, GazetteerError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut entries = Vec::new();
    let mut skipped = 0_u64;

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        match parse_record(&record) {
            Ok(entry) => entries.push(entry),
            Err(message) => {
                skipped += 1;
                log::warn!("Skipping gazetteer line {}: {message}", line + 1);
            }
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} malformed gazetteer lines");
    }

    Ok(entries)
}

fn parse_record(record: &StringRecord) -> Result<GazetteerEntry, String> {
    if record.len() < MIN_COLUMNS {
        return Err(format!(
            "expected at least {MIN_COLUMNS} columns, found {}",
            record.len()
        ));
    }

    let field = |i: usize| record.get(i).unwrap_or("").trim();
    let optional = |i: usize| Some(field(i)).filter(|v| !v.is_empty()).map(str::to_string);

    let id = field(0)
        .parse::<u64>()
        .map_err(|e| format!("invalid geonameid {:?}: {e}", field(0)))?;
    let latitude = field(4)
        .parse::<f64>()
        .map_err(|e| format!("invalid latitude {:?}: {e}", field(4)))?;
    let longitude = field(5)
        .parse::<f64>()
        .map_err(|e| format!("invalid longitude {:?}: {e}", field(5)))?;
    let population = if field(14).is_empty() {
        0
    } else {
        field(14)
            .parse::<u64>()
            .map_err(|e| format!("invalid population {:?}: {e}", field(14)))?
    };

    Ok(GazetteerEntry {
        id,
        name: field(1).to_string(),
        alternate_names: field(3).to_string(),
        latitude,
        longitude,
        feature_class: field(6).to_string(),
        feature_code: field(7).to_string(),
        country_code: optional(8),
        admin1_code: optional(10),
        admin2_code: optional(11),
        admin3_code: optional(12),
        admin4_code: optional(13),
        population,
        level: Level::Leaf,
    })
}
