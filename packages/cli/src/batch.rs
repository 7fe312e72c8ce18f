//! Document resolution and JSON lines batches.

use std::io::{BufRead, Write};

use geotag_cli_utils::DocumentProgress;
use geotag_resolution::Resolver;
use geotag_resolution_models::{Document, Toponym};
use serde::Serialize;
use thiserror::Error;

/// Errors that abort a batch.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A result could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One document's resolver output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDocument {
    pub id: String,
    pub resolver: &'static str,
    pub toponyms: Vec<Toponym>,
}

/// Counts for a finished batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub documents: usize,
    pub toponyms: usize,
    /// Input lines that were not valid documents.
    pub skipped: usize,
}

pub fn resolve_document(resolver: &dyn Resolver, document: &Document) -> ResolvedDocument {
    let toponyms = resolver.resolve(&document.text, &document.mentions);
    log::debug!(
        "{}: resolved {} of {} mentions",
        document.id,
        toponyms.len(),
        document.mentions.len()
    );
    ResolvedDocument {
        id: document.id.clone(),
        resolver: resolver.name(),
        toponyms,
    }
}

/// Number of non-blank lines in `input`, the most documents a batch over
/// it can resolve.
///
/// # Errors
///
/// Returns [`BatchError::Io`] if reading fails.
pub fn count_documents(input: impl BufRead) -> Result<u64, BatchError> {
    let mut count = 0;
    for line in input.lines() {
        if !line?.trim().is_empty() {
            count += 1;
        }
    }
    Ok(count)
}

/// Resolves one JSON document per input line, writing one JSON result per
/// output line. Blank lines are ignored and malformed lines are skipped
/// with a warning.
///
/// # Errors
///
/// Returns [`BatchError`] if reading, writing or serializing fails.
pub fn run_batch(
    resolver: &dyn Resolver,
    input: impl BufRead,
    mut output: impl Write,
    progress: Option<&DocumentProgress>,
) -> Result<BatchSummary, BatchError> {
    let mut summary = BatchSummary::default();

    for (number, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let document: Document = match serde_json::from_str(&line) {
            Ok(document) => document,
            Err(e) => {
                log::warn!("Skipping line {}: {e}", number + 1);
                summary.skipped += 1;
                continue;
            }
        };

        let resolved = resolve_document(resolver, &document);
        summary.documents += 1;
        summary.toponyms += resolved.toponyms.len();

        serde_json::to_writer(&mut output, &resolved)?;
        output.write_all(b"\n")?;

        if let Some(progress) = progress {
            progress.inc();
        }
    }

    output.flush()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use geotag_gazetteer::{GazetteerEntry, InMemoryGazetteer, Level, LevelTables};
    use geotag_resolution::SetCoverResolver;
    use geotag_resolution_models::TaggedMention;

    use super::*;

    /// Leaves every mention unresolved.
    struct Unresolving;

    impl Resolver for Unresolving {
        fn name(&self) -> &'static str {
            "unresolving"
        }

        fn resolve(&self, _text: &str, mentions: &[TaggedMention]) -> Vec<Toponym> {
            mentions.iter().map(Toponym::unresolved).collect()
        }
    }

    fn run(resolver: &dyn Resolver, input: &str) -> (BatchSummary, Vec<serde_json::Value>) {
        let mut output = Vec::new();
        let summary = run_batch(resolver, input.as_bytes(), &mut output, None).unwrap();
        let lines = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        (summary, lines)
    }

    #[test]
    fn one_result_line_per_document() {
        let input = concat!(
            r#"{"id": "a", "text": "Paris", "mentions": [{"phrase": "Paris", "tag": "LOCATION", "index": 0, "start": 0, "end": 5}]}"#,
            "\n\n",
            r#"{"id": "b", "mentions": []}"#,
            "\n",
        );
        let (summary, lines) = run(&Unresolving, input);
        assert_eq!(
            summary,
            BatchSummary {
                documents: 2,
                toponyms: 1,
                skipped: 0
            }
        );
        assert_eq!(lines[0]["id"], "a");
        assert_eq!(lines[0]["resolver"], "unresolving");
        assert_eq!(lines[0]["toponyms"][0]["phrase"], "Paris");
        assert_eq!(lines[1]["toponyms"], serde_json::json!([]));
    }

    #[test]
    fn counts_non_blank_lines() {
        let input = "{\"id\": \"a\"}\n\n   \nnot json\n{\"id\": \"b\"}";
        assert_eq!(count_documents(input.as_bytes()).unwrap(), 3);
        assert_eq!(count_documents(&b""[..]).unwrap(), 0);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let input = "not json\n{\"id\": \"ok\"}\n";
        let (summary, lines) = run(&Unresolving, input);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.documents, 1);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn resolves_against_a_gazetteer() {
        let tables = LevelTables::new(
            vec![("US".to_string(), 6_252_001)],
            vec![("US.TX".to_string(), 4_736_286)],
            Vec::new(),
            Vec::new(),
        );
        let texas = GazetteerEntry {
            id: 4_736_286,
            name: "Texas".to_string(),
            alternate_names: String::new(),
            latitude: 31.25,
            longitude: -99.25,
            feature_class: "A".to_string(),
            feature_code: "ADM1".to_string(),
            country_code: Some("US".to_string()),
            admin1_code: Some("TX".to_string()),
            admin2_code: None,
            admin3_code: None,
            admin4_code: None,
            population: 22_875_689,
            level: Level::Leaf,
        };
        let gazetteer = Arc::new(InMemoryGazetteer::from_entries(tables, [texas]));
        let resolver = SetCoverResolver::new(gazetteer, None);

        let document = Document {
            id: "tx".to_string(),
            text: "Texas".to_string(),
            mentions: vec![TaggedMention::location("Texas", 0, 0, 5)],
        };
        let resolved = resolve_document(&resolver, &document);
        assert_eq!(resolved.resolver, "set_cover");
        assert_eq!(resolved.toponyms[0].geoname_id, Some(4_736_286));
        // a division is its own admin1
        assert_eq!(resolved.toponyms[0].admin1_id, Some(4_736_286));
    }
}
