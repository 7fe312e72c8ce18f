use std::collections::BTreeMap;

use geotag_gazetteer::Level;
use geotag_resolution_models::{TaggedMention, Toponym};

use crate::bucket::ArticleBucket;

use super::models::distance;
use super::select::Selection;

/// Seeds the context-bound loop from raw co-occurrence.
///
/// A candidate's confidence sums, over every division and continent in its
/// chain, the closeness of each mention of that record to the nearest
/// mention of the phrase itself. Below country level a mention with the
/// same text as the phrase is not evidence. Phrases with a single candidate
/// take it with confidence 1.
#[must_use]
pub fn disambiguate(bucket: &ArticleBucket) -> BTreeMap<TaggedMention, Toponym> {
    let mut assignments = BTreeMap::new();

    for (phrase, candidates) in bucket.candidate_map() {
        let phrase_mentions: Vec<&TaggedMention> = bucket.surface_mentions(phrase).collect();

        let (score, winner) = if let [only] = candidates.as_slice() {
            (1.0, only)
        } else {
            let mut selection = Selection::default();
            for candidate in candidates {
                let mut confidence = 0.0;
                for record in candidate.root_to_leaf() {
                    if !record.level.is_hierarchy() && record.level != Level::Continent {
                        continue;
                    }
                    let broad = matches!(record.level, Level::Country | Level::Continent);
                    for mc in bucket.surface_mentions_of(&record) {
                        confidence += phrase_mentions
                            .iter()
                            .filter(|ms| ***ms != mc)
                            .filter(|ms| broad || ms.key() != mc.key())
                            .map(|ms| 1.0 / distance(&mc, ms))
                            .fold(0.0, f64::max);
                    }
                }
                selection.offer(confidence, candidate);
            }
            match selection.winner() {
                Some(found) => found,
                None => continue,
            }
        };

        for mention in phrase_mentions {
            assignments.insert(mention.clone(), winner.toponym(mention, score));
        }
    }

    log::debug!("Preliminary pass assigned {} mentions", assignments.len());

    assignments
}
