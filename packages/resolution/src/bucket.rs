//! Per-document candidate cache.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use geotag_gazetteer::{Gazetteer, GazetteerEntry};
use geotag_resolution_models::{EntityTag, TaggedMention};

use crate::candidate::CandidateEntry;

/// Everything a resolver needs to know about one document: its mentions,
/// the candidate interpretations of each distinct location phrase, and an
/// index of where each phrase occurs.
///
/// Candidates are loaded exactly once per distinct lower-cased phrase, when
/// the bucket is built, and never recomputed afterwards.
#[derive(Debug, Clone)]
pub struct ArticleBucket {
    mentions: Vec<TaggedMention>,
    recognized: Vec<TaggedMention>,
    candidates: BTreeMap<String, Vec<CandidateEntry>>,
    surface: BTreeMap<(EntityTag, String), BTreeSet<TaggedMention>>,
}

impl ArticleBucket {
    /// Builds a bucket, calling `load` once for the first mention of every
    /// distinct location phrase.
    pub fn new(
        mentions: Vec<TaggedMention>,
        mut load: impl FnMut(&TaggedMention) -> Vec<CandidateEntry>,
    ) -> Self {
        let recognized: Vec<TaggedMention> = mentions
            .iter()
            .filter(|m| m.is_location())
            .cloned()
            .collect();

        let mut surface: BTreeMap<(EntityTag, String), BTreeSet<TaggedMention>> = BTreeMap::new();
        for mention in &mentions {
            surface
                .entry((mention.tag, mention.key()))
                .or_default()
                .insert(mention.clone());
        }

        let mut candidates = BTreeMap::new();
        for mention in &recognized {
            let key = mention.key();
            if !candidates.contains_key(&key) {
                let loaded = load(mention);
                log::debug!("{:?}: {} candidates", mention.phrase, loaded.len());
                candidates.insert(key, loaded);
            }
        }

        Self {
            mentions,
            recognized,
            candidates,
            surface,
        }
    }

    /// Builds a bucket whose candidates come from `gazetteer`.
    ///
    /// With a `limit`, only the `limit` most populated records of each
    /// phrase are kept. A failing lookup is logged and treated as a phrase
    /// with no candidates.
    pub fn from_gazetteer(
        gazetteer: &dyn Gazetteer,
        mentions: Vec<TaggedMention>,
        limit: Option<usize>,
    ) -> Self {
        Self::new(mentions, |mention| {
            load_candidates(gazetteer, &mention.phrase, limit)
        })
    }

    /// Every mention of the document, in order.
    #[must_use]
    pub fn mentions(&self) -> &[TaggedMention] {
        &self.mentions
    }

    /// The location mentions, in order.
    #[must_use]
    pub fn recognized(&self) -> &[TaggedMention] {
        &self.recognized
    }

    /// The candidates of a phrase (case-insensitive). Empty when the phrase
    /// has none or was never seen.
    #[must_use]
    pub fn candidates(&self, phrase: &str) -> &[CandidateEntry] {
        self.candidates
            .get(&phrase.to_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    /// Candidate lists keyed by lower-cased phrase.
    #[must_use]
    pub const fn candidate_map(&self) -> &BTreeMap<String, Vec<CandidateEntry>> {
        &self.candidates
    }

    /// Location mentions whose phrase equals `phrase`, ignoring case.
    pub fn surface_mentions<'a>(
        &'a self,
        phrase: &str,
    ) -> impl Iterator<Item = &'a TaggedMention> + use<'a> {
        self.surface
            .get(&(EntityTag::Location, phrase.to_lowercase()))
            .into_iter()
            .flatten()
    }

    /// Location mentions naming `entry` by its canonical or any alternate
    /// name.
    #[must_use]
    pub fn surface_mentions_of(&self, entry: &GazetteerEntry) -> BTreeSet<TaggedMention> {
        entry
            .all_names()
            .flat_map(|name| self.surface_mentions(name))
            .cloned()
            .collect()
    }
}

fn load_candidates(
    gazetteer: &dyn Gazetteer,
    phrase: &str,
    limit: Option<usize>,
) -> Vec<CandidateEntry> {
    let mut entries = match gazetteer.lookup_by_phrase(phrase) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Candidate lookup for {phrase:?} failed: {e}");
            return Vec::new();
        }
    };

    // stable, so equally populated records keep the gazetteer's order
    entries.sort_by_key(|entry| Reverse(entry.population));
    if let Some(limit) = limit {
        entries.truncate(limit);
    }

    entries
        .into_iter()
        .map(|entry| {
            let hierarchy = gazetteer.ancestor_hierarchy(&entry).unwrap_or_else(|e| {
                log::warn!("Ancestor lookup for {entry} failed: {e}");
                geotag_gazetteer::Hierarchy::new()
            });
            CandidateEntry::new(entry, hierarchy)
        })
        .collect()
}
