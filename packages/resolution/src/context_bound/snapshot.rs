use std::collections::{BTreeMap, BTreeSet};

use geotag_gazetteer::{GazetteerEntry, Level};
use geotag_resolution_models::{TaggedMention, Toponym};

use crate::bucket::ArticleBucket;

/// One iteration's view of a document: the shared bucket plus that
/// iteration's assignment and the indirect mentions it implies.
///
/// Snapshots only borrow the bucket, so every iteration reuses the same
/// candidate lists and surface index.
#[derive(Debug)]
pub struct Snapshot<'a> {
    bucket: &'a ArticleBucket,
    assignments: BTreeMap<TaggedMention, Toponym>,
    /// (level, lower-cased name) -> mentions resolved beneath that record
    indirect: BTreeMap<(Level, String), BTreeSet<TaggedMention>>,
}

impl<'a> Snapshot<'a> {
    /// Indexes `assignments`: each assigned mention counts as a mention of
    /// every ancestor of its record, and of the record itself when that is
    /// an administrative division.
    #[must_use]
    pub fn new(bucket: &'a ArticleBucket, assignments: BTreeMap<TaggedMention, Toponym>) -> Self {
        let mut indirect: BTreeMap<(Level, String), BTreeSet<TaggedMention>> = BTreeMap::new();
        let mut add = |entry: &GazetteerEntry, mention: &TaggedMention| {
            for name in entry.all_names() {
                indirect
                    .entry((entry.level, name.to_lowercase()))
                    .or_default()
                    .insert(mention.clone());
            }
        };

        for (mention, toponym) in &assignments {
            let Some(candidate) = bucket
                .candidates(&mention.phrase)
                .iter()
                .find(|c| Some(c.id()) == toponym.geoname_id)
            else {
                continue;
            };

            if candidate.entry().level.is_hierarchy() {
                add(candidate.entry(), mention);
            }
            for ancestor in candidate.hierarchy().values() {
                add(ancestor, mention);
            }
        }

        Self {
            bucket,
            assignments,
            indirect,
        }
    }

    #[must_use]
    pub const fn bucket(&self) -> &'a ArticleBucket {
        self.bucket
    }

    /// The record assigned to `mention` in this iteration.
    #[must_use]
    pub fn assignment(&self, mention: &TaggedMention) -> Option<&Toponym> {
        self.assignments.get(mention)
    }

    /// Mentions of `entry` by name plus mentions resolved beneath it.
    #[must_use]
    pub fn surface_and_indirect(&self, entry: &GazetteerEntry) -> BTreeSet<TaggedMention> {
        let mut mentions = self.bucket.surface_mentions_of(entry);
        for name in entry.all_names() {
            if let Some(indirect) = self.indirect.get(&(entry.level, name.to_lowercase())) {
                mentions.extend(indirect.iter().cloned());
            }
        }
        mentions
    }
}
