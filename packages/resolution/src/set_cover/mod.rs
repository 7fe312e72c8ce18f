//! Spatial-hierarchy set cover.
//!
//! Candidates of every distinct phrase are grouped into [`ToponymSet`]s
//! keyed by a shared pivot ancestor. A greedy weighted set cover then picks
//! the sets that explain the most still-unresolved phrases, preferring more
//! populated sets on ties, and within a chosen set the most populated
//! record tagged with each phrase.

mod toponym_set;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use geotag_gazetteer::{Gazetteer, GazetteerEntry};
use geotag_resolution_models::{TaggedMention, Toponym};

pub use toponym_set::ToponymSet;

use crate::Resolver;
use crate::bucket::ArticleBucket;

/// Confidence given to every set-cover choice.
const SCORE: f64 = 1.0;

/// Resolves phrases by greedy weighted set cover over pivot sets.
pub struct SetCoverResolver {
    gazetteer: Arc<dyn Gazetteer>,
    candidate_limit: Option<usize>,
}

impl SetCoverResolver {
    #[must_use]
    pub fn new(gazetteer: Arc<dyn Gazetteer>, candidate_limit: Option<usize>) -> Self {
        Self {
            gazetteer,
            candidate_limit,
        }
    }
}

impl Resolver for SetCoverResolver {
    fn name(&self) -> &'static str {
        "set_cover"
    }

    fn resolve(&self, _text: &str, mentions: &[TaggedMention]) -> Vec<Toponym> {
        let bucket = ArticleBucket::from_gazetteer(
            self.gazetteer.as_ref(),
            mentions.to_vec(),
            self.candidate_limit,
        );
        extract(&bucket)
    }
}

/// Pivot sets in creation order, indexed by pivot id.
#[derive(Debug, Default)]
struct PivotSets {
    sets: Vec<ToponymSet>,
    by_pivot: BTreeMap<u64, usize>,
}

impl PivotSets {
    fn get(&self, pivot_id: u64) -> Option<&ToponymSet> {
        self.by_pivot.get(&pivot_id).map(|i| &self.sets[*i])
    }

    fn get_mut(&mut self, pivot_id: u64) -> Option<&mut ToponymSet> {
        self.by_pivot.get(&pivot_id).map(|i| &mut self.sets[*i])
    }

    /// Stores `set` under its pivot id, replacing any set already keyed
    /// there in place.
    fn insert(&mut self, set: ToponymSet) {
        let key = set.pivot_entry().id;
        match self.by_pivot.get(&key) {
            Some(i) => self.sets[*i] = set,
            None => {
                self.by_pivot.insert(key, self.sets.len());
                self.sets.push(set);
            }
        }
    }

    fn len(&self) -> usize {
        self.sets.len()
    }
}

/// Builds the pivot sets for every distinct recognised phrase, in first
/// occurrence order. Returns the distinct phrases alongside.
fn build_sets(bucket: &ArticleBucket) -> (Vec<String>, PivotSets) {
    let mut universe: Vec<String> = Vec::new();
    let mut claimed: BTreeSet<u64> = BTreeSet::new();
    let mut sets = PivotSets::default();

    for mention in bucket.recognized() {
        let phrase = mention.key();
        if universe.contains(&phrase) {
            continue;
        }
        universe.push(phrase.clone());

        let before = sets.len();
        let candidates = bucket.candidates(&phrase);

        for candidate in candidates {
            if !claimed.insert(candidate.id()) {
                continue;
            }

            let pivot = candidate.nearest_parent();
            if let Some(existing) = sets.get_mut(pivot.id) {
                existing.add_child(&phrase, candidate);
            } else {
                let mut set = ToponymSet::new(&phrase, candidate);
                let inherited = set
                    .pivot_parent_entry()
                    .and_then(|parent| sets.get(parent.id))
                    .and_then(|parent_set| parent_set.phrases_of(set.pivot_entry().id))
                    .cloned();
                if let Some(inherited) = inherited {
                    set.tag_pivot(inherited);
                }
                sets.insert(set);
            }

            // the candidate is itself the pivot of an earlier set
            if let Some(own) = sets.get_mut(candidate.id()) {
                own.tag_pivot([phrase.clone()]);
            }
        }

        log::debug!(
            "{phrase:?} with {} candidates added {} sets, {} total",
            candidates.len(),
            sets.len() - before,
            sets.len()
        );
    }

    (universe, sets)
}

/// Greedily covers `universe`, returning the record chosen for each
/// covered phrase.
#[allow(clippy::cast_precision_loss)]
fn cover(universe: &[String], sets: &PivotSets) -> BTreeMap<String, Arc<GazetteerEntry>> {
    let mut found: BTreeMap<String, Arc<GazetteerEntry>> = BTreeMap::new();

    while found.len() < universe.len() {
        let mut best: Option<(f64, u64, &ToponymSet)> = None;

        for set in &sets.sets {
            let phrases = set.phrases();
            let contradicts = found
                .iter()
                .any(|(phrase, entry)| phrases.contains(phrase) && !set.contains(entry.id));
            if contradicts {
                continue;
            }

            let uncovered = phrases.iter().filter(|p| !found.contains_key(*p)).count();
            if uncovered == 0 {
                continue;
            }

            let effectiveness = set.cost() / uncovered as f64;
            let population = set.population();
            let better = best.is_none_or(|(best_effectiveness, best_population, _)| {
                effectiveness < best_effectiveness
                    || ((effectiveness - best_effectiveness).abs() < f64::EPSILON
                        && population > best_population)
            });
            if better {
                best = Some((effectiveness, population, set));
            }
        }

        let Some((_, _, chosen)) = best else {
            log::debug!(
                "No eligible set left, {} of {} phrases unresolved",
                universe.len() - found.len(),
                universe.len()
            );
            break;
        };

        for phrase in chosen.phrases() {
            if found.contains_key(&phrase) {
                continue;
            }
            if let Some(entry) = chosen.pick_populated(&phrase) {
                found.insert(phrase, Arc::clone(entry));
            }
        }
    }

    found
}

/// Runs set cover over a prepared bucket. Every surface mention of a
/// covered phrase gets that phrase's record.
#[must_use]
pub fn extract(bucket: &ArticleBucket) -> Vec<Toponym> {
    let (universe, sets) = build_sets(bucket);
    let found = cover(&universe, &sets);

    let mut toponyms: Vec<Toponym> = found
        .iter()
        .flat_map(|(phrase, entry)| {
            let candidate = bucket.candidates(phrase).iter().find(|c| c.id() == entry.id);
            bucket.surface_mentions(phrase).map(move |mention| match candidate {
                Some(candidate) => candidate.toponym(mention, SCORE),
                None => Toponym::resolved(mention, entry, SCORE),
            })
        })
        .collect();
    toponyms.sort_by_key(|t| (t.start, t.end));

    log::debug!(
        "Set cover resolved {} of {} phrases with {} sets",
        found.len(),
        universe.len(),
        sets.len()
    );

    toponyms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn resolve(mentions: &[TaggedMention]) -> Vec<Toponym> {
        SetCoverResolver::new(fixtures::shared(), None).resolve("", mentions)
    }

    fn ids(toponyms: &[Toponym]) -> Vec<Option<u64>> {
        toponyms.iter().map(|t| t.geoname_id).collect()
    }

    #[test]
    fn paris_follows_france() {
        let toponyms = resolve(&[
            fixtures::location("Paris", 0, 0),
            fixtures::location("France", 2, 10),
        ]);
        assert_eq!(ids(&toponyms), vec![Some(fixtures::PARIS_FR), Some(fixtures::FRANCE)]);
        assert_eq!(toponyms[0].country_id, Some(fixtures::FRANCE));
    }

    #[test]
    fn paris_follows_france_in_either_order() {
        let toponyms = resolve(&[
            fixtures::location("France", 0, 0),
            fixtures::location("Paris", 2, 10),
        ]);
        assert_eq!(ids(&toponyms), vec![Some(fixtures::FRANCE), Some(fixtures::PARIS_FR)]);
    }

    #[test]
    fn paris_follows_texas() {
        let toponyms = resolve(&[
            fixtures::location("Paris", 0, 0),
            fixtures::location("Texas", 2, 7),
        ]);
        assert_eq!(ids(&toponyms), vec![Some(fixtures::PARIS_TX), Some(fixtures::TEXAS)]);
    }

    #[test]
    fn singleton_gets_its_only_candidate_with_full_score() {
        let toponyms = resolve(&[fixtures::location("Texas", 0, 0)]);
        assert_eq!(ids(&toponyms), vec![Some(fixtures::TEXAS)]);
        assert!((toponyms[0].score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lone_ambiguous_phrase_takes_the_most_populated_set() {
        let toponyms = resolve(&[fixtures::location("Athens", 0, 0)]);
        assert_eq!(ids(&toponyms), vec![Some(fixtures::ATHENS_GR)]);
    }

    #[test]
    fn every_surface_mention_shares_the_choice() {
        let toponyms = resolve(&[
            fixtures::location("Paris", 0, 0),
            fixtures::location("France", 2, 10),
            fixtures::location("paris", 9, 40),
        ]);
        assert_eq!(toponyms.len(), 3);
        assert_eq!(toponyms[2].geoname_id, Some(fixtures::PARIS_FR));
        assert_eq!(toponyms[2].phrase, "paris");
    }

    #[test]
    fn unknown_phrases_are_dropped() {
        let toponyms = resolve(&[
            fixtures::location("Atlantis", 0, 0),
            fixtures::location("France", 2, 12),
        ]);
        assert_eq!(ids(&toponyms), vec![Some(fixtures::FRANCE)]);
    }

    #[test]
    fn chosen_records_share_a_consistent_chain() {
        let toponyms = resolve(&[
            fixtures::location("Athens", 0, 0),
            fixtures::location("Georgia", 2, 10),
            fixtures::location("Paris", 5, 25),
        ]);
        let athens = &toponyms[0];
        assert_eq!(athens.geoname_id, Some(fixtures::ATHENS_GA));
        assert_eq!(athens.admin1_id, Some(fixtures::GEORGIA));
    }

    #[test]
    fn repeated_runs_agree() {
        let mentions = [
            fixtures::location("Athens", 0, 0),
            fixtures::location("Paris", 3, 10),
            fixtures::location("Texas", 5, 20),
        ];
        let run = || -> Vec<(usize, Option<u64>, f64)> {
            resolve(&mentions)
                .into_iter()
                .map(|t| (t.start, t.geoname_id, t.score))
                .collect()
        };
        let first = run();
        assert_eq!(first.len(), 3);
        for _ in 0..5 {
            assert_eq!(run(), first);
        }
    }

    #[test]
    fn failing_gazetteer_resolves_nothing() {
        let resolver = SetCoverResolver::new(Arc::new(fixtures::FailingGazetteer), None);
        assert!(resolver.resolve("", &[fixtures::location("Paris", 0, 0)]).is_empty());
    }
}
