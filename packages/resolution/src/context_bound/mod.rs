//! Context-bound resolution.
//!
//! Starting from a co-occurrence seed, each pass scores every candidate of
//! every location mention at the country, admin1 and admin2 levels by
//! interpolating two document-local models:
//!
//! ```text
//! p = J * Pn + (1 - J) * Ph        J = 1 - H / ln(|candidates|)
//! ```
//!
//! where `Ph` is the inheritance model, `Pn` the nearness model and `H` an
//! entropy chosen by the [`Variant`]. Passes repeat, each seeing the
//! previous pass's assignment as indirect mentions, until no assignment
//! changes or the iteration cap is reached.

mod models;
mod preliminary;
mod select;
mod snapshot;

use std::collections::BTreeMap;
use std::sync::Arc;

use geotag_gazetteer::{Gazetteer, Level};
use geotag_resolution_models::{TaggedMention, Toponym};

pub use models::EntropyFn;

use crate::Resolver;
use crate::bucket::ArticleBucket;
use crate::candidate::CandidateEntry;

use self::models::{InheritanceModel, NearnessModel};
use self::select::Selection;
use self::snapshot::Snapshot;

/// Which entropy drives the interpolation weight, or whether to stop after
/// the seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Shannon entropy of the nearness distribution.
    Baseline,
    /// `H = ln(n)`: inheritance only.
    PureInheritance,
    /// `H = 0`: nearness only.
    PureNearness,
    /// Return the co-occurrence seed without iterating.
    Preliminary,
}

impl Variant {
    /// The entropy used to weight the two models.
    #[must_use]
    pub const fn entropy(self) -> EntropyFn {
        match self {
            Self::Baseline | Self::Preliminary => models::shannon_entropy,
            Self::PureInheritance => models::uniform_entropy,
            Self::PureNearness => models::zero_entropy,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Baseline => "context_bound",
            Self::PureInheritance => "context_bound_inheritance",
            Self::PureNearness => "context_bound_nearness",
            Self::Preliminary => "context_bound_preliminary",
        }
    }
}

/// Iterative context-bound resolver.
pub struct ContextBoundResolver {
    gazetteer: Arc<dyn Gazetteer>,
    candidate_limit: Option<usize>,
    variant: Variant,
    max_iterations: usize,
}

impl ContextBoundResolver {
    #[must_use]
    pub fn new(
        gazetteer: Arc<dyn Gazetteer>,
        candidate_limit: Option<usize>,
        variant: Variant,
        max_iterations: usize,
    ) -> Self {
        Self {
            gazetteer,
            candidate_limit,
            variant,
            max_iterations,
        }
    }
}

impl Resolver for ContextBoundResolver {
    fn name(&self) -> &'static str {
        self.variant.name()
    }

    fn resolve(&self, _text: &str, mentions: &[TaggedMention]) -> Vec<Toponym> {
        let bucket = ArticleBucket::from_gazetteer(
            self.gazetteer.as_ref(),
            mentions.to_vec(),
            self.candidate_limit,
        );
        extract(&bucket, self.variant, self.max_iterations)
    }
}

/// Runs `variant` over a prepared bucket, returning toponyms in document
/// order. A cap of 0 runs a single pass.
#[must_use]
pub fn extract(bucket: &ArticleBucket, variant: Variant, max_iterations: usize) -> Vec<Toponym> {
    let seed = preliminary::disambiguate(bucket);
    if variant == Variant::Preliminary {
        return seed.into_values().collect();
    }

    let max_iterations = max_iterations.max(1);
    let entropy = variant.entropy();
    let mut snapshot = Snapshot::new(bucket, seed);
    let mut estimates: BTreeMap<TaggedMention, Toponym> = BTreeMap::new();
    let mut revised = 0;
    let mut iterations = 0;

    for iteration in 1..=max_iterations {
        iterations = iteration;
        estimates.extend(run_pass(&snapshot, entropy));

        let mut changed = 0;
        for (mention, estimate) in &estimates {
            let previous = snapshot.assignment(mention).and_then(|t| t.geoname_id);
            if previous.is_none() || previous != estimate.geoname_id {
                changed += 1;
                log::debug!(
                    "Iteration {iteration}: {mention} moved from {previous:?} to {:?}",
                    estimate.geoname_id
                );
            }
        }
        revised += changed;

        if changed == 0 {
            break;
        }
        log::debug!(
            "Iteration {iteration}: {changed} of {} revised",
            estimates.len()
        );

        if iteration < max_iterations {
            snapshot = Snapshot::new(bucket, estimates.clone());
        }
    }

    log::info!(
        "{} resolved {} mentions in {iterations} iterations ({revised} revisions)",
        variant.name(),
        estimates.len()
    );

    estimates.into_values().collect()
}

/// One pass over the hierarchy levels. Each level that finds evidence for
/// a mention overwrites the earlier levels' pick for it; a level where every
/// candidate scores 0 only fills a mention that has no pick yet.
fn run_pass(snapshot: &Snapshot<'_>, entropy: EntropyFn) -> BTreeMap<TaggedMention, Toponym> {
    let bucket = snapshot.bucket();
    let mut picks: BTreeMap<TaggedMention, Toponym> = BTreeMap::new();

    for &level in Level::HIERARCHY {
        let inheritance = models::inheritance(level, snapshot);
        let nearness = models::nearness(level, snapshot);

        for mention in bucket.recognized() {
            let candidates = bucket.candidates(&mention.phrase);
            let Some((score, winner)) =
                select(level, mention, candidates, &inheritance, &nearness, entropy)
            else {
                continue;
            };

            if score > 0.0 || !picks.contains_key(mention) {
                picks.insert(mention.clone(), winner.toponym(mention, score));
            }
        }
    }

    picks
}

/// Scores `mention`'s candidates at `level` and picks the best one.
#[allow(clippy::cast_precision_loss)]
fn select<'a>(
    level: Level,
    mention: &TaggedMention,
    candidates: &'a [CandidateEntry],
    inheritance: &InheritanceModel,
    nearness: &NearnessModel,
    entropy: EntropyFn,
) -> Option<(f64, &'a CandidateEntry)> {
    match candidates {
        [] => return None,
        [only] => return Some((1.0, only)),
        _ => {}
    }

    let key = mention.key();
    let pn = nearness.get(&key).map_or(&[][..], Vec::as_slice);
    let h = entropy(level, candidates, pn);
    let j = 1.0 - h / (candidates.len() as f64).ln();

    let mut selection = Selection::default();
    for (i, candidate) in candidates.iter().enumerate() {
        let Some(ancestor) = candidate.ancestor_at(level) else {
            continue;
        };
        let ph = inheritance
            .get(&(key.clone(), ancestor.id))
            .copied()
            .unwrap_or(0.0);
        let pn = pn.get(i).copied().unwrap_or(0.0);
        selection.offer(j.mul_add(pn, (1.0 - j) * ph), candidate);
    }

    selection.winner()
}
