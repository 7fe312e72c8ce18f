//! Document-local probability models for one hierarchy level.
//!
//! - Inheritance: how often each candidate ancestor of a phrase is
//!   mentioned, directly or through resolved descendants, elsewhere in the
//!   document.
//! - Nearness: how close, in tokens, each candidate's ancestor is mentioned
//!   to the phrase itself.

use std::collections::{BTreeMap, BTreeSet};

use geotag_gazetteer::Level;
use geotag_resolution_models::TaggedMention;

use crate::candidate::CandidateEntry;

use super::snapshot::Snapshot;

/// `P_h`, keyed by (lower-cased phrase, ancestor id).
pub type InheritanceModel = BTreeMap<(String, u64), f64>;

/// `P_n`, keyed by lower-cased phrase, aligned with the phrase's candidate
/// list.
pub type NearnessModel = BTreeMap<String, Vec<f64>>;

/// Computes an entropy over a phrase's nearness distribution.
pub type EntropyFn = fn(level: Level, candidates: &[CandidateEntry], nearness: &[f64]) -> f64;

fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Token distance as used by the models. Distinct mentions sharing a token
/// index count as adjacent.
#[allow(clippy::cast_precision_loss)]
pub fn distance(a: &TaggedMention, b: &TaggedMention) -> f64 {
    a.token_distance(b).max(1) as f64
}

/// Builds `P_h` for `level`.
///
/// For each recognised mention, every distinct ancestor its candidates have
/// at `level` is weighted by the number of other mentions of that ancestor,
/// normalised over the mention's ancestors.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn inheritance(level: Level, snapshot: &Snapshot<'_>) -> InheritanceModel {
    let bucket = snapshot.bucket();
    let mut model = InheritanceModel::new();

    for mention in bucket.recognized() {
        let mut frequencies: BTreeMap<u64, usize> = BTreeMap::new();
        for candidate in bucket.candidates(&mention.phrase) {
            let Some(ancestor) = candidate.ancestor_at(level) else {
                continue;
            };
            if frequencies.contains_key(&ancestor.id) {
                continue;
            }
            let mut mentions = snapshot.surface_and_indirect(ancestor);
            mentions.remove(mention);
            frequencies.insert(ancestor.id, mentions.len());
        }

        let total: usize = frequencies.values().sum();
        let key = mention.key();
        for (id, frequency) in frequencies {
            model.insert(
                (key.clone(), id),
                safe_divide(frequency as f64, total as f64),
            );
        }
    }

    model
}

/// Builds `P_n` for `level`.
///
/// A candidate scores the inverse of the smallest token distance between a
/// mention of its phrase and another mention of its ancestor at `level`;
/// scores are normalised over the phrase's candidates. Candidates with no
/// ancestor at `level`, or whose ancestor is never mentioned, score 0.
#[must_use]
pub fn nearness(level: Level, snapshot: &Snapshot<'_>) -> NearnessModel {
    let bucket = snapshot.bucket();
    let mut model = NearnessModel::new();

    for mention in bucket.recognized() {
        let key = mention.key();
        if model.contains_key(&key) {
            continue;
        }

        let phrase_mentions: BTreeSet<_> = bucket.surface_mentions(&key).collect();
        let inverse: Vec<f64> = bucket
            .candidates(&key)
            .iter()
            .map(|candidate| {
                let Some(ancestor) = candidate.ancestor_at(level) else {
                    return 0.0;
                };
                let others = snapshot.surface_and_indirect(ancestor);
                phrase_mentions
                    .iter()
                    .flat_map(|mi| {
                        others
                            .iter()
                            .filter(move |mj| *mj != *mi)
                            .map(move |mj| distance(mi, mj))
                    })
                    .reduce(f64::min)
                    .map_or(0.0, |min| 1.0 / min)
            })
            .collect();

        let total: f64 = inverse.iter().sum();
        model.insert(
            key,
            inverse.into_iter().map(|v| safe_divide(v, total)).collect(),
        );
    }

    model
}

/// Shannon entropy of the non-zero nearness values of candidates that have
/// an ancestor at `level`.
#[must_use]
pub fn shannon_entropy(level: Level, candidates: &[CandidateEntry], nearness: &[f64]) -> f64 {
    candidates
        .iter()
        .zip(nearness)
        .filter(|(candidate, _)| candidate.hierarchy().contains_key(&level))
        .map(|(_, pn)| *pn)
        .filter(|pn| *pn != 0.0)
        .map(|pn| -pn * pn.ln())
        .sum()
}

/// Maximal entropy: the interpolation weight drops to 0, leaving only `P_h`.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn uniform_entropy(_level: Level, candidates: &[CandidateEntry], _nearness: &[f64]) -> f64 {
    (candidates.len() as f64).ln()
}

/// No entropy: the interpolation weight rises to 1, leaving only `P_n`.
#[must_use]
pub const fn zero_entropy(_level: Level, _candidates: &[CandidateEntry], _nearness: &[f64]) -> f64 {
    0.0
}
