//! Set cover fused with context-bound resolution.

use std::collections::BTreeMap;
use std::sync::Arc;

use geotag_gazetteer::Gazetteer;
use geotag_resolution_models::{TaggedMention, Toponym};

use crate::Resolver;
use crate::bucket::ArticleBucket;
use crate::context_bound::{self, Variant};
use crate::set_cover;

/// Runs set cover and context-bound resolution over the same bucket.
///
/// Where both resolve the same start offset and disagree, the context-bound
/// choice wins if its score reaches the threshold. Context-bound results at
/// offsets set cover left unresolved are always kept.
pub struct FusionResolver {
    gazetteer: Arc<dyn Gazetteer>,
    candidate_limit: Option<usize>,
    max_iterations: usize,
    threshold: f64,
}

impl FusionResolver {
    #[must_use]
    pub fn new(
        gazetteer: Arc<dyn Gazetteer>,
        candidate_limit: Option<usize>,
        max_iterations: usize,
        threshold: f64,
    ) -> Self {
        log::debug!("Fusion threshold {threshold}");
        Self {
            gazetteer,
            candidate_limit,
            max_iterations,
            threshold,
        }
    }
}

impl Resolver for FusionResolver {
    fn name(&self) -> &'static str {
        "fused"
    }

    fn resolve(&self, _text: &str, mentions: &[TaggedMention]) -> Vec<Toponym> {
        let bucket = ArticleBucket::from_gazetteer(
            self.gazetteer.as_ref(),
            mentions.to_vec(),
            self.candidate_limit,
        );
        let set_cover = set_cover::extract(&bucket);
        let context_bound = context_bound::extract(&bucket, Variant::Baseline, self.max_iterations);
        fuse(set_cover, context_bound, self.threshold)
    }
}

/// Merges the two result lists by start offset.
#[must_use]
pub fn fuse(set_cover: Vec<Toponym>, context_bound: Vec<Toponym>, threshold: f64) -> Vec<Toponym> {
    let mut by_start: BTreeMap<usize, Toponym> = context_bound
        .into_iter()
        .map(|toponym| (toponym.start, toponym))
        .collect();

    let mut fused = Vec::with_capacity(set_cover.len() + by_start.len());
    let mut covered = 0;
    let mut overridden = 0;

    for chosen in set_cover {
        match by_start.remove(&chosen.start) {
            Some(other) if other != chosen && other.score >= threshold => {
                overridden += 1;
                fused.push(other);
            }
            _ => {
                covered += 1;
                fused.push(chosen);
            }
        }
    }

    // only context-bound resolved these offsets
    let only_context_bound = by_start.len();
    fused.extend(by_start.into_values());
    fused.sort_by_key(|t| (t.start, t.end));

    log::info!(
        "Fused {} toponyms: {} from set cover, {} from context-bound ({overridden} disagreements, {only_context_bound} only context-bound)",
        fused.len(),
        covered,
        overridden + only_context_bound
    );

    fused
}
