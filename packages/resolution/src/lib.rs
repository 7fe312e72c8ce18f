#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Toponym disambiguation.
//!
//! Given a document's tagged mentions, a [`Resolver`] picks one gazetteer
//! record for each location phrase. Three strategies are provided:
//!
//! - [`SetCoverResolver`]: groups candidates of different phrases under
//!   shared administrative ancestors and greedily covers the phrases with
//!   the fewest, most populated groups.
//! - [`ContextBoundResolver`]: iteratively scores candidates with
//!   inheritance and nearness models built from the rest of the document.
//! - [`FusionResolver`]: set cover, overridden where context-bound
//!   resolution confidently disagrees.
//!
//! Use [`build_resolver`] to construct one from a [`ResolverConfig`].

pub mod bucket;
pub mod candidate;
pub mod config;
pub mod context_bound;
pub mod fusion;
pub mod set_cover;
pub mod tree;

#[cfg(test)]
pub(crate) mod fixtures;

use std::sync::Arc;

use geotag_gazetteer::Gazetteer;
use geotag_resolution_models::{ResolverConfig, ResolverKind, TaggedMention, Toponym};

pub use bucket::ArticleBucket;
pub use candidate::CandidateEntry;
pub use config::ConfigError;
pub use context_bound::{ContextBoundResolver, Variant};
pub use fusion::FusionResolver;
pub use set_cover::SetCoverResolver;

/// A toponym resolution strategy.
///
/// Resolvers never fail: phrases that cannot be resolved, including those
/// whose gazetteer lookups error, are left out of the result.
pub trait Resolver: Send + Sync {
    /// The strategy's [`ResolverKind`] name.
    fn name(&self) -> &'static str;

    /// Resolves the location mentions of one document, in document order.
    fn resolve(&self, text: &str, mentions: &[TaggedMention]) -> Vec<Toponym>;
}

/// Builds the resolver `config` selects over `gazetteer`.
#[must_use]
pub fn build_resolver(config: &ResolverConfig, gazetteer: Arc<dyn Gazetteer>) -> Box<dyn Resolver> {
    let limit = config.candidate_limit;
    let max_iterations = config.context_bound.max_iterations;

    let context_bound = |variant| -> Box<dyn Resolver> {
        Box::new(ContextBoundResolver::new(
            Arc::clone(&gazetteer),
            limit,
            variant,
            max_iterations,
        ))
    };

    let resolver: Box<dyn Resolver> = match config.resolver {
        ResolverKind::SetCover => Box::new(SetCoverResolver::new(Arc::clone(&gazetteer), limit)),
        ResolverKind::ContextBound => context_bound(Variant::Baseline),
        ResolverKind::ContextBoundPreliminary => context_bound(Variant::Preliminary),
        ResolverKind::ContextBoundInheritance => context_bound(Variant::PureInheritance),
        ResolverKind::ContextBoundNearness => context_bound(Variant::PureNearness),
        ResolverKind::Fused => Box::new(FusionResolver::new(
            Arc::clone(&gazetteer),
            limit,
            max_iterations,
            config.fusion.threshold,
        )),
    };

    log::debug!(
        "Built {} resolver (candidate limit {limit:?}, max iterations {max_iterations})",
        resolver.name()
    );

    resolver
}
