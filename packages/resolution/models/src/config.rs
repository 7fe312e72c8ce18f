//! Resolver selection and tuning.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which resolution strategy to run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ResolverKind {
    /// Greedy weighted set cover over shared-ancestor candidate groups.
    SetCover,
    /// Iterative context-bound resolution with entropy-weighted models.
    ContextBound,
    /// Only the raw co-occurrence pass that seeds context-bound resolution.
    ContextBoundPreliminary,
    /// Context-bound resolution driven by the inheritance model alone.
    ContextBoundInheritance,
    /// Context-bound resolution driven by the nearness model alone.
    ContextBoundNearness,
    /// Set cover, overridden by confident context-bound disagreements.
    #[default]
    Fused,
}

impl ResolverKind {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::SetCover,
            Self::ContextBound,
            Self::ContextBoundPreliminary,
            Self::ContextBoundInheritance,
            Self::ContextBoundNearness,
            Self::Fused,
        ]
    }

    /// One-line description for listings.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::SetCover => "spatial hierarchy sets, greedy weighted set cover",
            Self::ContextBound => "context-bound hypotheses (inheritance + nearness)",
            Self::ContextBoundPreliminary => "context-bound preliminary pass only",
            Self::ContextBoundInheritance => "context-bound, inheritance hypothesis only",
            Self::ContextBoundNearness => "context-bound, nearness hypothesis only",
            Self::Fused => "set cover fused with context-bound above a score threshold",
        }
    }
}

/// Top-level resolver configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Strategy to build.
    pub resolver: ResolverKind,
    /// Keep only the `k` most populated candidates per phrase. Unlimited
    /// when absent.
    pub candidate_limit: Option<usize>,
    /// Context-bound tuning.
    pub context_bound: ContextBoundConfig,
    /// Fusion tuning.
    pub fusion: FusionConfig,
}

/// Context-bound resolver tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextBoundConfig {
    /// Hard cap on refinement passes.
    pub max_iterations: usize,
}

const fn default_max_iterations() -> usize {
    10
}

impl Default for ContextBoundConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

/// Fusion resolver tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Minimum context-bound score needed to override a set-cover choice.
    pub threshold: f64,
}

const fn default_threshold() -> f64 {
    0.5
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn kinds_round_trip_through_names() {
        for kind in ResolverKind::all() {
            assert_eq!(ResolverKind::from_str(kind.as_ref()).ok(), Some(*kind));
        }
    }

    #[test]
    fn kind_names_are_snake_case() {
        assert_eq!(ResolverKind::SetCover.to_string(), "set_cover");
        assert_eq!(
            ResolverKind::ContextBoundPreliminary.to_string(),
            "context_bound_preliminary"
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ResolverConfig =
            serde_json::from_str(r#"{"resolver": "set_cover", "fusion": {}}"#).unwrap();
        assert_eq!(config.resolver, ResolverKind::SetCover);
        assert_eq!(config.context_bound.max_iterations, 10);
        assert!((config.fusion.threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.candidate_limit, None);
    }

    #[test]
    fn default_config_uses_each_section_default() {
        let config = ResolverConfig::default();
        assert_eq!(config.resolver, ResolverKind::Fused);
        assert_eq!(config.candidate_limit, None);
        assert_eq!(config.context_bound, ContextBoundConfig::default());
        assert_eq!(config.fusion, FusionConfig::default());
    }
}
